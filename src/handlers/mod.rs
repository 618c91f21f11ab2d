//! HTTP handlers, grouped by access tier:
//!
//! - `public`: no authentication (health, auth)
//! - `protected`: JWT required (documents, comments)
//! - `elevated`: JWT + admin role (restore, assignments)

pub mod elevated;
pub mod protected;
pub mod public;

use serde::Deserialize;

use crate::config;

/// Shared pagination query parameters, clamped to configured bounds.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn resolve(&self) -> (i64, i64) {
        let api = &config::config().api;
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size);
        (page, limit)
    }
}
