use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::academic::{Requester, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub role: UserRole,
    pub track_id: Option<i32>,
    pub level_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The identity the engines evaluate permissions against.
    pub fn requester(&self) -> Requester {
        Requester {
            id: self.id,
            role: self.role,
            track_id: self.track_id,
            level_id: self.level_id,
        }
    }
}
