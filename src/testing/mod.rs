//! Test-only support: fixture builders and an in-memory store that
//! mirrors the Postgres store's semantics.

pub mod fixtures;
pub mod memory;
