use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A subject row as stored, with its denormalized track reference.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i32,
    pub name: String,
    pub semester_id: i32,
    pub track_id: i32,
}
