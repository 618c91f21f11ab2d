//! User account queries used by the auth and admin handlers.

use sqlx::PgPool;
use uuid::Uuid;

use crate::academic::UserRole;
use crate::database::models::User;

pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_digest: String,
    pub role: UserRole,
    pub track_id: Option<i32>,
    pub level_id: Option<i32>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, new: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, username, password_digest, role, track_id, level_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.email)
    .bind(&new.username)
    .bind(&new.password_digest)
    .bind(new.role)
    .bind(new.track_id)
    .bind(new.level_id)
    .fetch_one(pool)
    .await
}

/// Postgres unique-violation check, used to map duplicate emails to 409.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
