pub mod auth;

pub use auth::{admin_only_middleware, jwt_auth_middleware};
