pub mod academic;
pub mod access;
pub mod audit;
pub mod auth;
pub mod comments;
pub mod config;
pub mod database;
pub mod documents;
pub mod error;
pub mod handlers;
pub mod middleware;

#[cfg(test)]
pub mod testing;
