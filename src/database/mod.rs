pub mod manager;
pub mod models;
pub mod pg;
pub mod store;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use pg::PgStore;
pub use store::{ArchiveStore, StoreError};
