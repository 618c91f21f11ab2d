pub mod comments;
pub mod documents;
pub mod profile;

use crate::comments::CommentService;
use crate::config;
use crate::database::{DatabaseManager, PgStore};
use crate::documents::DocumentService;
use crate::error::ApiError;

/// Build the document service over the shared pool.
pub(crate) async fn document_service() -> Result<DocumentService<PgStore>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    Ok(DocumentService::new(
        PgStore::new(pool),
        config::config().academic.terminal_levels(),
    ))
}

/// Build the comment service over the shared pool.
pub(crate) async fn comment_service() -> Result<CommentService<PgStore>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    Ok(CommentService::new(
        PgStore::new(pool),
        config::config().academic.terminal_levels(),
    ))
}
