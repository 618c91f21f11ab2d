pub mod comment;
pub mod document;
pub mod subject;
pub mod user;

pub use comment::{Comment, CommentWithReplies, NewCommentRow};
pub use document::{Document, DocumentCategory, DocumentWithSubjects};
pub use subject::Subject;
pub use user::User;
