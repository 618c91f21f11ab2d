//! Comment thread engine.
//!
//! A document's comments form a forest rooted at top-level comments.
//! This module owns the reply turn-taking protocol, the in-memory tree
//! assembly, and the service that orchestrates store calls around the
//! pure decision functions.

pub mod service;
pub mod thread;
pub mod turn_taking;

pub use service::{CommentService, CommentThreadPage};
pub use thread::{assemble_thread, CommentNode};
pub use turn_taking::{can_reply_to_comment, ReplyGate};
