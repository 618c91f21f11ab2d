//! Document access engine and moderation authority resolver.
//!
//! Pure decision functions over per-request snapshots: the document
//! (hydrated with resolved subjects), the requesting identity, and the
//! requester's subject assignments where the requester is a professor.
//! Nothing here touches storage or logs; services load the inputs and
//! translate `false` into typed failures.

pub mod document;
pub mod moderation;

pub use document::can_access_document;
pub use moderation::can_moderate;
