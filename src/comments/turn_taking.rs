//! Reply turn-taking protocol.
//!
//! Students must alternate with staff inside a reply thread: after a
//! student replies to a staff comment, they may not reply to that same
//! parent again until a professor or admin has responded. Staff reply
//! rights are never restricted, which lets them de-congest threads.

use serde::Serialize;

use crate::academic::{Requester, UserRole};
use crate::database::models::Comment;

pub const REASON_PARENT_NOT_FOUND: &str = "parent not found";
pub const REASON_STUDENT_PARENT: &str = "students may only reply to professors or admins";
pub const REASON_WAIT_FOR_STAFF: &str =
    "must wait for a professor response before replying again";

/// Verdict of the turn-taking check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplyGate {
    pub can_reply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl ReplyGate {
    pub fn allow() -> Self {
        Self { can_reply: true, reason: None }
    }

    pub fn deny(reason: &'static str) -> Self {
        Self { can_reply: false, reason: Some(reason) }
    }
}

/// Decide whether `requester` may reply to `parent`.
///
/// `replies` are the parent's direct replies; deleted ones are ignored.
/// Rules, in order:
/// 1. Professors and admins may always reply.
/// 2. Missing or deleted parent: denied.
/// 3. Student-authored parent: denied, students only reply to staff.
/// 4. Staff-authored parent: a student may reply if they have no prior
///    direct reply to it, or if a staff reply was created after their
///    most recent one.
pub fn can_reply_to_comment(
    requester: &Requester,
    parent: Option<&Comment>,
    replies: &[Comment],
) -> ReplyGate {
    if requester.role.is_staff() {
        return ReplyGate::allow();
    }

    let parent = match parent {
        Some(p) if !p.is_deleted => p,
        _ => return ReplyGate::deny(REASON_PARENT_NOT_FOUND),
    };

    if parent.author_role == UserRole::Student {
        return ReplyGate::deny(REASON_STUDENT_PARENT);
    }

    // Direct, non-deleted replies in creation order.
    let mut live: Vec<&Comment> = replies.iter().filter(|r| !r.is_deleted).collect();
    live.sort_by_key(|r| r.created_at);

    let last_own_reply = live
        .iter()
        .filter(|r| r.author_id == requester.id && r.author_role == UserRole::Student)
        .last();

    match last_own_reply {
        None => ReplyGate::allow(),
        Some(own) => {
            let staff_answered = live
                .iter()
                .any(|r| r.author_role.is_staff() && r.created_at > own.created_at);
            if staff_answered {
                ReplyGate::allow()
            } else {
                ReplyGate::deny(REASON_WAIT_FOR_STAFF)
            }
        }
    }
}
