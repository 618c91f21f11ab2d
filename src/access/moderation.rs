//! Moderation authority over a document's comment thread.

use crate::academic::{Requester, SubjectAssignment, UserRole};
use crate::database::models::DocumentWithSubjects;

/// Decide whether `requester` may moderate comments on `doc`.
///
/// Admins moderate everything. Any professor moderates any capstone
/// thread. On regular documents a professor moderates iff they hold at
/// least one assignment on one of the document's subjects. Students
/// never moderate.
///
/// The result doubles as the `can_moderate` flag on comment listings
/// and as one of the three authorities (owner, admin, moderator)
/// allowed to delete a comment.
pub fn can_moderate(
    doc: &DocumentWithSubjects,
    requester: &Requester,
    assignments: &[SubjectAssignment],
) -> bool {
    match requester.role {
        UserRole::Admin => true,
        UserRole::Professor => {
            doc.document.category.is_capstone()
                || assignments.iter().any(|a| a.covers_any(&doc.subjects))
        }
        UserRole::Student => false,
    }
}
