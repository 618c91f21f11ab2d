//! Read/write eligibility for documents.

use crate::academic::{Requester, SubjectAssignment, TerminalLevels, UserRole};
use crate::database::models::DocumentWithSubjects;

/// Decide whether `requester` may access `doc`.
///
/// Rules are evaluated in order, first match wins:
/// 1. Admins access everything.
/// 2. Owners access their own documents.
/// 3. Capstone documents: any professor; students only from a terminal
///    level.
/// 4. Regular documents: professors with at least one assignment on one
///    of the document's subjects; students whose track and level both
///    match on the same subject.
///
/// Fails closed: unknown affiliation data denies access. `assignments`
/// is the requester's assignment set restricted to the document's
/// subjects and is only consulted for professors.
///
/// This check runs before every document read, update, delete, restore,
/// download, view-count increment, and before any comment operation on
/// the document.
pub fn can_access_document(
    doc: &DocumentWithSubjects,
    requester: &Requester,
    assignments: &[SubjectAssignment],
    terminal_levels: &TerminalLevels,
) -> bool {
    if requester.role == UserRole::Admin {
        return true;
    }

    if doc.document.owner_id == requester.id {
        return true;
    }

    if doc.document.category.is_capstone() {
        return match requester.role {
            UserRole::Professor => true,
            UserRole::Student => requester
                .level_id
                .map(|level| terminal_levels.is_terminal(level))
                .unwrap_or(false),
            UserRole::Admin => true,
        };
    }

    match requester.role {
        // Any assignment on any of the document's subjects suffices,
        // regardless of the teaching role held.
        UserRole::Professor => assignments.iter().any(|a| a.covers_any(&doc.subjects)),
        // Track and level must match on the same subject.
        UserRole::Student => match (requester.track_id, requester.level_id) {
            (Some(track), Some(level)) => doc
                .subjects
                .iter()
                .any(|s| s.track_id == track && s.level_id == level),
            _ => false,
        },
        UserRole::Admin => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::academic::{AssignmentRole, SubjectRef};
    use crate::database::models::DocumentCategory;
    use crate::testing::fixtures::{admin, document, professor, student};
    use uuid::Uuid;

    fn subject(id: i32, track_id: i32, level_id: i32) -> SubjectRef {
        SubjectRef { id, track_id, level_id }
    }

    fn assignment(professor_id: Uuid, subject_id: i32) -> SubjectAssignment {
        SubjectAssignment { professor_id, subject_id, role: AssignmentRole::Lecture }
    }

    #[test]
    fn admin_accesses_everything() {
        let requester = admin();
        let doc = document(DocumentCategory::Exam, Uuid::new_v4(), vec![subject(1, 1, 1)]);
        assert!(can_access_document(&doc, &requester, &[], &TerminalLevels::default()));
    }

    #[test]
    fn owner_accesses_own_document() {
        let requester = student(9, 9);
        let doc = document(DocumentCategory::Lecture, requester.id, vec![subject(1, 1, 1)]);
        // Affiliation does not match, ownership alone grants access.
        assert!(can_access_document(&doc, &requester, &[], &TerminalLevels::default()));
    }

    #[test]
    fn student_needs_track_and_level_on_same_subject() {
        // Document with one subject: S1 in track T1, track in level L1.
        let doc = document(DocumentCategory::Lecture, Uuid::new_v4(), vec![subject(1, 1, 1)]);
        let terminal = TerminalLevels::default();

        let matching = student(1, 1);
        assert!(can_access_document(&doc, &matching, &[], &terminal));

        // Same level, wrong track: denied.
        let wrong_track = student(2, 1);
        assert!(!can_access_document(&doc, &wrong_track, &[], &terminal));

        // Same track, wrong level: denied.
        let wrong_level = student(1, 2);
        assert!(!can_access_document(&doc, &wrong_level, &[], &terminal));
    }

    #[test]
    fn student_dimensions_must_match_on_one_subject() {
        // Track matches on subject 1, level matches on subject 2 only:
        // no single subject satisfies both, so access is denied.
        let doc = document(
            DocumentCategory::Tutorial,
            Uuid::new_v4(),
            vec![subject(1, 1, 2), subject(2, 3, 1)],
        );
        let requester = student(1, 1);
        assert!(!can_access_document(&doc, &requester, &[], &TerminalLevels::default()));

        // Adding a subject matching both dimensions grants access.
        let doc = document(
            DocumentCategory::Tutorial,
            Uuid::new_v4(),
            vec![subject(1, 1, 2), subject(2, 3, 1), subject(3, 1, 1)],
        );
        assert!(can_access_document(&doc, &requester, &[], &TerminalLevels::default()));
    }

    #[test]
    fn student_without_affiliation_is_denied() {
        let doc = document(DocumentCategory::Lecture, Uuid::new_v4(), vec![subject(1, 1, 1)]);
        let mut requester = student(1, 1);
        requester.track_id = None;
        assert!(!can_access_document(&doc, &requester, &[], &TerminalLevels::default()));

        let mut requester = student(1, 1);
        requester.level_id = None;
        assert!(!can_access_document(&doc, &requester, &[], &TerminalLevels::default()));
    }

    #[test]
    fn professor_needs_assignment_intersection() {
        let doc = document(
            DocumentCategory::Lab,
            Uuid::new_v4(),
            vec![subject(1, 1, 1), subject(2, 1, 1)],
        );
        let requester = professor();
        let terminal = TerminalLevels::default();

        assert!(!can_access_document(&doc, &requester, &[], &terminal));

        // Assignment on an unrelated subject does not help.
        let unrelated = [assignment(requester.id, 99)];
        assert!(!can_access_document(&doc, &requester, &unrelated, &terminal));

        // Any teaching role on any of the document's subjects suffices.
        let covering = [assignment(requester.id, 2)];
        assert!(can_access_document(&doc, &requester, &covering, &terminal));
    }

    #[test]
    fn capstone_gating() {
        let doc = document(DocumentCategory::Capstone, Uuid::new_v4(), vec![]);
        let terminal = TerminalLevels::new([4]);

        // Professors always access capstone documents.
        assert!(can_access_document(&doc, &professor(), &[], &terminal));

        // Students only from a terminal level.
        assert!(can_access_document(&doc, &student(1, 4), &[], &terminal));
        assert!(!can_access_document(&doc, &student(1, 3), &[], &terminal));

        // Student with no level at all: fails closed.
        let mut no_level = student(1, 4);
        no_level.level_id = None;
        assert!(!can_access_document(&doc, &no_level, &[], &terminal));
    }

    #[test]
    fn decision_is_pure_and_repeatable() {
        let doc = document(DocumentCategory::Lecture, Uuid::new_v4(), vec![subject(1, 1, 1)]);
        let requester = student(1, 1);
        let terminal = TerminalLevels::default();
        let first = can_access_document(&doc, &requester, &[], &terminal);
        for _ in 0..10 {
            assert_eq!(first, can_access_document(&doc, &requester, &[], &terminal));
        }
    }
}
