//! Academic affiliation model.
//!
//! The archive organizes documents along a Level -> Track -> Semester ->
//! Subject hierarchy. Professors are bound to subjects through role
//! assignments (lecture/tutorial/lab, one professor per slot), students
//! carry a track and level affiliation. These types are pure data; the
//! access and comment engines consume them without touching storage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform-wide user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Professor,
    Admin,
}

impl UserRole {
    /// Professors and admins share unrestricted reply/moderation-adjacent rights.
    pub fn is_staff(self) -> bool {
        matches!(self, UserRole::Professor | UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Professor => write!(f, "professor"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// Teaching role a professor holds on a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "assignment_role", rename_all = "snake_case")]
pub enum AssignmentRole {
    Lecture,
    Tutorial,
    Lab,
}

impl std::fmt::Display for AssignmentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentRole::Lecture => write!(f, "lecture"),
            AssignmentRole::Tutorial => write!(f, "tutorial"),
            AssignmentRole::Lab => write!(f, "lab"),
        }
    }
}

/// The requesting identity every engine decision is made against.
///
/// `track_id`/`level_id` are populated only for students; professors are
/// identified through their subject assignments and admins bypass
/// affiliation checks entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requester {
    pub id: Uuid,
    pub role: UserRole,
    pub track_id: Option<i32>,
    pub level_id: Option<i32>,
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// A subject as the access engine sees it: its own id, the track it
/// belongs to, and the level that track belongs to (resolved through the
/// track so both affiliation dimensions can be matched on one subject).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubjectRef {
    pub id: i32,
    pub track_id: i32,
    pub level_id: i32,
}

/// Binds a professor to a subject with a teaching role.
///
/// Invariant: at most one professor per `(subject_id, role)` slot; the
/// persistence layer backs this with a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubjectAssignment {
    pub professor_id: Uuid,
    pub subject_id: i32,
    pub role: AssignmentRole,
}

impl SubjectAssignment {
    /// Whether this assignment covers any of the given subjects.
    pub fn covers_any(&self, subjects: &[SubjectRef]) -> bool {
        subjects.iter().any(|s| s.id == self.subject_id)
    }
}

/// Configured set of terminal levels (the final year of each program).
///
/// Capstone eligibility for students is a membership test against this
/// set rather than a database column, so deployments can declare their
/// terminal years without a migration.
#[derive(Debug, Clone, Default)]
pub struct TerminalLevels(HashSet<i32>);

impl TerminalLevels {
    pub fn new(levels: impl IntoIterator<Item = i32>) -> Self {
        Self(levels.into_iter().collect())
    }

    pub fn is_terminal(&self, level_id: i32) -> bool {
        self.0.contains(&level_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles() {
        assert!(!UserRole::Student.is_staff());
        assert!(UserRole::Professor.is_staff());
        assert!(UserRole::Admin.is_staff());
    }

    #[test]
    fn terminal_level_membership() {
        let terminal = TerminalLevels::new([4, 5]);
        assert!(terminal.is_terminal(4));
        assert!(terminal.is_terminal(5));
        assert!(!terminal.is_terminal(1));
        assert!(TerminalLevels::default().is_empty());
    }

    #[test]
    fn assignment_subject_intersection() {
        let assignment = SubjectAssignment {
            professor_id: Uuid::new_v4(),
            subject_id: 7,
            role: AssignmentRole::Lecture,
        };
        let subjects = [
            SubjectRef { id: 3, track_id: 1, level_id: 1 },
            SubjectRef { id: 7, track_id: 2, level_id: 3 },
        ];
        assert!(assignment.covers_any(&subjects));
        assert!(!assignment.covers_any(&subjects[..1]));
    }
}
