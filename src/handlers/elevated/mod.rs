//! Admin-only endpoints, mounted behind the admin middleware.

pub mod assignments;
pub mod documents;
pub mod subjects;
