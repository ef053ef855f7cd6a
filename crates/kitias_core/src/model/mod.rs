//! Entity model for people, groups, subjects and attendance scheduling.
//!
//! # Responsibility
//! - Define the canonical records handled by repositories and services.
//! - Own entity-level invariants (`validate`) checked before every write.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID generated on construction.
//! - Dates are Unix epoch milliseconds.
//! - Navigation fields (`person`, `group`, `students`, ...) are only filled
//!   when a query explicitly includes the relation; they are never written.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod group;
pub mod person;
pub mod scheduler;

/// Identifier shared by all persisted entities.
pub type EntityId = Uuid;
pub type PersonId = Uuid;
pub type StudentId = Uuid;
pub type TeacherId = Uuid;
pub type GroupId = Uuid;
pub type SubjectId = Uuid;
pub type SchedulerId = Uuid;
pub type StudentAttendanceId = Uuid;
pub type AttendanceId = Uuid;

/// Entity invariant violation detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Student attendance carries both a student id and a free-text name.
    AmbiguousStudentReference,
    /// Student attendance carries neither a student id nor a name.
    MissingStudentReference,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} must not be blank")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::AmbiguousStudentReference => {
                write!(f, "student attendance must not set both student id and student name")
            }
            Self::MissingStudentReference => {
                write!(f, "student attendance requires a student id or a student name")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}
