//! Uniform operation result returned to callers.
//!
//! # Invariants
//! - Exactly one of: success with a value, success without a value, or
//!   failure with a user-facing message.
//! - Failure messages are short and safe to show; diagnostic detail goes
//!   to logs only.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Category of a business failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A referenced entity does not exist.
    NotFound,
    /// Request input failed parsing or validation.
    Invalid,
    /// Storage rejected or failed the operation.
    Store,
    /// The caller cancelled the operation.
    Cancelled,
}

impl FailureKind {
    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Invalid => "invalid",
            Self::Store => "store",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Business failure carried by `Outcome::Failure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Invalid, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Store, message)
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "Operation cancelled")
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of one provider operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
    Success(T),
    /// Success with nothing to return.
    Completed,
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Completed => Outcome::Completed,
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(value: Failure) -> Self {
        Self::Failure(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Failure, FailureKind, Outcome};

    #[test]
    fn completed_counts_as_success_without_value() {
        let outcome: Outcome<u32> = Outcome::Completed;
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), None);
        assert_eq!(outcome.failure(), None);
    }

    #[test]
    fn map_preserves_failure() {
        let outcome: Outcome<u32> = Failure::not_found("Couldn't find teacher").into();
        let mapped = outcome.map(|value| value.to_string());
        let failure = mapped.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.to_string(), "Couldn't find teacher");
    }

    #[test]
    fn outcome_serializes_as_tagged_union() {
        let success = serde_json::to_value(Outcome::Success(7)).unwrap();
        assert_eq!(success["status"], "success");
        assert_eq!(success["data"], 7);

        let failure =
            serde_json::to_value(Outcome::<u32>::Failure(Failure::invalid("Enter students")))
                .unwrap();
        assert_eq!(failure["status"], "failure");
        assert_eq!(failure["data"]["kind"], "invalid");
        assert_eq!(failure["data"]["message"], "Enter students");
    }
}
