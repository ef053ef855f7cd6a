//! Core domain logic for Kitias attendance tracking.
//! This crate owns the entity model, storage and attendance use cases.

pub mod cancel;
pub mod config;
pub mod db;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod service;

pub use cancel::{CancellationToken, Cancelled};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use mapper::{DefaultMapper, Mapper};
pub use repo::sqlite::SqliteUnitOfWork;
pub use repo::{Entity, RepoError, RepoResult, Repository, UnitOfWork};
pub use service::attendance_provider::{
    AttendanceProvider, AttendanceRequest, CreateSchedulerRequest, ProviderError, ProviderResult,
    StudentAttendanceRequest, UpdateAttendanceRequest, UpdateSchedulerRequest,
    UpdateStudentAttendanceRequest,
};
pub use service::outcome::{Failure, FailureKind, Outcome};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
