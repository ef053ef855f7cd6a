//! Repository and unit-of-work contracts.
//!
//! # Responsibility
//! - Define one narrow data-access interface per entity (`Repository<E>`).
//! - Compose them behind a single transactional boundary (`UnitOfWork`).
//!
//! # Invariants
//! - Queries are read-only and never observe staged changes.
//! - `create`/`update`/`delete` validate and stage; nothing is persisted
//!   until `UnitOfWork::commit`.
//! - `commit` applies every staged change atomically and reports the number
//!   of affected rows; `0` means nothing changed.

use crate::cancel::{CancellationToken, Cancelled};
use crate::db::DbError;
use crate::model::group::{Group, GroupSubject, Subject};
use crate::model::person::{Person, Student, Teacher};
use crate::model::scheduler::{Attendance, AttendanceScheduler, StudentAttendance};
use crate::model::{EntityId, ValidationError};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub mod query;
pub mod sqlite;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for staging, query and commit operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// Persisted row cannot be converted into a valid entity.
    InvalidData(String),
    /// A single-result query matched more than one row.
    MultipleMatches { entity: &'static str, count: usize },
    /// Operation was cancelled before or while talking to storage.
    Cancelled,
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MultipleMatches { entity, count } => {
                write!(f, "expected at most one {entity}, found {count}")
            }
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
        }
    }
}

impl RepoError {
    /// True when storage rejected a staged write on a schema constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(rusqlite::ErrorCode::OperationInterrupted) {
            return Self::Cancelled;
        }
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<Cancelled> for RepoError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Persisted entity with typed query filter and eager-load selection.
pub trait Entity: Clone + Debug {
    /// Predicate accepted by `Repository::find_by`.
    type Filter: Debug;
    /// Relations to eager-load alongside the entity.
    type Include: Copy + Default + Debug;

    /// Short lowercase name used in errors and log events.
    const NAME: &'static str;

    fn id(&self) -> EntityId;

    /// Entity-level invariants checked before a write is staged.
    fn check_invariants(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Per-entity data access.
pub trait Repository<E: Entity> {
    /// Returns every entity matching `filter`, with `include` relations loaded.
    fn find_by(&self, filter: &E::Filter, include: E::Include) -> RepoResult<Vec<E>>;

    /// Returns the only match, `None` when nothing matches.
    ///
    /// # Errors
    /// - `RepoError::MultipleMatches` when the filter is not selective.
    fn single(&self, filter: &E::Filter, include: E::Include) -> RepoResult<Option<E>> {
        let mut found = self.find_by(filter, include)?;
        match found.len() {
            0 | 1 => Ok(found.pop()),
            count => Err(RepoError::MultipleMatches {
                entity: E::NAME,
                count,
            }),
        }
    }

    /// Stages an insert.
    fn create(&mut self, entity: E) -> RepoResult<()>;
    /// Stages an update of scalar columns; relations are not written.
    fn update(&mut self, entity: E) -> RepoResult<()>;
    /// Stages a delete; dependents are removed by storage cascade.
    fn delete(&mut self, entity: &E);

    /// Number of staged, uncommitted changes.
    fn pending(&self) -> usize;
    /// Drops staged changes.
    fn discard(&mut self);
}

/// Transactional boundary over all entity repositories.
///
/// One instance serves one logical operation at a time: `begin` starts it,
/// `commit` or `rollback` ends it.
pub trait UnitOfWork {
    fn people(&mut self) -> &mut dyn Repository<Person>;
    fn students(&mut self) -> &mut dyn Repository<Student>;
    fn teachers(&mut self) -> &mut dyn Repository<Teacher>;
    fn groups(&mut self) -> &mut dyn Repository<Group>;
    fn subjects(&mut self) -> &mut dyn Repository<Subject>;
    fn group_subjects(&mut self) -> &mut dyn Repository<GroupSubject>;
    fn schedulers(&mut self) -> &mut dyn Repository<AttendanceScheduler>;
    fn student_attendances(&mut self) -> &mut dyn Repository<StudentAttendance>;
    fn attendances(&mut self) -> &mut dyn Repository<Attendance>;

    /// Starts a new operation: drops leftovers and binds `cancel`.
    fn begin(&mut self, cancel: &CancellationToken);
    /// Persists every staged change atomically; returns affected rows.
    fn commit(&mut self) -> RepoResult<usize>;
    /// Drops every staged change.
    fn rollback(&mut self);
}
