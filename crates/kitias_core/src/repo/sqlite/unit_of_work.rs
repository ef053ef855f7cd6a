//! SQLite-backed unit of work.
//!
//! # Invariants
//! - `commit` opens one IMMEDIATE transaction; either every staged change
//!   lands or none does.
//! - Creates run parent-first, deletes run child-first, so foreign keys
//!   hold after every statement.
//! - Staged changes are dropped after `commit`, whatever its outcome.

use super::{ensure_entity_table, SqliteRepository};
use crate::cancel::CancellationToken;
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::group::{Group, GroupSubject, Subject};
use crate::model::person::{Person, Student, Teacher};
use crate::model::scheduler::{Attendance, AttendanceScheduler, StudentAttendance};
use crate::repo::{RepoError, RepoResult, Repository, UnitOfWork};
use log::{debug, error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Unit of work over one migrated connection.
pub struct SqliteUnitOfWork<'conn> {
    conn: &'conn Connection,
    cancel: CancellationToken,
    people: SqliteRepository<'conn, Person>,
    students: SqliteRepository<'conn, Student>,
    teachers: SqliteRepository<'conn, Teacher>,
    groups: SqliteRepository<'conn, Group>,
    subjects: SqliteRepository<'conn, Subject>,
    group_subjects: SqliteRepository<'conn, GroupSubject>,
    schedulers: SqliteRepository<'conn, AttendanceScheduler>,
    student_attendances: SqliteRepository<'conn, StudentAttendance>,
    attendances: SqliteRepository<'conn, Attendance>,
}

impl<'conn> SqliteUnitOfWork<'conn> {
    /// Creates a unit of work over a connection prepared by `db::open_db`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one this binary maps.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_attendance_connection_ready(conn)?;
        Ok(Self {
            conn,
            cancel: CancellationToken::new(),
            people: SqliteRepository::new(conn),
            students: SqliteRepository::new(conn),
            teachers: SqliteRepository::new(conn),
            groups: SqliteRepository::new(conn),
            subjects: SqliteRepository::new(conn),
            group_subjects: SqliteRepository::new(conn),
            schedulers: SqliteRepository::new(conn),
            student_attendances: SqliteRepository::new(conn),
            attendances: SqliteRepository::new(conn),
        })
    }

    fn pending_changes(&self) -> usize {
        self.people.pending()
            + self.students.pending()
            + self.teachers.pending()
            + self.groups.pending()
            + self.subjects.pending()
            + self.group_subjects.pending()
            + self.schedulers.pending()
            + self.student_attendances.pending()
            + self.attendances.pending()
    }

    fn apply_staged(&self) -> RepoResult<usize> {
        let cancel = &self.cancel;
        cancel.check()?;
        let _binding = cancel.bind_interrupt(self.conn.get_interrupt_handle());

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut affected = 0;

        affected += self.people.apply_creates(&tx, cancel)?;
        affected += self.groups.apply_creates(&tx, cancel)?;
        affected += self.subjects.apply_creates(&tx, cancel)?;
        affected += self.group_subjects.apply_creates(&tx, cancel)?;
        affected += self.students.apply_creates(&tx, cancel)?;
        affected += self.teachers.apply_creates(&tx, cancel)?;
        affected += self.schedulers.apply_creates(&tx, cancel)?;
        affected += self.student_attendances.apply_creates(&tx, cancel)?;
        affected += self.attendances.apply_creates(&tx, cancel)?;

        affected += self.people.apply_updates(&tx, cancel)?;
        affected += self.groups.apply_updates(&tx, cancel)?;
        affected += self.subjects.apply_updates(&tx, cancel)?;
        affected += self.group_subjects.apply_updates(&tx, cancel)?;
        affected += self.students.apply_updates(&tx, cancel)?;
        affected += self.teachers.apply_updates(&tx, cancel)?;
        affected += self.schedulers.apply_updates(&tx, cancel)?;
        affected += self.student_attendances.apply_updates(&tx, cancel)?;
        affected += self.attendances.apply_updates(&tx, cancel)?;

        affected += self.attendances.apply_deletes(&tx, cancel)?;
        affected += self.student_attendances.apply_deletes(&tx, cancel)?;
        affected += self.schedulers.apply_deletes(&tx, cancel)?;
        affected += self.teachers.apply_deletes(&tx, cancel)?;
        affected += self.students.apply_deletes(&tx, cancel)?;
        affected += self.group_subjects.apply_deletes(&tx, cancel)?;
        affected += self.subjects.apply_deletes(&tx, cancel)?;
        affected += self.groups.apply_deletes(&tx, cancel)?;
        affected += self.people.apply_deletes(&tx, cancel)?;

        cancel.check()?;
        tx.commit()?;
        Ok(affected)
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn people(&mut self) -> &mut dyn Repository<Person> {
        &mut self.people
    }

    fn students(&mut self) -> &mut dyn Repository<Student> {
        &mut self.students
    }

    fn teachers(&mut self) -> &mut dyn Repository<Teacher> {
        &mut self.teachers
    }

    fn groups(&mut self) -> &mut dyn Repository<Group> {
        &mut self.groups
    }

    fn subjects(&mut self) -> &mut dyn Repository<Subject> {
        &mut self.subjects
    }

    fn group_subjects(&mut self) -> &mut dyn Repository<GroupSubject> {
        &mut self.group_subjects
    }

    fn schedulers(&mut self) -> &mut dyn Repository<AttendanceScheduler> {
        &mut self.schedulers
    }

    fn student_attendances(&mut self) -> &mut dyn Repository<StudentAttendance> {
        &mut self.student_attendances
    }

    fn attendances(&mut self) -> &mut dyn Repository<Attendance> {
        &mut self.attendances
    }

    fn begin(&mut self, cancel: &CancellationToken) {
        self.rollback();
        self.cancel = cancel.clone();
    }

    fn commit(&mut self) -> RepoResult<usize> {
        let changes = self.pending_changes();
        if changes == 0 {
            debug!("event=uow_commit module=repo status=skip changes=0");
            return Ok(0);
        }

        let started_at = Instant::now();
        let result = self.apply_staged();
        self.rollback();

        match &result {
            Ok(affected) => info!(
                "event=uow_commit module=repo status=ok changes={changes} affected_rows={affected} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=uow_commit module=repo status=error changes={changes} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn rollback(&mut self) {
        self.people.discard();
        self.students.discard();
        self.teachers.discard();
        self.groups.discard();
        self.subjects.discard();
        self.group_subjects.discard();
        self.schedulers.discard();
        self.student_attendances.discard();
        self.attendances.discard();
    }
}

fn ensure_attendance_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    ensure_entity_table::<Person>(conn)?;
    ensure_entity_table::<Group>(conn)?;
    ensure_entity_table::<Student>(conn)?;
    ensure_entity_table::<Teacher>(conn)?;
    ensure_entity_table::<Subject>(conn)?;
    ensure_entity_table::<GroupSubject>(conn)?;
    ensure_entity_table::<AttendanceScheduler>(conn)?;
    ensure_entity_table::<StudentAttendance>(conn)?;
    ensure_entity_table::<Attendance>(conn)?;
    Ok(())
}
