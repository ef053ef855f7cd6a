//! Attendance scheduling use-case service.
//!
//! # Responsibility
//! - Orchestrate reads, staged writes and commits over one `UnitOfWork`.
//! - Translate every failure into an `Outcome::Failure` with a short
//!   user-facing message; log the diagnostic detail instead.
//!
//! # Invariants
//! - Each operation is one logical unit of work: `begin`, stage, `commit`
//!   once; any failure rolls back every staged change.
//! - Referenced entities are resolved before anything is staged; a missing
//!   reference fails the whole operation.
//! - A commit that affects zero rows when a change was staged is not a
//!   business failure: it is returned as `ProviderError`.
//! - Logs carry ids and counts only, never emails or names.

use crate::cancel::{CancellationToken, Cancelled};
use crate::mapper::{
    AttendanceDto, AttendanceSchedulerDto, DefaultMapper, Mapper, SchedulerListItem,
    StudentAttendanceDto,
};
use crate::model::person::{Student, Teacher};
use crate::model::scheduler::{Attendance, AttendanceScheduler, Grade, StudentAttendance};
use crate::model::{
    AttendanceId, SchedulerId, StudentAttendanceId, StudentId, SubjectId, ValidationError,
};
use crate::repo::query::{
    AttendanceFilter, AttendanceInclude, GroupFilter, GroupInclude, NoInclude, SchedulerFilter,
    SchedulerInclude, StudentAttendanceFilter, StudentAttendanceInclude, StudentFilter,
    StudentInclude, SubjectFilter, TeacherFilter, TeacherInclude,
};
use crate::repo::{RepoError, UnitOfWork};
use crate::service::outcome::{Failure, Outcome};
use log::{error, info};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const SCHEDULER_STORE_ERROR: &str = "Error scheduler data";
const STUDENT_ATTENDANCE_STORE_ERROR: &str = "Error student attendances data";
const ATTENDANCE_STORE_ERROR: &str = "Error attendance data";

const TEACHER_NOT_FOUND: &str = "Couldn't find teacher";
const SCHEDULER_NOT_FOUND: &str = "Couldn't find scheduler";
const GROUP_NOT_FOUND: &str = "Couldn't find group";
const STUDENT_NOT_FOUND: &str = "Couldn't find student";
const SUBJECT_NOT_FOUND: &str = "Couldn't find subject";
const STUDENT_ATTENDANCE_NOT_FOUND: &str = "Couldn't find student attendance";
const ATTENDANCE_NOT_FOUND: &str = "Couldn't find attendance";

const ENTER_STUDENTS: &str = "Enter students";
const ENTER_ATTENDANCES: &str = "Enter attendances";
const AMBIGUOUS_STUDENT: &str = "Enter either a student id or a student name";
const INVALID_GRADE: &str = "Enter a valid grade";

const SCHEDULER_DELETED: &str = "Scheduler successfully deleted";

/// Unrecoverable provider error; everything else is an `Outcome::Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// A commit with staged changes reported zero affected rows.
    NothingPersisted { operation: &'static str },
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingPersisted { operation } => {
                write!(f, "{operation} staged changes but persisted nothing")
            }
        }
    }
}

impl Error for ProviderError {}

pub type ProviderResult<T> = Result<Outcome<T>, ProviderError>;

/// Input of `create_scheduler`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedulerRequest {
    pub teacher_email: String,
    pub name: String,
    /// Matched exactly after trimming surrounding whitespace. Blank or
    /// unknown numbers leave the scheduler without a group.
    #[serde(default)]
    pub group_number: Option<String>,
}

/// Input of `update_scheduler`; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchedulerRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Matched exactly after trimming surrounding whitespace. A supplied
    /// number, blank included, must resolve to a group.
    #[serde(default)]
    pub group_number: Option<String>,
}

/// One entry of `create_student_attendances`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceRequest {
    #[serde(default)]
    pub scheduler_id: Option<SchedulerId>,
    #[serde(default)]
    pub student_id: Option<StudentId>,
    #[serde(default)]
    pub student_name: Option<String>,
    /// Decimal text in `0..=255`.
    pub rating: String,
    /// Symbolic grade name, case-insensitive.
    pub grade: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentAttendanceRequest {
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

/// One entry of `create_attendances`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub student_attendance_id: Option<StudentAttendanceId>,
    /// Epoch milliseconds.
    pub date: i64,
    /// Decimal text in `0..=255`; `0` means absent.
    pub attended: String,
    /// Decimal text in `0..=255`.
    pub score: String,
    #[serde(default)]
    pub theme: Option<String>,
}

/// Input of `update_attendance`; `Some("")` theme clears the theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceRequest {
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub attended: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

enum OpError {
    /// Business rejection decided by the provider itself.
    Rejected { failure: Failure, detail: String },
    Repo(RepoError),
    Fatal(ProviderError),
}

impl OpError {
    fn rejected(failure: Failure, detail: impl Into<String>) -> Self {
        Self::Rejected {
            failure,
            detail: detail.into(),
        }
    }
}

impl From<RepoError> for OpError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<Cancelled> for OpError {
    fn from(value: Cancelled) -> Self {
        Self::Repo(value.into())
    }
}

type OpResult<T> = Result<T, OpError>;

/// Attendance scheduling facade over a unit of work and a mapper.
pub struct AttendanceProvider<U: UnitOfWork, M: Mapper = DefaultMapper> {
    unit_of_work: U,
    mapper: M,
}

impl<U: UnitOfWork> AttendanceProvider<U> {
    /// Creates a provider with the default mapper.
    pub fn new(unit_of_work: U) -> Self {
        Self::with_mapper(unit_of_work, DefaultMapper)
    }
}

impl<U: UnitOfWork, M: Mapper> AttendanceProvider<U, M> {
    pub fn with_mapper(unit_of_work: U, mapper: M) -> Self {
        Self {
            unit_of_work,
            mapper,
        }
    }

    pub fn unit_of_work(&self) -> &U {
        &self.unit_of_work
    }

    pub fn into_unit_of_work(self) -> U {
        self.unit_of_work
    }

    /// Lists schedulers owned by the teacher with `email` (exact match).
    pub fn list_teacher_schedulers(
        &mut self,
        email: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<SchedulerListItem>> {
        self.run(
            "list_teacher_schedulers",
            SCHEDULER_STORE_ERROR,
            cancel,
            |uow, mapper| {
                cancel.check()?;
                let teacher = find_teacher(uow, email)?;
                let schedulers = uow.schedulers().find_by(
                    &SchedulerFilter::by_teacher(teacher.id),
                    SchedulerInclude {
                        group: true,
                        ..SchedulerInclude::default()
                    },
                )?;
                Ok(Outcome::Success(mapper.scheduler_list(&schedulers)))
            },
        )
    }

    /// Lists the scheduler's attendance entries, ascending by date.
    pub fn list_scheduler_attendances(
        &mut self,
        scheduler_id: SchedulerId,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<AttendanceDto>> {
        self.run(
            "list_scheduler_attendances",
            ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, mapper| {
                cancel.check()?;
                let mut scheduler = find_scheduler(
                    uow,
                    scheduler_id,
                    SchedulerInclude {
                        group: true,
                        attendances: true,
                        ..SchedulerInclude::default()
                    },
                )?;
                scheduler
                    .attendances
                    .sort_by_key(|attendance| attendance.date);
                Ok(Outcome::Success(mapper.attendances(&scheduler.attendances)))
            },
        )
    }

    /// Lists the scheduler's per-student grading entries.
    pub fn list_scheduler_student_attendances(
        &mut self,
        scheduler_id: SchedulerId,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<StudentAttendanceDto>> {
        self.run(
            "list_scheduler_student_attendances",
            STUDENT_ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, mapper| {
                cancel.check()?;
                let scheduler = find_scheduler(
                    uow,
                    scheduler_id,
                    SchedulerInclude {
                        group: true,
                        student_attendances: true,
                        ..SchedulerInclude::default()
                    },
                )?;
                Ok(Outcome::Success(
                    mapper.student_attendances(&scheduler.student_attendances),
                ))
            },
        )
    }

    /// Creates a scheduler for the teacher with `request.teacher_email`.
    ///
    /// # Contract
    /// - Unknown teacher fails with `NotFound`; nothing is staged.
    /// - Unknown or blank group number leaves the group unset.
    pub fn create_scheduler(
        &mut self,
        request: &CreateSchedulerRequest,
        cancel: &CancellationToken,
    ) -> ProviderResult<AttendanceSchedulerDto> {
        self.run(
            "create_scheduler",
            SCHEDULER_STORE_ERROR,
            cancel,
            |uow, mapper| {
                cancel.check()?;
                let teacher = find_teacher(uow, &request.teacher_email)?;
                info!(
                    "event=create_scheduler module=provider status=resolve teacher_id={}",
                    teacher.id
                );

                let group = match non_blank(request.group_number.as_deref()) {
                    Some(number) => uow
                        .groups()
                        .single(&GroupFilter::by_number(number), GroupInclude::default())?,
                    None => None,
                };
                if let Some(group) = &group {
                    info!(
                        "event=create_scheduler module=provider status=resolve group_id={}",
                        group.id
                    );
                }

                let mut scheduler = AttendanceScheduler::new(request.name.trim(), teacher.id);
                scheduler.group_id = group.as_ref().map(|group| group.id);
                uow.schedulers().create(scheduler.clone())?;
                cancel.check()?;
                commit_changes(uow, "create_scheduler")?;

                info!(
                    "event=create_scheduler module=provider status=created scheduler_id={}",
                    scheduler.id
                );
                scheduler.teacher = Some(teacher);
                scheduler.group = group;
                Ok(Outcome::Success(mapper.scheduler(&scheduler)))
            },
        )
    }

    /// Renames and/or regroups a scheduler.
    ///
    /// # Contract
    /// - A supplied group number must resolve, otherwise `NotFound`
    ///   "Couldn't find group" before anything is staged.
    pub fn update_scheduler(
        &mut self,
        scheduler_id: SchedulerId,
        request: &UpdateSchedulerRequest,
        cancel: &CancellationToken,
    ) -> ProviderResult<AttendanceSchedulerDto> {
        self.run(
            "update_scheduler",
            SCHEDULER_STORE_ERROR,
            cancel,
            |uow, mapper| {
                cancel.check()?;
                let mut scheduler = find_scheduler(
                    uow,
                    scheduler_id,
                    SchedulerInclude {
                        teacher: true,
                        group: true,
                        ..SchedulerInclude::default()
                    },
                )?;

                if let Some(number) = request.group_number.as_deref().map(str::trim) {
                    let group = if number.is_empty() {
                        None
                    } else {
                        uow.groups()
                            .single(&GroupFilter::by_number(number), GroupInclude::default())?
                    };
                    let group = group.ok_or_else(|| {
                        OpError::rejected(
                            Failure::not_found(GROUP_NOT_FOUND),
                            format!("group lookup by number matched no row scheduler_id={scheduler_id}"),
                        )
                    })?;
                    scheduler.group_id = Some(group.id);
                    scheduler.group = Some(group);
                }
                if let Some(name) = &request.name {
                    scheduler.name = name.trim().to_string();
                }

                uow.schedulers().update(scheduler.clone())?;
                cancel.check()?;
                commit_changes(uow, "update_scheduler")?;
                Ok(Outcome::Success(mapper.scheduler(&scheduler)))
            },
        )
    }

    /// Deletes a scheduler; its entries go with it by cascade.
    pub fn delete_scheduler(
        &mut self,
        scheduler_id: SchedulerId,
        cancel: &CancellationToken,
    ) -> ProviderResult<String> {
        self.run(
            "delete_scheduler",
            SCHEDULER_STORE_ERROR,
            cancel,
            |uow, _mapper| {
                cancel.check()?;
                let scheduler = find_scheduler(uow, scheduler_id, SchedulerInclude::default())?;
                uow.schedulers().delete(&scheduler);
                cancel.check()?;
                commit_changes(uow, "delete_scheduler")?;
                Ok(Outcome::Success(SCHEDULER_DELETED.to_string()))
            },
        )
    }

    /// Creates a batch of student grading entries, all or nothing.
    ///
    /// # Contract
    /// - Each entry names exactly one of a student id or a non-blank
    ///   student name.
    /// - `rating` must parse as a byte and `grade` as a known grade.
    /// - The first failing entry discards every staged entry.
    pub fn create_student_attendances(
        &mut self,
        requests: &[StudentAttendanceRequest],
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<StudentAttendanceDto>> {
        self.run(
            "create_student_attendances",
            STUDENT_ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, mapper| {
                if requests.is_empty() {
                    return Err(OpError::rejected(
                        Failure::invalid(ENTER_STUDENTS),
                        "empty batch",
                    ));
                }

                let mut created = Vec::with_capacity(requests.len());
                for (index, request) in requests.iter().enumerate() {
                    cancel.check()?;
                    let student_name = non_blank(request.student_name.as_deref());
                    let reference = match (request.student_id, student_name) {
                        (Some(_), Some(_)) => {
                            return Err(OpError::rejected(
                                Failure::invalid(AMBIGUOUS_STUDENT),
                                format!("entry={index} sets both student id and student name"),
                            ));
                        }
                        (None, None) => {
                            return Err(OpError::rejected(
                                Failure::invalid(ENTER_STUDENTS),
                                format!("entry={index} sets neither student id nor student name"),
                            ));
                        }
                        (Some(student_id), None) => StudentReference::Registered(student_id),
                        (None, Some(name)) => StudentReference::FreeText(name),
                    };
                    let rating = parse_byte("rating", &request.rating)?;
                    let grade = parse_grade(&request.grade)?;

                    let mut entry = match reference {
                        StudentReference::Registered(student_id) => {
                            let student = find_student(uow, student_id)?;
                            let mut entry = StudentAttendance::for_student(student_id, rating, grade);
                            entry.student = Some(student);
                            entry
                        }
                        StudentReference::FreeText(name) => {
                            StudentAttendance::for_name(name, rating, grade)
                        }
                    };
                    if let Some(scheduler_id) = request.scheduler_id {
                        find_scheduler(uow, scheduler_id, SchedulerInclude::default())?;
                        entry.scheduler_id = Some(scheduler_id);
                    }

                    uow.student_attendances().create(entry.clone())?;
                    info!(
                        "event=create_student_attendances module=provider status=staged entry={index} student_attendance_id={}",
                        entry.id
                    );
                    created.push(entry);
                }

                cancel.check()?;
                commit_changes(uow, "create_student_attendances")?;
                Ok(Outcome::Success(mapper.student_attendances(&created)))
            },
        )
    }

    /// Replaces rating and/or grade of one grading entry.
    pub fn update_student_attendance(
        &mut self,
        student_attendance_id: StudentAttendanceId,
        request: &UpdateStudentAttendanceRequest,
        cancel: &CancellationToken,
    ) -> ProviderResult<StudentAttendanceDto> {
        self.run(
            "update_student_attendance",
            STUDENT_ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, mapper| {
                cancel.check()?;
                let mut entry = find_student_attendance(
                    uow,
                    student_attendance_id,
                    StudentAttendanceInclude {
                        student: true,
                        attendances: false,
                    },
                )?;
                if let Some(rating) = &request.rating {
                    entry.rating = parse_byte("rating", rating)?;
                }
                if let Some(grade) = &request.grade {
                    entry.grade = parse_grade(grade)?;
                }

                uow.student_attendances().update(entry.clone())?;
                cancel.check()?;
                commit_changes(uow, "update_student_attendance")?;
                Ok(Outcome::Success(mapper.student_attendance(&entry)))
            },
        )
    }

    /// Deletes one grading entry and, by cascade, its attendance rows.
    pub fn delete_student_attendance(
        &mut self,
        student_attendance_id: StudentAttendanceId,
        cancel: &CancellationToken,
    ) -> ProviderResult<()> {
        self.run(
            "delete_student_attendance",
            STUDENT_ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, _mapper| {
                cancel.check()?;
                let entry = find_student_attendance(
                    uow,
                    student_attendance_id,
                    StudentAttendanceInclude::default(),
                )?;
                uow.student_attendances().delete(&entry);
                cancel.check()?;
                commit_changes(uow, "delete_student_attendance")?;
                Ok(Outcome::Completed)
            },
        )
    }

    /// Records a batch of attendance rows under one scheduler, all or
    /// nothing; returns them ascending by date.
    pub fn create_attendances(
        &mut self,
        scheduler_id: SchedulerId,
        requests: &[AttendanceRequest],
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<AttendanceDto>> {
        self.run(
            "create_attendances",
            ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, mapper| {
                if requests.is_empty() {
                    return Err(OpError::rejected(
                        Failure::invalid(ENTER_ATTENDANCES),
                        "empty batch",
                    ));
                }
                cancel.check()?;
                let scheduler = find_scheduler(uow, scheduler_id, SchedulerInclude::default())?;

                let mut created = Vec::with_capacity(requests.len());
                for (index, request) in requests.iter().enumerate() {
                    cancel.check()?;
                    let attended = parse_byte("attended count", &request.attended)?;
                    let score = parse_byte("score", &request.score)?;
                    let student = find_student(uow, request.student_id)?;
                    let subject = uow
                        .subjects()
                        .single(&SubjectFilter::by_id(request.subject_id), NoInclude)?
                        .ok_or_else(|| {
                            OpError::rejected(
                                Failure::not_found(SUBJECT_NOT_FOUND),
                                format!("entry={index} subject_id={} matched no row", request.subject_id),
                            )
                        })?;
                    if let Some(entry_id) = request.student_attendance_id {
                        find_student_attendance(uow, entry_id, StudentAttendanceInclude::default())?;
                    }

                    let mut attendance =
                        Attendance::new(request.student_id, request.subject_id, request.date);
                    attendance.scheduler_id = Some(scheduler.id);
                    attendance.student_attendance_id = request.student_attendance_id;
                    attendance.attended = attended;
                    attendance.score = score;
                    attendance.theme = non_blank(request.theme.as_deref()).map(str::to_string);

                    uow.attendances().create(attendance.clone())?;
                    attendance.student = Some(student);
                    attendance.subject = Some(subject);
                    created.push(attendance);
                }

                cancel.check()?;
                commit_changes(uow, "create_attendances")?;
                created.sort_by_key(|attendance| attendance.date);
                Ok(Outcome::Success(mapper.attendances(&created)))
            },
        )
    }

    /// Updates date, counts and/or theme of one attendance row.
    pub fn update_attendance(
        &mut self,
        attendance_id: AttendanceId,
        request: &UpdateAttendanceRequest,
        cancel: &CancellationToken,
    ) -> ProviderResult<AttendanceDto> {
        self.run(
            "update_attendance",
            ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, mapper| {
                cancel.check()?;
                let mut attendance = find_attendance(
                    uow,
                    attendance_id,
                    AttendanceInclude {
                        student: true,
                        subject: true,
                    },
                )?;
                if let Some(date) = request.date {
                    attendance.date = date;
                }
                if let Some(attended) = &request.attended {
                    attendance.attended = parse_byte("attended count", attended)?;
                }
                if let Some(score) = &request.score {
                    attendance.score = parse_byte("score", score)?;
                }
                if let Some(theme) = &request.theme {
                    attendance.theme = non_blank(Some(theme.as_str())).map(str::to_string);
                }

                uow.attendances().update(attendance.clone())?;
                cancel.check()?;
                commit_changes(uow, "update_attendance")?;
                Ok(Outcome::Success(mapper.attendance(&attendance)))
            },
        )
    }

    pub fn delete_attendance(
        &mut self,
        attendance_id: AttendanceId,
        cancel: &CancellationToken,
    ) -> ProviderResult<()> {
        self.run(
            "delete_attendance",
            ATTENDANCE_STORE_ERROR,
            cancel,
            |uow, _mapper| {
                cancel.check()?;
                let attendance =
                    find_attendance(uow, attendance_id, AttendanceInclude::default())?;
                uow.attendances().delete(&attendance);
                cancel.check()?;
                commit_changes(uow, "delete_attendance")?;
                Ok(Outcome::Completed)
            },
        )
    }

    fn run<T>(
        &mut self,
        operation: &'static str,
        store_message: &'static str,
        cancel: &CancellationToken,
        body: impl FnOnce(&mut U, &M) -> OpResult<Outcome<T>>,
    ) -> ProviderResult<T> {
        let started_at = Instant::now();
        self.unit_of_work.begin(cancel);
        let result = body(&mut self.unit_of_work, &self.mapper);
        if result.is_err() {
            self.unit_of_work.rollback();
        }
        let duration_ms = started_at.elapsed().as_millis();

        match result {
            Ok(outcome) => {
                info!("event={operation} module=provider status=ok duration_ms={duration_ms}");
                Ok(outcome)
            }
            Err(OpError::Rejected { failure, detail }) => {
                error!(
                    "event={operation} module=provider status=error error_code={} duration_ms={duration_ms} detail={detail}",
                    failure.kind.as_str()
                );
                Ok(Outcome::Failure(failure))
            }
            Err(OpError::Repo(err)) => {
                let failure = match &err {
                    RepoError::Cancelled => Failure::cancelled(),
                    RepoError::Validation(validation) => {
                        Failure::invalid(validation_message(validation))
                    }
                    _ => Failure::store(store_message),
                };
                let error_code = if err.is_constraint_violation() {
                    "constraint_violation"
                } else {
                    failure.kind.as_str()
                };
                error!(
                    "event={operation} module=provider status=error error_code={error_code} duration_ms={duration_ms} error={err}"
                );
                Ok(Outcome::Failure(failure))
            }
            Err(OpError::Fatal(err)) => {
                error!(
                    "event={operation} module=provider status=error error_code=nothing_persisted duration_ms={duration_ms} error={err}"
                );
                Err(err)
            }
        }
    }
}

enum StudentReference<'a> {
    Registered(StudentId),
    FreeText(&'a str),
}

fn commit_changes<U: UnitOfWork>(uow: &mut U, operation: &'static str) -> OpResult<usize> {
    let affected = uow.commit()?;
    if affected == 0 {
        return Err(OpError::Fatal(ProviderError::NothingPersisted { operation }));
    }
    Ok(affected)
}

fn find_teacher<U: UnitOfWork>(uow: &mut U, email: &str) -> OpResult<Teacher> {
    uow.teachers()
        .single(&TeacherFilter::by_email(email), TeacherInclude { person: true })?
        .ok_or_else(|| {
            OpError::rejected(
                Failure::not_found(TEACHER_NOT_FOUND),
                "teacher lookup by email matched no row",
            )
        })
}

fn find_scheduler<U: UnitOfWork>(
    uow: &mut U,
    scheduler_id: SchedulerId,
    include: SchedulerInclude,
) -> OpResult<AttendanceScheduler> {
    uow.schedulers()
        .single(&SchedulerFilter::by_id(scheduler_id), include)?
        .ok_or_else(|| {
            OpError::rejected(
                Failure::not_found(SCHEDULER_NOT_FOUND),
                format!("scheduler_id={scheduler_id} matched no row"),
            )
        })
}

fn find_student<U: UnitOfWork>(uow: &mut U, student_id: StudentId) -> OpResult<Student> {
    uow.students()
        .single(
            &StudentFilter::by_id(student_id),
            StudentInclude {
                person: true,
                group: false,
            },
        )?
        .ok_or_else(|| {
            OpError::rejected(
                Failure::not_found(STUDENT_NOT_FOUND),
                format!("student_id={student_id} matched no row"),
            )
        })
}

fn find_student_attendance<U: UnitOfWork>(
    uow: &mut U,
    student_attendance_id: StudentAttendanceId,
    include: StudentAttendanceInclude,
) -> OpResult<StudentAttendance> {
    uow.student_attendances()
        .single(&StudentAttendanceFilter::by_id(student_attendance_id), include)?
        .ok_or_else(|| {
            OpError::rejected(
                Failure::not_found(STUDENT_ATTENDANCE_NOT_FOUND),
                format!("student_attendance_id={student_attendance_id} matched no row"),
            )
        })
}

fn find_attendance<U: UnitOfWork>(
    uow: &mut U,
    attendance_id: AttendanceId,
    include: AttendanceInclude,
) -> OpResult<Attendance> {
    uow.attendances()
        .single(&AttendanceFilter::by_id(attendance_id), include)?
        .ok_or_else(|| {
            OpError::rejected(
                Failure::not_found(ATTENDANCE_NOT_FOUND),
                format!("attendance_id={attendance_id} matched no row"),
            )
        })
}

/// Parses a trimmed decimal byte; no clamping or fallback.
fn parse_byte(field: &'static str, text: &str) -> OpResult<u8> {
    text.trim().parse::<u8>().map_err(|err| {
        OpError::rejected(
            Failure::invalid(format!("Enter a valid {field}")),
            format!("{field} parse failed: {err}"),
        )
    })
}

fn parse_grade(text: &str) -> OpResult<Grade> {
    text.parse::<Grade>()
        .map_err(|_| OpError::rejected(Failure::invalid(INVALID_GRADE), "grade parse failed"))
}

/// Fixed user-facing text for a staging validation failure.
fn validation_message(err: &ValidationError) -> String {
    match err {
        ValidationError::BlankField { entity, field } => format!(
            "Enter a valid {} {}",
            entity.replace('_', " "),
            field.replace('_', " ")
        ),
        ValidationError::InvalidEmail(_) => "Enter a valid email".to_string(),
        ValidationError::AmbiguousStudentReference => AMBIGUOUS_STUDENT.to_string(),
        ValidationError::MissingStudentReference => ENTER_STUDENTS.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{non_blank, parse_byte, parse_grade, validation_message, OpError};
    use crate::model::scheduler::Grade;
    use crate::model::ValidationError;
    use crate::service::outcome::FailureKind;

    fn rejected_kind<T>(result: Result<T, OpError>) -> FailureKind {
        match result {
            Err(OpError::Rejected { failure, .. }) => failure.kind,
            _ => panic!("expected rejection"),
        }
    }

    #[test]
    fn parse_byte_accepts_trimmed_range_and_rejects_the_rest() {
        assert_eq!(parse_byte("rating", " 255 ").ok(), Some(255));
        assert_eq!(parse_byte("rating", "0").ok(), Some(0));
        assert_eq!(rejected_kind(parse_byte("rating", "256")), FailureKind::Invalid);
        assert_eq!(rejected_kind(parse_byte("rating", "abc")), FailureKind::Invalid);
        assert_eq!(rejected_kind(parse_byte("rating", "-1")), FailureKind::Invalid);
    }

    #[test]
    fn parse_grade_has_no_default() {
        assert_eq!(parse_grade("GOOD").ok(), Some(Grade::Good));
        assert_eq!(rejected_kind(parse_grade("great")), FailureKind::Invalid);
    }

    #[test]
    fn validation_message_hides_internal_field_paths() {
        let blank_name = ValidationError::BlankField {
            entity: "scheduler",
            field: "name",
        };
        assert_eq!(validation_message(&blank_name), "Enter a valid scheduler name");
        assert_eq!(
            validation_message(&ValidationError::InvalidEmail("x".to_string())),
            "Enter a valid email"
        );
        assert_eq!(
            validation_message(&ValidationError::MissingStudentReference),
            "Enter students"
        );
    }

    #[test]
    fn non_blank_treats_whitespace_as_absent() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" IT-21 ")), Some("IT-21"));
        assert_eq!(non_blank(None), None);
    }
}
