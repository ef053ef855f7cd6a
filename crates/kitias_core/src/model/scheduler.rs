//! Attendance scheduling: schedulers, per-student grading and attendance rows.
//!
//! # Responsibility
//! - Define the per-session container (`AttendanceScheduler`) and its records.
//! - Provide the symbolic `Grade` vocabulary and its strict parser.
//!
//! # Invariants
//! - A scheduler always has a teacher; its group is optional.
//! - `StudentAttendance` references exactly one of `student_id` or
//!   `student_name`, never both and never neither.
//! - Removing a scheduler removes its student attendances and attendances.

use crate::model::person::{Student, Teacher};
use crate::model::group::{Group, Subject};
use crate::model::{
    require_text, AttendanceId, GroupId, SchedulerId, StudentAttendanceId, StudentId, SubjectId,
    TeacherId, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Symbolic grade given to a student within one scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Satisfactory,
    Unsatisfactory,
    /// Credit without a mark.
    Passed,
    Failed,
    /// Student did not show up for grading.
    Absent,
}

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::Excellent,
        Grade::Good,
        Grade::Satisfactory,
        Grade::Unsatisfactory,
        Grade::Passed,
        Grade::Failed,
        Grade::Absent,
    ];

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Satisfactory => "satisfactory",
            Grade::Unsatisfactory => "unsatisfactory",
            Grade::Passed => "passed",
            Grade::Failed => "failed",
            Grade::Absent => "absent",
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade text that matches no known grade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeParseError(pub String);

impl Display for GradeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown grade `{}`", self.0)
    }
}

impl Error for GradeParseError {}

impl FromStr for Grade {
    type Err = GradeParseError;

    /// Case-insensitive match on the symbolic name; no fallback value.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Grade::ALL
            .into_iter()
            .find(|grade| grade.as_str() == normalized)
            .ok_or_else(|| GradeParseError(value.to_string()))
    }
}

/// Teacher-owned container for one teaching session's attendance records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceScheduler {
    pub id: SchedulerId,
    pub name: String,
    pub teacher_id: TeacherId,
    /// `None` until a group is assigned.
    pub group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<Teacher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub student_attendances: Vec<StudentAttendance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendances: Vec<Attendance>,
}

impl AttendanceScheduler {
    pub fn new(name: impl Into<String>, teacher_id: TeacherId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teacher_id,
            group_id: None,
            teacher: None,
            group: None,
            student_attendances: Vec::new(),
            attendances: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("scheduler", "name", &self.name)
    }
}

/// Per-student grading record within a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAttendance {
    pub id: StudentAttendanceId,
    pub scheduler_id: Option<SchedulerId>,
    /// Set for registered students; `None` when `student_name` is used.
    pub student_id: Option<StudentId>,
    /// Free-text name for students without a registered entity.
    pub student_name: Option<String>,
    pub rating: u8,
    pub grade: Grade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendances: Vec<Attendance>,
}

impl StudentAttendance {
    pub fn for_student(student_id: StudentId, rating: u8, grade: Grade) -> Self {
        Self::with_reference(Some(student_id), None, rating, grade)
    }

    pub fn for_name(student_name: impl Into<String>, rating: u8, grade: Grade) -> Self {
        Self::with_reference(None, Some(student_name.into()), rating, grade)
    }

    fn with_reference(
        student_id: Option<StudentId>,
        student_name: Option<String>,
        rating: u8,
        grade: Grade,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scheduler_id: None,
            student_id,
            student_name,
            rating,
            grade,
            student: None,
            attendances: Vec::new(),
        }
    }

    /// Registered student's full name, falling back to the free-text name.
    pub fn display_name(&self) -> Option<String> {
        self.student
            .as_ref()
            .and_then(Student::full_name)
            .or_else(|| self.student_name.clone())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.student_id, self.student_name.as_deref()) {
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousStudentReference),
            (None, None) => Err(ValidationError::MissingStudentReference),
            (None, Some(name)) => require_text("student_attendance", "student_name", name),
            (Some(_), None) => Ok(()),
        }
    }
}

/// Per-subject, per-date attendance record of one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub student_attendance_id: Option<StudentAttendanceId>,
    pub scheduler_id: Option<SchedulerId>,
    /// Epoch milliseconds.
    pub date: i64,
    /// Attended count for the date; `0` means absent.
    pub attended: u8,
    pub score: u8,
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
}

impl Attendance {
    pub fn new(student_id: StudentId, subject_id: SubjectId, date: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            subject_id,
            student_attendance_id: None,
            scheduler_id: None,
            date,
            attended: 0,
            score: 0,
            theme: None,
            student: None,
            subject: None,
        }
    }
}
