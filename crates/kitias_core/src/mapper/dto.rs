//! Transfer objects returned by the attendance provider.
//!
//! All DTOs serialize as camelCase JSON and carry only display data; they
//! are never mapped back into entities.

use crate::model::scheduler::Grade;
use crate::model::{
    AttendanceId, GroupId, SchedulerId, StudentAttendanceId, StudentId, SubjectId, TeacherId,
};
use serde::Serialize;

/// One row of a teacher's scheduler list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerListItem {
    pub id: SchedulerId,
    /// `None` when no group is assigned.
    pub group_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDto {
    pub id: TeacherId,
    /// Surname, name and patronymic; `None` when the person was not loaded.
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: StudentId,
    pub group_id: GroupId,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDto {
    pub id: GroupId,
    pub number: String,
    pub course: u8,
    pub education_type: String,
    pub speciality: String,
    /// Epoch milliseconds.
    pub receipt_date: i64,
    /// Epoch milliseconds.
    pub issue_date: i64,
    /// Empty unless the group was loaded with its students.
    pub students: Vec<StudentDto>,
}

/// Scheduler with its teacher and (optional) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSchedulerDto {
    pub id: SchedulerId,
    pub name: String,
    pub teacher: Option<TeacherDto>,
    pub group: Option<GroupDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDto {
    pub id: AttendanceId,
    /// Epoch milliseconds.
    pub date: i64,
    pub attended: u8,
    pub score: u8,
    pub theme: Option<String>,
    pub student_id: StudentId,
    pub student_name: Option<String>,
    pub subject_id: SubjectId,
    pub subject_name: Option<String>,
    pub student_attendance_id: Option<StudentAttendanceId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceDto {
    pub id: StudentAttendanceId,
    pub scheduler_id: Option<SchedulerId>,
    pub student_id: Option<StudentId>,
    /// Registered student's full name, or the free-text name.
    pub student_name: Option<String>,
    pub rating: u8,
    pub grade: Grade,
}
