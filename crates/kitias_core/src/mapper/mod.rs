//! Entity graph to DTO projection.
//!
//! # Responsibility
//! - Convert loaded entities (and whatever relations were included) into
//!   serializable DTOs.
//!
//! # Invariants
//! - Mapping is pure: no storage access, no business rules.
//! - Relations that were not loaded map to `None`/empty, never to errors.

use crate::model::group::Group;
use crate::model::person::{Student, Teacher};
use crate::model::scheduler::{Attendance, AttendanceScheduler, StudentAttendance};

pub mod dto;

pub use dto::{
    AttendanceDto, AttendanceSchedulerDto, GroupDto, SchedulerListItem, StudentAttendanceDto,
    StudentDto, TeacherDto,
};

/// Projection seam used by the attendance provider.
pub trait Mapper {
    fn scheduler_list_item(&self, scheduler: &AttendanceScheduler) -> SchedulerListItem;
    fn scheduler(&self, scheduler: &AttendanceScheduler) -> AttendanceSchedulerDto;
    fn teacher(&self, teacher: &Teacher) -> TeacherDto;
    fn student(&self, student: &Student) -> StudentDto;
    fn group(&self, group: &Group) -> GroupDto;
    fn attendance(&self, attendance: &Attendance) -> AttendanceDto;
    fn student_attendance(&self, entry: &StudentAttendance) -> StudentAttendanceDto;

    fn scheduler_list(&self, schedulers: &[AttendanceScheduler]) -> Vec<SchedulerListItem> {
        schedulers
            .iter()
            .map(|scheduler| self.scheduler_list_item(scheduler))
            .collect()
    }

    fn attendances(&self, attendances: &[Attendance]) -> Vec<AttendanceDto> {
        attendances
            .iter()
            .map(|attendance| self.attendance(attendance))
            .collect()
    }

    fn student_attendances(&self, entries: &[StudentAttendance]) -> Vec<StudentAttendanceDto> {
        entries
            .iter()
            .map(|entry| self.student_attendance(entry))
            .collect()
    }
}

/// Field-by-field mapper used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMapper;

impl Mapper for DefaultMapper {
    fn scheduler_list_item(&self, scheduler: &AttendanceScheduler) -> SchedulerListItem {
        SchedulerListItem {
            id: scheduler.id,
            group_number: scheduler.group.as_ref().map(|group| group.number.clone()),
        }
    }

    fn scheduler(&self, scheduler: &AttendanceScheduler) -> AttendanceSchedulerDto {
        AttendanceSchedulerDto {
            id: scheduler.id,
            name: scheduler.name.clone(),
            teacher: scheduler.teacher.as_ref().map(|teacher| self.teacher(teacher)),
            group: scheduler.group.as_ref().map(|group| self.group(group)),
        }
    }

    fn teacher(&self, teacher: &Teacher) -> TeacherDto {
        TeacherDto {
            id: teacher.id,
            full_name: teacher.person.as_ref().map(|person| person.full_name()),
            email: teacher.person.as_ref().map(|person| person.email.clone()),
        }
    }

    fn student(&self, student: &Student) -> StudentDto {
        StudentDto {
            id: student.id,
            group_id: student.group_id,
            full_name: student.full_name(),
            email: student.person.as_ref().map(|person| person.email.clone()),
        }
    }

    fn group(&self, group: &Group) -> GroupDto {
        GroupDto {
            id: group.id,
            number: group.number.clone(),
            course: group.course,
            education_type: group.education_type.clone(),
            speciality: group.speciality.clone(),
            receipt_date: group.receipt_date,
            issue_date: group.issue_date,
            students: group
                .students
                .iter()
                .map(|student| self.student(student))
                .collect(),
        }
    }

    fn attendance(&self, attendance: &Attendance) -> AttendanceDto {
        AttendanceDto {
            id: attendance.id,
            date: attendance.date,
            attended: attendance.attended,
            score: attendance.score,
            theme: attendance.theme.clone(),
            student_id: attendance.student_id,
            student_name: attendance.student.as_ref().and_then(Student::full_name),
            subject_id: attendance.subject_id,
            subject_name: attendance
                .subject
                .as_ref()
                .map(|subject| subject.name.clone()),
            student_attendance_id: attendance.student_attendance_id,
        }
    }

    fn student_attendance(&self, entry: &StudentAttendance) -> StudentAttendanceDto {
        StudentAttendanceDto {
            id: entry.id,
            scheduler_id: entry.scheduler_id,
            student_id: entry.student_id,
            student_name: entry.display_name(),
            rating: entry.rating,
            grade: entry.grade,
        }
    }
}
