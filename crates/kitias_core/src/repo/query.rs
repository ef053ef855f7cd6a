//! Typed query filters and eager-load selections per entity.
//!
//! Every `None` filter field means "no constraint"; set fields are combined
//! with AND. Nested relations follow fixed defaults: a loaded teacher or
//! student always carries its person, a loaded attendance carries its
//! student (with person) and subject.

use crate::model::group::{Group, GroupSubject, Subject};
use crate::model::person::{Person, Student, Teacher};
use crate::model::scheduler::{Attendance, AttendanceScheduler, StudentAttendance};
use crate::model::{
    AttendanceId, EntityId, GroupId, PersonId, SchedulerId, StudentAttendanceId, StudentId,
    SubjectId, TeacherId, ValidationError,
};
use crate::repo::Entity;

/// Selection for entities without navigations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoInclude;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub id: Option<PersonId>,
    /// Case-sensitive exact match.
    pub email: Option<String>,
}

impl PersonFilter {
    pub fn by_id(id: PersonId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub id: Option<StudentId>,
    pub person_id: Option<PersonId>,
    pub group_id: Option<GroupId>,
}

impl StudentFilter {
    pub fn by_id(id: StudentId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentInclude {
    pub person: bool,
    pub group: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherFilter {
    pub id: Option<TeacherId>,
    /// Case-sensitive exact match on the teacher's person email.
    pub email: Option<String>,
}

impl TeacherFilter {
    pub fn by_id(id: TeacherId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeacherInclude {
    pub person: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub id: Option<GroupId>,
    pub number: Option<String>,
}

impl GroupFilter {
    pub fn by_id(id: GroupId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_number(number: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupInclude {
    pub students: bool,
    pub subjects: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectFilter {
    pub id: Option<SubjectId>,
    /// Subjects associated with this group.
    pub group_id: Option<GroupId>,
}

impl SubjectFilter {
    pub fn by_id(id: SubjectId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSubjectFilter {
    pub group_id: Option<GroupId>,
    pub subject_id: Option<SubjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerFilter {
    pub id: Option<SchedulerId>,
    pub teacher_id: Option<TeacherId>,
}

impl SchedulerFilter {
    pub fn by_id(id: SchedulerId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_teacher(teacher_id: TeacherId) -> Self {
        Self {
            teacher_id: Some(teacher_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerInclude {
    pub teacher: bool,
    pub group: bool,
    pub student_attendances: bool,
    pub attendances: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentAttendanceFilter {
    pub id: Option<StudentAttendanceId>,
    pub scheduler_id: Option<SchedulerId>,
    pub student_id: Option<StudentId>,
}

impl StudentAttendanceFilter {
    pub fn by_id(id: StudentAttendanceId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_scheduler(scheduler_id: SchedulerId) -> Self {
        Self {
            scheduler_id: Some(scheduler_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentAttendanceInclude {
    pub student: bool,
    pub attendances: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub id: Option<AttendanceId>,
    pub scheduler_id: Option<SchedulerId>,
    pub student_attendance_id: Option<StudentAttendanceId>,
    pub student_id: Option<StudentId>,
}

impl AttendanceFilter {
    pub fn by_id(id: AttendanceId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_scheduler(scheduler_id: SchedulerId) -> Self {
        Self {
            scheduler_id: Some(scheduler_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceInclude {
    pub student: bool,
    pub subject: bool,
}

impl Entity for Person {
    type Filter = PersonFilter;
    type Include = NoInclude;
    const NAME: &'static str = "person";

    fn id(&self) -> EntityId {
        self.id
    }

    fn check_invariants(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl Entity for Student {
    type Filter = StudentFilter;
    type Include = StudentInclude;
    const NAME: &'static str = "student";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Teacher {
    type Filter = TeacherFilter;
    type Include = TeacherInclude;
    const NAME: &'static str = "teacher";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Group {
    type Filter = GroupFilter;
    type Include = GroupInclude;
    const NAME: &'static str = "group";

    fn id(&self) -> EntityId {
        self.id
    }

    fn check_invariants(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl Entity for Subject {
    type Filter = SubjectFilter;
    type Include = NoInclude;
    const NAME: &'static str = "subject";

    fn id(&self) -> EntityId {
        self.id
    }

    fn check_invariants(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl Entity for GroupSubject {
    type Filter = GroupSubjectFilter;
    type Include = NoInclude;
    const NAME: &'static str = "group_subject";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for AttendanceScheduler {
    type Filter = SchedulerFilter;
    type Include = SchedulerInclude;
    const NAME: &'static str = "scheduler";

    fn id(&self) -> EntityId {
        self.id
    }

    fn check_invariants(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl Entity for StudentAttendance {
    type Filter = StudentAttendanceFilter;
    type Include = StudentAttendanceInclude;
    const NAME: &'static str = "student_attendance";

    fn id(&self) -> EntityId {
        self.id
    }

    fn check_invariants(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl Entity for Attendance {
    type Filter = AttendanceFilter;
    type Include = AttendanceInclude;
    const NAME: &'static str = "attendance";

    fn id(&self) -> EntityId {
        self.id
    }
}
