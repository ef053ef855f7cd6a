//! Study groups, subjects and the group/subject association.

use crate::model::person::Student;
use crate::model::{require_text, EntityId, GroupId, SubjectId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Study group identified externally by its `number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// Alternate key, unique across groups.
    pub number: String,
    pub course: u8,
    #[serde(default)]
    pub education_type: String,
    #[serde(default)]
    pub speciality: String,
    /// Epoch milliseconds.
    pub receipt_date: i64,
    /// Epoch milliseconds.
    pub issue_date: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub students: Vec<Student>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
}

impl Group {
    pub fn new(number: impl Into<String>, course: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
            course,
            education_type: String::new(),
            speciality: String::new(),
            receipt_date: 0,
            issue_date: 0,
            students: Vec::new(),
            subjects: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("group", "number", &self.number)
    }
}

/// Timetable subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub week: String,
    /// Serialized as `type` (lecture, practice, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub time: String,
    /// Fixed date in epoch milliseconds for one-off subjects.
    pub date: Option<i64>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            day: String::new(),
            week: String::new(),
            kind: String::new(),
            time: String::new(),
            date: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("subject", "name", &self.name)
    }
}

/// Join row of the group/subject many-to-many association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSubject {
    pub id: EntityId,
    pub group_id: GroupId,
    pub subject_id: SubjectId,
}

impl GroupSubject {
    pub fn new(group_id: GroupId, subject_id: SubjectId) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            subject_id,
        }
    }
}
