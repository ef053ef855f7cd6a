//! People: persons and their student/teacher roles.
//!
//! # Invariants
//! - `Person.email` is the alternate key; uniqueness is enforced by storage.
//! - Full name is derived on read and never stored.
//! - A student/teacher row is removed together with its person.

use crate::model::group::Group;
use crate::model::{require_text, GroupId, PersonId, StudentId, TeacherId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Natural person shared by students and teachers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub surname: String,
    /// Empty when the person has no patronymic.
    #[serde(default)]
    pub patronymic: String,
    pub email: String,
}

impl Person {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            surname: surname.into(),
            patronymic: String::new(),
            email: email.into(),
        }
    }

    pub fn with_patronymic(mut self, patronymic: impl Into<String>) -> Self {
        self.patronymic = patronymic.into();
        self
    }

    /// `surname name patronymic`, skipping empty parts.
    pub fn full_name(&self) -> String {
        [&self.surname, &self.name, &self.patronymic]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("person", "name", &self.name)?;
        require_text("person", "surname", &self.surname)?;
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// Student role of a person inside one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub person_id: PersonId,
    pub group_id: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
}

impl Student {
    pub fn new(person_id: PersonId, group_id: GroupId) -> Self {
        Self {
            id: Uuid::new_v4(),
            person_id,
            group_id,
            person: None,
            group: None,
        }
    }

    /// Returns the person's full name when the person relation is loaded.
    pub fn full_name(&self) -> Option<String> {
        self.person.as_ref().map(Person::full_name)
    }
}

/// Teacher role of a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub person_id: PersonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
}

impl Teacher {
    pub fn new(person_id: PersonId) -> Self {
        Self {
            id: Uuid::new_v4(),
            person_id,
            person: None,
        }
    }
}
