//! Person, student and teacher storage mappings.

use super::{get_uuid, SelectBuilder, SqlEntity};
use crate::model::group::Group;
use crate::model::person::{Person, Student, Teacher};
use crate::repo::query::{
    GroupFilter, GroupInclude, NoInclude, PersonFilter, StudentFilter, StudentInclude,
    TeacherFilter, TeacherInclude,
};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row};

const PERSON_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.name AS name,
    p.surname AS surname,
    p.patronymic AS patronymic,
    p.email AS email
FROM persons p";

const STUDENT_SELECT_SQL: &str = "SELECT
    s.id AS id,
    s.person_id AS person_id,
    s.group_id AS group_id
FROM students s";

const TEACHER_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.person_id AS person_id
FROM teachers t
INNER JOIN persons p ON p.id = t.person_id";

impl SqlEntity for Person {
    const TABLE: &'static str = "persons";
    const COLUMNS: &'static [&'static str] = &["id", "name", "surname", "patronymic", "email"];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO persons (id, name, surname, patronymic, email)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.surname.as_str(),
                self.patronymic.as_str(),
                self.email.as_str(),
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE persons
             SET name = ?2, surname = ?3, patronymic = ?4, email = ?5
             WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.surname.as_str(),
                self.patronymic.as_str(),
                self.email.as_str(),
            ],
        )
    }

    fn load(conn: &Connection, filter: &PersonFilter, _include: NoInclude) -> RepoResult<Vec<Self>> {
        SelectBuilder::new(PERSON_SELECT_SQL)
            .eq_uuid("p.id", filter.id)
            .eq_text("p.email", filter.email.as_deref())
            .order_by("p.rowid ASC")
            .fetch(conn, parse_person_row)
    }
}

impl SqlEntity for Student {
    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] = &["id", "person_id", "group_id"];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO students (id, person_id, group_id) VALUES (?1, ?2, ?3);",
            params![
                self.id.to_string(),
                self.person_id.to_string(),
                self.group_id.to_string(),
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE students SET person_id = ?2, group_id = ?3 WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.person_id.to_string(),
                self.group_id.to_string(),
            ],
        )
    }

    fn load(
        conn: &Connection,
        filter: &StudentFilter,
        include: StudentInclude,
    ) -> RepoResult<Vec<Self>> {
        let mut students = SelectBuilder::new(STUDENT_SELECT_SQL)
            .eq_uuid("s.id", filter.id)
            .eq_uuid("s.person_id", filter.person_id)
            .eq_uuid("s.group_id", filter.group_id)
            .order_by("s.rowid ASC")
            .fetch(conn, |row| {
                Ok(Student {
                    id: get_uuid(row, "id")?,
                    person_id: get_uuid(row, "person_id")?,
                    group_id: get_uuid(row, "group_id")?,
                    person: None,
                    group: None,
                })
            })?;

        for student in &mut students {
            if include.person {
                student.person = load_person(conn, student.person_id)?;
            }
            if include.group {
                student.group =
                    Group::load(conn, &GroupFilter::by_id(student.group_id), GroupInclude::default())?
                        .pop();
            }
        }
        Ok(students)
    }
}

impl SqlEntity for Teacher {
    const TABLE: &'static str = "teachers";
    const COLUMNS: &'static [&'static str] = &["id", "person_id"];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO teachers (id, person_id) VALUES (?1, ?2);",
            params![self.id.to_string(), self.person_id.to_string()],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE teachers SET person_id = ?2 WHERE id = ?1;",
            params![self.id.to_string(), self.person_id.to_string()],
        )
    }

    fn load(
        conn: &Connection,
        filter: &TeacherFilter,
        include: TeacherInclude,
    ) -> RepoResult<Vec<Self>> {
        let mut teachers = SelectBuilder::new(TEACHER_SELECT_SQL)
            .eq_uuid("t.id", filter.id)
            .eq_text("p.email", filter.email.as_deref())
            .order_by("t.rowid ASC")
            .fetch(conn, |row| {
                Ok(Teacher {
                    id: get_uuid(row, "id")?,
                    person_id: get_uuid(row, "person_id")?,
                    person: None,
                })
            })?;

        if include.person {
            for teacher in &mut teachers {
                teacher.person = load_person(conn, teacher.person_id)?;
            }
        }
        Ok(teachers)
    }
}

/// Loads one student with its person, as nested includes expect.
pub(crate) fn load_student_with_person(
    conn: &Connection,
    student_id: uuid::Uuid,
) -> RepoResult<Option<Student>> {
    Ok(Student::load(
        conn,
        &StudentFilter::by_id(student_id),
        StudentInclude {
            person: true,
            group: false,
        },
    )?
    .pop())
}

fn load_person(conn: &Connection, person_id: uuid::Uuid) -> RepoResult<Option<Person>> {
    Ok(Person::load(conn, &PersonFilter::by_id(person_id), NoInclude)?.pop())
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    Ok(Person {
        id: get_uuid(row, "id")?,
        name: row.get("name")?,
        surname: row.get("surname")?,
        patronymic: row.get("patronymic")?,
        email: row.get("email")?,
    })
}
