//! Group, subject and group/subject association storage mappings.

use super::{get_u8, get_uuid, SelectBuilder, SqlEntity};
use crate::model::group::{Group, GroupSubject, Subject};
use crate::model::person::Student;
use crate::repo::query::{
    GroupFilter, GroupInclude, GroupSubjectFilter, NoInclude, StudentFilter, StudentInclude,
    SubjectFilter,
};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row};

const GROUP_SELECT_SQL: &str = "SELECT
    g.id AS id,
    g.number AS number,
    g.course AS course,
    g.education_type AS education_type,
    g.speciality AS speciality,
    g.receipt_date AS receipt_date,
    g.issue_date AS issue_date
FROM study_groups g";

const SUBJECT_SELECT_SQL: &str = "SELECT
    s.id AS id,
    s.name AS name,
    s.day AS day,
    s.week AS week,
    s.type AS type,
    s.time AS time,
    s.date AS date
FROM subjects s";

const GROUP_SUBJECT_SELECT_SQL: &str = "SELECT
    gs.id AS id,
    gs.group_id AS group_id,
    gs.subject_id AS subject_id
FROM group_subjects gs";

impl SqlEntity for Group {
    const TABLE: &'static str = "study_groups";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "number",
        "course",
        "education_type",
        "speciality",
        "receipt_date",
        "issue_date",
    ];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO study_groups (
                id, number, course, education_type, speciality, receipt_date, issue_date
             )
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                self.id.to_string(),
                self.number.as_str(),
                i64::from(self.course),
                self.education_type.as_str(),
                self.speciality.as_str(),
                self.receipt_date,
                self.issue_date,
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE study_groups
             SET number = ?2,
                 course = ?3,
                 education_type = ?4,
                 speciality = ?5,
                 receipt_date = ?6,
                 issue_date = ?7
             WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.number.as_str(),
                i64::from(self.course),
                self.education_type.as_str(),
                self.speciality.as_str(),
                self.receipt_date,
                self.issue_date,
            ],
        )
    }

    fn load(conn: &Connection, filter: &GroupFilter, include: GroupInclude) -> RepoResult<Vec<Self>> {
        let mut groups = SelectBuilder::new(GROUP_SELECT_SQL)
            .eq_uuid("g.id", filter.id)
            .eq_text("g.number", filter.number.as_deref())
            .order_by("g.number ASC")
            .fetch(conn, parse_group_row)?;

        for group in &mut groups {
            if include.students {
                group.students = Student::load(
                    conn,
                    &StudentFilter::by_group(group.id),
                    StudentInclude {
                        person: true,
                        group: false,
                    },
                )?;
            }
            if include.subjects {
                group.subjects = Subject::load(
                    conn,
                    &SubjectFilter {
                        group_id: Some(group.id),
                        ..SubjectFilter::default()
                    },
                    NoInclude,
                )?;
            }
        }
        Ok(groups)
    }
}

impl SqlEntity for Subject {
    const TABLE: &'static str = "subjects";
    const COLUMNS: &'static [&'static str] = &["id", "name", "day", "week", "type", "time", "date"];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO subjects (id, name, day, week, type, time, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.day.as_str(),
                self.week.as_str(),
                self.kind.as_str(),
                self.time.as_str(),
                self.date,
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE subjects
             SET name = ?2, day = ?3, week = ?4, type = ?5, time = ?6, date = ?7
             WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.day.as_str(),
                self.week.as_str(),
                self.kind.as_str(),
                self.time.as_str(),
                self.date,
            ],
        )
    }

    fn load(conn: &Connection, filter: &SubjectFilter, _include: NoInclude) -> RepoResult<Vec<Self>> {
        SelectBuilder::new(SUBJECT_SELECT_SQL)
            .eq_uuid("s.id", filter.id)
            .condition(
                "EXISTS (
                    SELECT 1 FROM group_subjects gs
                    WHERE gs.subject_id = s.id AND gs.group_id = ?
                )",
                filter.group_id,
            )
            .order_by("s.name ASC, s.rowid ASC")
            .fetch(conn, |row| {
                Ok(Subject {
                    id: get_uuid(row, "id")?,
                    name: row.get("name")?,
                    day: row.get("day")?,
                    week: row.get("week")?,
                    kind: row.get("type")?,
                    time: row.get("time")?,
                    date: row.get("date")?,
                })
            })
    }
}

impl SqlEntity for GroupSubject {
    const TABLE: &'static str = "group_subjects";
    const COLUMNS: &'static [&'static str] = &["id", "group_id", "subject_id"];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO group_subjects (id, group_id, subject_id) VALUES (?1, ?2, ?3);",
            params![
                self.id.to_string(),
                self.group_id.to_string(),
                self.subject_id.to_string(),
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE group_subjects SET group_id = ?2, subject_id = ?3 WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.group_id.to_string(),
                self.subject_id.to_string(),
            ],
        )
    }

    fn load(
        conn: &Connection,
        filter: &GroupSubjectFilter,
        _include: NoInclude,
    ) -> RepoResult<Vec<Self>> {
        SelectBuilder::new(GROUP_SUBJECT_SELECT_SQL)
            .eq_uuid("gs.group_id", filter.group_id)
            .eq_uuid("gs.subject_id", filter.subject_id)
            .order_by("gs.rowid ASC")
            .fetch(conn, |row| {
                Ok(GroupSubject {
                    id: get_uuid(row, "id")?,
                    group_id: get_uuid(row, "group_id")?,
                    subject_id: get_uuid(row, "subject_id")?,
                })
            })
    }
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<Group> {
    Ok(Group {
        id: get_uuid(row, "id")?,
        number: row.get("number")?,
        course: get_u8(row, "course")?,
        education_type: row.get("education_type")?,
        speciality: row.get("speciality")?,
        receipt_date: row.get("receipt_date")?,
        issue_date: row.get("issue_date")?,
        students: Vec::new(),
        subjects: Vec::new(),
    })
}
