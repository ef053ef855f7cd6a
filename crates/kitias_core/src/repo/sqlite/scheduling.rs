//! Scheduler, student attendance and attendance storage mappings.

use super::people::load_student_with_person;
use super::{get_optional_uuid, get_u8, get_uuid, optional_uuid_text, SelectBuilder, SqlEntity};
use crate::model::group::{Group, Subject};
use crate::model::person::Teacher;
use crate::model::scheduler::{Attendance, AttendanceScheduler, Grade, StudentAttendance};
use crate::repo::query::{
    AttendanceFilter, AttendanceInclude, GroupFilter, GroupInclude, NoInclude, SchedulerFilter,
    SchedulerInclude, StudentAttendanceFilter, StudentAttendanceInclude, SubjectFilter,
    TeacherFilter, TeacherInclude,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SCHEDULER_SELECT_SQL: &str = "SELECT
    a.id AS id,
    a.name AS name,
    a.teacher_id AS teacher_id,
    a.group_id AS group_id
FROM attendance_schedulers a";

const STUDENT_ATTENDANCE_SELECT_SQL: &str = "SELECT
    sa.id AS id,
    sa.scheduler_id AS scheduler_id,
    sa.student_id AS student_id,
    sa.student_name AS student_name,
    sa.rating AS rating,
    sa.grade AS grade
FROM student_attendances sa";

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    att.id AS id,
    att.student_id AS student_id,
    att.subject_id AS subject_id,
    att.student_attendance_id AS student_attendance_id,
    att.scheduler_id AS scheduler_id,
    att.date AS date,
    att.attended AS attended,
    att.score AS score,
    att.theme AS theme
FROM attendances att";

impl SqlEntity for AttendanceScheduler {
    const TABLE: &'static str = "attendance_schedulers";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "teacher_id", "group_id", "created_at"];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO attendance_schedulers (id, name, teacher_id, group_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.teacher_id.to_string(),
                optional_uuid_text(self.group_id),
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE attendance_schedulers
             SET name = ?2, teacher_id = ?3, group_id = ?4
             WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.name.as_str(),
                self.teacher_id.to_string(),
                optional_uuid_text(self.group_id),
            ],
        )
    }

    fn load(
        conn: &Connection,
        filter: &SchedulerFilter,
        include: SchedulerInclude,
    ) -> RepoResult<Vec<Self>> {
        let mut schedulers = SelectBuilder::new(SCHEDULER_SELECT_SQL)
            .eq_uuid("a.id", filter.id)
            .eq_uuid("a.teacher_id", filter.teacher_id)
            .order_by("a.created_at ASC, a.rowid ASC")
            .fetch(conn, |row| {
                Ok(AttendanceScheduler {
                    id: get_uuid(row, "id")?,
                    name: row.get("name")?,
                    teacher_id: get_uuid(row, "teacher_id")?,
                    group_id: get_optional_uuid(row, "group_id")?,
                    teacher: None,
                    group: None,
                    student_attendances: Vec::new(),
                    attendances: Vec::new(),
                })
            })?;

        for scheduler in &mut schedulers {
            if include.teacher {
                scheduler.teacher = Teacher::load(
                    conn,
                    &TeacherFilter::by_id(scheduler.teacher_id),
                    TeacherInclude { person: true },
                )?
                .pop();
            }
            if include.group {
                if let Some(group_id) = scheduler.group_id {
                    scheduler.group =
                        Group::load(conn, &GroupFilter::by_id(group_id), GroupInclude::default())?
                            .pop();
                }
            }
            if include.student_attendances {
                scheduler.student_attendances = StudentAttendance::load(
                    conn,
                    &StudentAttendanceFilter::by_scheduler(scheduler.id),
                    StudentAttendanceInclude {
                        student: true,
                        attendances: false,
                    },
                )?;
            }
            if include.attendances {
                scheduler.attendances = Attendance::load(
                    conn,
                    &AttendanceFilter::by_scheduler(scheduler.id),
                    AttendanceInclude {
                        student: true,
                        subject: true,
                    },
                )?;
            }
        }
        Ok(schedulers)
    }
}

impl SqlEntity for StudentAttendance {
    const TABLE: &'static str = "student_attendances";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "scheduler_id",
        "student_id",
        "student_name",
        "rating",
        "grade",
    ];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO student_attendances (
                id, scheduler_id, student_id, student_name, rating, grade
             )
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                self.id.to_string(),
                optional_uuid_text(self.scheduler_id),
                optional_uuid_text(self.student_id),
                self.student_name.as_deref(),
                i64::from(self.rating),
                self.grade.as_str(),
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE student_attendances
             SET scheduler_id = ?2,
                 student_id = ?3,
                 student_name = ?4,
                 rating = ?5,
                 grade = ?6
             WHERE id = ?1;",
            params![
                self.id.to_string(),
                optional_uuid_text(self.scheduler_id),
                optional_uuid_text(self.student_id),
                self.student_name.as_deref(),
                i64::from(self.rating),
                self.grade.as_str(),
            ],
        )
    }

    fn load(
        conn: &Connection,
        filter: &StudentAttendanceFilter,
        include: StudentAttendanceInclude,
    ) -> RepoResult<Vec<Self>> {
        let mut entries = SelectBuilder::new(STUDENT_ATTENDANCE_SELECT_SQL)
            .eq_uuid("sa.id", filter.id)
            .eq_uuid("sa.scheduler_id", filter.scheduler_id)
            .eq_uuid("sa.student_id", filter.student_id)
            .order_by("sa.rowid ASC")
            .fetch(conn, parse_student_attendance_row)?;

        for entry in &mut entries {
            if include.student {
                if let Some(student_id) = entry.student_id {
                    entry.student = load_student_with_person(conn, student_id)?;
                }
            }
            if include.attendances {
                entry.attendances = Attendance::load(
                    conn,
                    &AttendanceFilter {
                        student_attendance_id: Some(entry.id),
                        ..AttendanceFilter::default()
                    },
                    AttendanceInclude::default(),
                )?;
            }
        }
        Ok(entries)
    }
}

impl SqlEntity for Attendance {
    const TABLE: &'static str = "attendances";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "student_id",
        "subject_id",
        "student_attendance_id",
        "scheduler_id",
        "date",
        "attended",
        "score",
        "theme",
    ];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO attendances (
                id, student_id, subject_id, student_attendance_id, scheduler_id,
                date, attended, score, theme
             )
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                self.id.to_string(),
                self.student_id.to_string(),
                self.subject_id.to_string(),
                optional_uuid_text(self.student_attendance_id),
                optional_uuid_text(self.scheduler_id),
                self.date,
                i64::from(self.attended),
                i64::from(self.score),
                self.theme.as_deref(),
            ],
        )
    }

    fn update(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "UPDATE attendances
             SET student_id = ?2,
                 subject_id = ?3,
                 student_attendance_id = ?4,
                 scheduler_id = ?5,
                 date = ?6,
                 attended = ?7,
                 score = ?8,
                 theme = ?9
             WHERE id = ?1;",
            params![
                self.id.to_string(),
                self.student_id.to_string(),
                self.subject_id.to_string(),
                optional_uuid_text(self.student_attendance_id),
                optional_uuid_text(self.scheduler_id),
                self.date,
                i64::from(self.attended),
                i64::from(self.score),
                self.theme.as_deref(),
            ],
        )
    }

    fn load(
        conn: &Connection,
        filter: &AttendanceFilter,
        include: AttendanceInclude,
    ) -> RepoResult<Vec<Self>> {
        let mut attendances = SelectBuilder::new(ATTENDANCE_SELECT_SQL)
            .eq_uuid("att.id", filter.id)
            .eq_uuid("att.scheduler_id", filter.scheduler_id)
            .eq_uuid("att.student_attendance_id", filter.student_attendance_id)
            .eq_uuid("att.student_id", filter.student_id)
            .order_by("att.date ASC, att.rowid ASC")
            .fetch(conn, parse_attendance_row)?;

        for attendance in &mut attendances {
            if include.student {
                attendance.student = load_student_with_person(conn, attendance.student_id)?;
            }
            if include.subject {
                attendance.subject =
                    Subject::load(conn, &SubjectFilter::by_id(attendance.subject_id), NoInclude)?
                        .pop();
            }
        }
        Ok(attendances)
    }
}

fn parse_student_attendance_row(row: &Row<'_>) -> RepoResult<StudentAttendance> {
    let grade_text: String = row.get("grade")?;
    let grade = grade_text
        .parse::<Grade>()
        .map_err(|err| RepoError::InvalidData(format!("{err} in student_attendances.grade")))?;

    Ok(StudentAttendance {
        id: get_uuid(row, "id")?,
        scheduler_id: get_optional_uuid(row, "scheduler_id")?,
        student_id: get_optional_uuid(row, "student_id")?,
        student_name: row.get("student_name")?,
        rating: get_u8(row, "rating")?,
        grade,
        student: None,
        attendances: Vec::new(),
    })
}

fn parse_attendance_row(row: &Row<'_>) -> RepoResult<Attendance> {
    Ok(Attendance {
        id: get_uuid(row, "id")?,
        student_id: get_uuid(row, "student_id")?,
        subject_id: get_uuid(row, "subject_id")?,
        student_attendance_id: get_optional_uuid(row, "student_attendance_id")?,
        scheduler_id: get_optional_uuid(row, "scheduler_id")?,
        date: row.get("date")?,
        attended: get_u8(row, "attended")?,
        score: get_u8(row, "score")?,
        theme: row.get("theme")?,
        student: None,
        subject: None,
    })
}
