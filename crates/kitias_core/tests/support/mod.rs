#![allow(dead_code)]

use kitias_core::model::group::{Group, GroupSubject, Subject};
use kitias_core::model::person::{Person, Student, Teacher};
use kitias_core::model::scheduler::{Attendance, AttendanceScheduler, Grade, StudentAttendance};
use kitias_core::model::{GroupId, SchedulerId, StudentId, SubjectId, TeacherId};
use kitias_core::{CancellationToken, RepoResult, Repository, SqliteUnitOfWork, UnitOfWork};
use rusqlite::Connection;

pub const TEACHER_EMAIL: &str = "olga.ivanova@kitias.edu";
pub const GROUP_NUMBER: &str = "IT-21";
pub const OTHER_GROUP_NUMBER: &str = "PM-31";

/// Reference data every provider test starts from.
pub struct School {
    pub teacher: Teacher,
    pub group: Group,
    pub other_group: Group,
    pub students: Vec<Student>,
    pub subject: Subject,
}

impl School {
    pub fn student_id(&self, index: usize) -> StudentId {
        self.students[index].id
    }
}

pub fn seed_school(conn: &Connection) -> School {
    let mut uow = SqliteUnitOfWork::try_new(conn).unwrap();
    uow.begin(&CancellationToken::new());

    let group = Group::new(GROUP_NUMBER, 2);
    let other_group = Group::new(OTHER_GROUP_NUMBER, 3);
    uow.groups().create(group.clone()).unwrap();
    uow.groups().create(other_group.clone()).unwrap();

    let teacher_person =
        Person::new("Olga", "Ivanova", TEACHER_EMAIL).with_patronymic("Petrovna");
    let mut teacher = Teacher::new(teacher_person.id);
    uow.people().create(teacher_person.clone()).unwrap();
    uow.teachers().create(teacher.clone()).unwrap();
    teacher.person = Some(teacher_person);

    let mut students = Vec::new();
    for (name, surname) in [
        ("Anna", "Smirnova"),
        ("Boris", "Kuznetsov"),
        ("Daria", "Popova"),
        ("Egor", "Sokolov"),
        ("Fedor", "Lebedev"),
    ] {
        let email = format!("{}.{}@kitias.edu", name.to_lowercase(), surname.to_lowercase());
        let person = Person::new(name, surname, email);
        let mut student = Student::new(person.id, group.id);
        uow.people().create(person.clone()).unwrap();
        uow.students().create(student.clone()).unwrap();
        student.person = Some(person);
        students.push(student);
    }

    let mut subject = Subject::new("Databases");
    subject.kind = "lecture".to_string();
    uow.subjects().create(subject.clone()).unwrap();
    uow.group_subjects()
        .create(GroupSubject::new(group.id, subject.id))
        .unwrap();

    uow.commit().unwrap();
    School {
        teacher,
        group,
        other_group,
        students,
        subject,
    }
}

pub fn insert_scheduler(
    conn: &Connection,
    name: &str,
    teacher_id: TeacherId,
    group_id: Option<GroupId>,
) -> AttendanceScheduler {
    let mut scheduler = AttendanceScheduler::new(name, teacher_id);
    scheduler.group_id = group_id;
    let mut uow = SqliteUnitOfWork::try_new(conn).unwrap();
    uow.schedulers().create(scheduler.clone()).unwrap();
    uow.commit().unwrap();
    scheduler
}

pub fn insert_student_attendance(
    conn: &Connection,
    scheduler_id: SchedulerId,
    student_id: StudentId,
) -> StudentAttendance {
    let mut entry = StudentAttendance::for_student(student_id, 80, Grade::Good);
    entry.scheduler_id = Some(scheduler_id);
    let mut uow = SqliteUnitOfWork::try_new(conn).unwrap();
    uow.student_attendances().create(entry.clone()).unwrap();
    uow.commit().unwrap();
    entry
}

pub fn insert_attendance(
    conn: &Connection,
    scheduler_id: SchedulerId,
    student_id: StudentId,
    subject_id: SubjectId,
    date: i64,
) -> Attendance {
    let mut attendance = Attendance::new(student_id, subject_id, date);
    attendance.scheduler_id = Some(scheduler_id);
    attendance.attended = 1;
    let mut uow = SqliteUnitOfWork::try_new(conn).unwrap();
    uow.attendances().create(attendance.clone()).unwrap();
    uow.commit().unwrap();
    attendance
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

/// How the recording unit of work treats `commit`.
#[derive(Debug, Clone, Default)]
pub enum CommitMode {
    /// Delegate to SQLite.
    #[default]
    Persist,
    /// Drop staged changes and report zero affected rows.
    AffectNothing,
    /// Cancel the token, then delegate.
    CancelFirst(CancellationToken),
}

/// Unit of work wrapper that counts lifecycle calls.
pub struct RecordingUnitOfWork<'conn> {
    inner: SqliteUnitOfWork<'conn>,
    mode: CommitMode,
    pub commits: usize,
    pub rollbacks: usize,
}

impl<'conn> RecordingUnitOfWork<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_mode(conn, CommitMode::Persist)
    }

    pub fn with_mode(conn: &'conn Connection, mode: CommitMode) -> Self {
        Self {
            inner: SqliteUnitOfWork::try_new(conn).unwrap(),
            mode,
            commits: 0,
            rollbacks: 0,
        }
    }
}

impl UnitOfWork for RecordingUnitOfWork<'_> {
    fn people(&mut self) -> &mut dyn Repository<Person> {
        self.inner.people()
    }

    fn students(&mut self) -> &mut dyn Repository<Student> {
        self.inner.students()
    }

    fn teachers(&mut self) -> &mut dyn Repository<Teacher> {
        self.inner.teachers()
    }

    fn groups(&mut self) -> &mut dyn Repository<Group> {
        self.inner.groups()
    }

    fn subjects(&mut self) -> &mut dyn Repository<Subject> {
        self.inner.subjects()
    }

    fn group_subjects(&mut self) -> &mut dyn Repository<GroupSubject> {
        self.inner.group_subjects()
    }

    fn schedulers(&mut self) -> &mut dyn Repository<AttendanceScheduler> {
        self.inner.schedulers()
    }

    fn student_attendances(&mut self) -> &mut dyn Repository<StudentAttendance> {
        self.inner.student_attendances()
    }

    fn attendances(&mut self) -> &mut dyn Repository<Attendance> {
        self.inner.attendances()
    }

    fn begin(&mut self, cancel: &CancellationToken) {
        self.inner.begin(cancel);
    }

    fn commit(&mut self) -> RepoResult<usize> {
        self.commits += 1;
        match &self.mode {
            CommitMode::Persist => self.inner.commit(),
            CommitMode::AffectNothing => {
                self.inner.rollback();
                Ok(0)
            }
            CommitMode::CancelFirst(token) => {
                token.cancel();
                self.inner.commit()
            }
        }
    }

    fn rollback(&mut self) {
        self.rollbacks += 1;
        self.inner.rollback();
    }
}
