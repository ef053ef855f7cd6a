mod support;

use kitias_core::db::open_db_in_memory;
use kitias_core::{
    AttendanceProvider, CancellationToken, CreateSchedulerRequest, FailureKind, Outcome,
    ProviderError, UpdateSchedulerRequest,
};
use support::{
    count_rows, insert_attendance, insert_scheduler, insert_student_attendance, seed_school,
    CommitMode, RecordingUnitOfWork, GROUP_NUMBER, OTHER_GROUP_NUMBER, TEACHER_EMAIL,
};
use uuid::Uuid;

fn create_request(name: &str, group_number: Option<&str>) -> CreateSchedulerRequest {
    CreateSchedulerRequest {
        teacher_email: TEACHER_EMAIL.to_string(),
        name: name.to_string(),
        group_number: group_number.map(str::to_string),
    }
}

#[test]
fn list_teacher_schedulers_projects_group_numbers() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let with_group = insert_scheduler(&conn, "Databases", school.teacher.id, Some(school.group.id));
    let without_group = insert_scheduler(&conn, "Consultations", school.teacher.id, None);

    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));
    let items = provider
        .list_teacher_schedulers(TEACHER_EMAIL, &CancellationToken::new())
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(items.len(), 2);
    let first = items.iter().find(|item| item.id == with_group.id).unwrap();
    assert_eq!(first.group_number.as_deref(), Some(GROUP_NUMBER));
    let second = items.iter().find(|item| item.id == without_group.id).unwrap();
    assert_eq!(second.group_number, None);
}

#[test]
fn list_teacher_schedulers_fails_for_unknown_or_differently_cased_email() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));
    let cancel = CancellationToken::new();
    let upper_case = TEACHER_EMAIL.to_uppercase();

    for email in ["nobody@kitias.edu", upper_case.as_str()] {
        let outcome = provider.list_teacher_schedulers(email, &cancel).unwrap();
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.message, "Couldn't find teacher");
    }
}

#[test]
fn create_scheduler_resolves_teacher_and_group() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let dto = provider
        .create_scheduler(
            &create_request("Databases", Some(GROUP_NUMBER)),
            &CancellationToken::new(),
        )
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(dto.name, "Databases");
    let teacher = dto.teacher.unwrap();
    assert_eq!(teacher.id, school.teacher.id);
    assert_eq!(teacher.full_name.as_deref(), Some("Ivanova Olga Petrovna"));
    assert_eq!(dto.group.unwrap().id, school.group.id);
    assert_eq!(provider.unit_of_work().commits, 1);

    let stored_group: Option<String> = conn
        .query_row(
            "SELECT group_id FROM attendance_schedulers WHERE id = ?1;",
            [dto.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_group, Some(school.group.id.to_string()));
}

#[test]
fn create_scheduler_with_unknown_group_keeps_group_empty() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let dto = provider
        .create_scheduler(
            &create_request("Databases", Some("NO-SUCH-GROUP")),
            &CancellationToken::new(),
        )
        .unwrap()
        .into_value()
        .unwrap();

    assert!(dto.group.is_none());
    let stored_group: Option<String> = conn
        .query_row(
            "SELECT group_id FROM attendance_schedulers WHERE id = ?1;",
            [dto.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_group, None);
}

#[test]
fn create_scheduler_for_unknown_teacher_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let mut request = create_request("Databases", Some(GROUP_NUMBER));
    request.teacher_email = "nobody@kitias.edu".to_string();
    let outcome = provider
        .create_scheduler(&request, &CancellationToken::new())
        .unwrap();

    assert_eq!(outcome.failure().unwrap().message, "Couldn't find teacher");
    assert_eq!(provider.unit_of_work().commits, 0);
    assert_eq!(count_rows(&conn, "attendance_schedulers"), 0);
}

#[test]
fn create_scheduler_with_blank_name_is_invalid() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let outcome = provider
        .create_scheduler(&create_request("   ", None), &CancellationToken::new())
        .unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Invalid);
    assert_eq!(failure.message, "Enter a valid scheduler name");
    assert_eq!(provider.unit_of_work().commits, 0);
}

#[test]
fn commit_affecting_nothing_is_a_provider_error() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::with_mode(
        &conn,
        CommitMode::AffectNothing,
    ));

    let err = provider
        .create_scheduler(&create_request("Databases", None), &CancellationToken::new())
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::NothingPersisted {
            operation: "create_scheduler"
        }
    );
    assert_eq!(count_rows(&conn, "attendance_schedulers"), 0);
}

#[test]
fn update_scheduler_with_unknown_group_fails_explicitly() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, Some(school.group.id));
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let request = UpdateSchedulerRequest {
        name: Some("Renamed".to_string()),
        group_number: Some("NO-SUCH-GROUP".to_string()),
    };
    let outcome = provider
        .update_scheduler(scheduler.id, &request, &CancellationToken::new())
        .unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert_eq!(failure.message, "Couldn't find group");
    assert_eq!(provider.unit_of_work().commits, 0);

    let name: String = conn
        .query_row(
            "SELECT name FROM attendance_schedulers WHERE id = ?1;",
            [scheduler.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(name, "Databases");
}

#[test]
fn update_scheduler_with_blank_group_number_fails_explicitly() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, Some(school.group.id));
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    for number in ["", "   "] {
        let request = UpdateSchedulerRequest {
            name: None,
            group_number: Some(number.to_string()),
        };
        let outcome = provider
            .update_scheduler(scheduler.id, &request, &CancellationToken::new())
            .unwrap();

        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound, "group number {number:?}");
        assert_eq!(failure.message, "Couldn't find group");
    }
    assert_eq!(provider.unit_of_work().commits, 0);

    let group_id: Option<String> = conn
        .query_row(
            "SELECT group_id FROM attendance_schedulers WHERE id = ?1;",
            [scheduler.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(group_id, Some(school.group.id.to_string()));
}

#[test]
fn update_scheduler_trims_group_number_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, None);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let request = UpdateSchedulerRequest {
        name: None,
        group_number: Some(format!(" {OTHER_GROUP_NUMBER} ")),
    };
    let dto = provider
        .update_scheduler(scheduler.id, &request, &CancellationToken::new())
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(dto.group.unwrap().id, school.other_group.id);
}

#[test]
fn update_scheduler_replaces_name_and_group() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, Some(school.group.id));
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let request = UpdateSchedulerRequest {
        name: Some("Databases II".to_string()),
        group_number: Some(OTHER_GROUP_NUMBER.to_string()),
    };
    let dto = provider
        .update_scheduler(scheduler.id, &request, &CancellationToken::new())
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(dto.name, "Databases II");
    assert_eq!(dto.group.unwrap().number, OTHER_GROUP_NUMBER);
    assert_eq!(dto.teacher.unwrap().id, school.teacher.id);

    let items = provider
        .list_teacher_schedulers(TEACHER_EMAIL, &CancellationToken::new())
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(items[0].group_number.as_deref(), Some(OTHER_GROUP_NUMBER));
}

#[test]
fn update_scheduler_without_changes_keeps_group() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, Some(school.group.id));
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let dto = provider
        .update_scheduler(
            scheduler.id,
            &UpdateSchedulerRequest::default(),
            &CancellationToken::new(),
        )
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(dto.name, "Databases");
    assert_eq!(dto.group.unwrap().id, school.group.id);
}

#[test]
fn update_or_delete_unknown_scheduler_never_commits() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));
    let cancel = CancellationToken::new();
    let missing = Uuid::new_v4();

    let updated = provider
        .update_scheduler(missing, &UpdateSchedulerRequest::default(), &cancel)
        .unwrap();
    assert_eq!(updated.failure().unwrap().message, "Couldn't find scheduler");

    let deleted = provider.delete_scheduler(missing, &cancel).unwrap();
    let failure = deleted.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert_eq!(failure.message, "Couldn't find scheduler");

    assert_eq!(provider.unit_of_work().commits, 0);
}

#[test]
fn delete_scheduler_confirms_and_cascades() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, Some(school.group.id));
    insert_student_attendance(&conn, scheduler.id, school.student_id(0));
    insert_attendance(
        &conn,
        scheduler.id,
        school.student_id(0),
        school.subject.id,
        1_700_000_000_000,
    );
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));

    let outcome = provider
        .delete_scheduler(scheduler.id, &CancellationToken::new())
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Success("Scheduler successfully deleted".to_string())
    );
    assert_eq!(count_rows(&conn, "attendance_schedulers"), 0);
    assert_eq!(count_rows(&conn, "student_attendances"), 0);
    assert_eq!(count_rows(&conn, "attendances"), 0);
    assert_eq!(count_rows(&conn, "students"), 5);
}

#[test]
fn list_scheduler_attendances_orders_by_date_for_any_insert_order() {
    let dates = [
        1_700_000_300_000_i64,
        1_700_000_100_000,
        1_700_000_500_000,
        1_700_000_200_000,
        1_700_000_400_000,
    ];
    let permutations: [[usize; 5]; 4] = [
        [0, 1, 2, 3, 4],
        [4, 3, 2, 1, 0],
        [2, 0, 4, 1, 3],
        [1, 4, 0, 3, 2],
    ];

    for order in permutations {
        let conn = open_db_in_memory().unwrap();
        let school = seed_school(&conn);
        let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, None);
        for index in order {
            insert_attendance(
                &conn,
                scheduler.id,
                school.student_id(index),
                school.subject.id,
                dates[index],
            );
        }

        let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));
        let items = provider
            .list_scheduler_attendances(scheduler.id, &CancellationToken::new())
            .unwrap()
            .into_value()
            .unwrap();

        let returned = items.iter().map(|item| item.date).collect::<Vec<_>>();
        let mut expected = dates.to_vec();
        expected.sort_unstable();
        assert_eq!(returned, expected, "insert order {order:?}");
        assert!(items.iter().all(|item| item.student_name.is_some()));
        assert!(items
            .iter()
            .all(|item| item.subject_name.as_deref() == Some("Databases")));
    }
}

#[test]
fn list_scheduler_attendances_ties_keep_insert_order() {
    let conn = open_db_in_memory().unwrap();
    let school = seed_school(&conn);
    let scheduler = insert_scheduler(&conn, "Databases", school.teacher.id, None);
    let date = 1_700_000_000_000;
    let first = insert_attendance(&conn, scheduler.id, school.student_id(3), school.subject.id, date);
    let second = insert_attendance(&conn, scheduler.id, school.student_id(1), school.subject.id, date);

    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));
    let items = provider
        .list_scheduler_attendances(scheduler.id, &CancellationToken::new())
        .unwrap()
        .into_value()
        .unwrap();

    let ids = items.iter().map(|item| item.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn list_scheduler_queries_fail_for_unknown_scheduler() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));
    let cancel = CancellationToken::new();

    let attendances = provider
        .list_scheduler_attendances(Uuid::new_v4(), &cancel)
        .unwrap();
    assert_eq!(attendances.failure().unwrap().message, "Couldn't find scheduler");

    let entries = provider
        .list_scheduler_student_attendances(Uuid::new_v4(), &cancel)
        .unwrap();
    assert_eq!(entries.failure().unwrap().kind, FailureKind::NotFound);
}

#[test]
fn cancelled_token_fails_without_touching_storage() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::new(&conn));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = provider
        .create_scheduler(&create_request("Databases", None), &cancel)
        .unwrap();

    assert_eq!(outcome.failure().unwrap().kind, FailureKind::Cancelled);
    assert_eq!(provider.unit_of_work().commits, 0);
    assert_eq!(count_rows(&conn, "attendance_schedulers"), 0);
}

#[test]
fn cancellation_during_commit_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    seed_school(&conn);
    let cancel = CancellationToken::new();
    let mut provider = AttendanceProvider::new(RecordingUnitOfWork::with_mode(
        &conn,
        CommitMode::CancelFirst(cancel.clone()),
    ));

    let outcome = provider
        .create_scheduler(&create_request("Databases", None), &cancel)
        .unwrap();

    assert_eq!(outcome.failure().unwrap().kind, FailureKind::Cancelled);
    assert_eq!(provider.unit_of_work().commits, 1);
    assert_eq!(count_rows(&conn, "attendance_schedulers"), 0);
}
