mod common;

use common::{assert_seat_accounting, quota, seed_campus, seed_period, seed_student, seed_subject};
use registrar_core::db::open_db_in_memory;
use registrar_core::model::period::PeriodDraft;
use registrar_core::repo::catalog_repo::SqliteCatalogRepository;
use registrar_core::repo::period_repo::SqlitePeriodRepository;
use registrar_core::repo::subject_repo::SqliteSubjectRepository;
use registrar_core::service::catalog_service::CatalogService;
use registrar_core::service::period_service::PeriodService;
use registrar_core::service::subject_service::SubjectService;
use registrar_core::{
    AdmissionError, AdmissionRequest, EnrollmentService, ServiceError, SqliteEnrollmentStore,
    ValidationError,
};
use uuid::Uuid;

#[test]
fn subject_create_checks_career_and_cycle() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let subjects = SubjectService::new(SqliteSubjectRepository::new(&conn));

    let created = subjects
        .create(" Algebra ", campus.career.id, campus.cycle.id, 25)
        .unwrap();
    assert_eq!(created.name, "Algebra");
    assert_eq!(created.available_quota, 25);

    let detail = subjects.get(created.id).unwrap();
    assert_eq!(detail.subject, created);
    assert_eq!(detail.career, campus.career);
    assert_eq!(detail.cycle, campus.cycle);

    let missing = Uuid::new_v4();
    assert!(matches!(
        subjects
            .create("Orphan", missing, campus.cycle.id, 5)
            .unwrap_err(),
        ServiceError::ReferenceNotFound { entity: "career", .. }
    ));
    assert!(matches!(
        subjects
            .create("Orphan", campus.career.id, missing, 5)
            .unwrap_err(),
        ServiceError::ReferenceNotFound { entity: "cycle", .. }
    ));
    assert!(matches!(
        subjects
            .create("Negative", campus.career.id, campus.cycle.id, -3)
            .unwrap_err(),
        ServiceError::Validation(ValidationError::QuotaOutOfRange { .. })
    ));
}

#[test]
fn list_by_career_orders_by_cycle_then_name() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let catalog = CatalogService::new(SqliteCatalogRepository::new(&conn));
    let second_cycle = catalog.create_cycle("Second cycle", 2).unwrap();
    let other_career = catalog.create_career("Architecture").unwrap();
    let subjects = SubjectService::new(SqliteSubjectRepository::new(&conn));

    subjects
        .create("Data Structures", campus.career.id, second_cycle.id, 5)
        .unwrap();
    seed_subject(&conn, &campus, "Programming", 5);
    seed_subject(&conn, &campus, "Discrete Math", 5);
    subjects
        .create("Drawing", other_career.id, campus.cycle.id, 5)
        .unwrap();

    let names: Vec<_> = subjects
        .list_by_career(campus.career.id)
        .unwrap()
        .into_iter()
        .map(|detail| detail.subject.name)
        .collect();
    assert_eq!(names, vec!["Discrete Math", "Programming", "Data Structures"]);
    assert_eq!(subjects.list().unwrap().len(), 4);

    assert!(matches!(
        subjects.list_by_career(Uuid::new_v4()).unwrap_err(),
        ServiceError::NotFound { entity: "career", .. }
    ));
}

#[test]
fn resize_quota_shifts_available_seats_by_the_same_delta() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let subject = seed_subject(&conn, &campus, "Robotics", 3);
    let enrollments = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    for name in ["Arias", "Bustamante"] {
        let student = seed_student(&conn, &campus, name, true);
        enrollments
            .admit(&AdmissionRequest::new(student.id, subject.id, campus.period.id))
            .unwrap();
    }
    let subjects = SubjectService::new(SqliteSubjectRepository::new(&conn));

    let grown = subjects.resize_quota(subject.id, 10).unwrap();
    assert_eq!((grown.total_quota, grown.available_quota), (10, 8));

    let shrunk = subjects.resize_quota(subject.id, 2).unwrap();
    assert_eq!((shrunk.total_quota, shrunk.available_quota), (2, 0));
    assert_seat_accounting(&conn);
}

#[test]
fn resize_quota_below_enrolled_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let subject = seed_subject(&conn, &campus, "Surgery", 4);
    let enrollments = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    for name in ["Cardenas", "Davila", "Escobar"] {
        let student = seed_student(&conn, &campus, name, true);
        enrollments
            .admit(&AdmissionRequest::new(student.id, subject.id, campus.period.id))
            .unwrap();
    }
    let subjects = SubjectService::new(SqliteSubjectRepository::new(&conn));

    let err = subjects.resize_quota(subject.id, 2).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::QuotaBelowEnrolled {
            enrolled: 3,
            requested: 2,
            ..
        }
    ));
    assert_eq!(quota(&conn, subject.id), (4, 1));
    assert!(matches!(
        subjects.resize_quota(subject.id, -1).unwrap_err(),
        ServiceError::Validation(_)
    ));
    assert!(matches!(
        subjects.resize_quota(Uuid::new_v4(), 5).unwrap_err(),
        ServiceError::NotFound { entity: "subject", .. }
    ));
}

#[test]
fn rename_keeps_quota_and_delete_is_restricted_by_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let subject = seed_subject(&conn, &campus, "Chem I", 2);
    let student = seed_student(&conn, &campus, "Falcon", true);
    let enrollments = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    let held = enrollments
        .admit(&AdmissionRequest::new(student.id, subject.id, campus.period.id))
        .unwrap();
    let subjects = SubjectService::new(SqliteSubjectRepository::new(&conn));

    let renamed = subjects.rename(subject.id, "General Chemistry").unwrap();
    assert_eq!(renamed.name, "General Chemistry");
    assert_eq!((renamed.total_quota, renamed.available_quota), (2, 1));

    assert!(matches!(
        subjects.delete(subject.id).unwrap_err(),
        ServiceError::InUse { entity: "subject", .. }
    ));

    enrollments.withdraw(held.enrollment.id).unwrap();
    subjects.delete(subject.id).unwrap();
    assert!(matches!(
        subjects.get(subject.id).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}

#[test]
fn closing_a_period_stops_new_admissions_only() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let subject = seed_subject(&conn, &campus, "Geology", 5);
    let held_by = seed_student(&conn, &campus, "Galvez", true);
    let late = seed_student(&conn, &campus, "Heredia", true);
    let enrollments = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    enrollments
        .admit(&AdmissionRequest::new(held_by.id, subject.id, campus.period.id))
        .unwrap();
    let periods = PeriodService::new(SqlitePeriodRepository::new(&conn));

    let closed = periods
        .update(
            campus.period.id,
            &PeriodDraft {
                name: campus.period.name.clone(),
                starts_at: campus.period.starts_at,
                ends_at: campus.period.ends_at,
                is_active: false,
            },
        )
        .unwrap();
    assert!(!closed.is_active);
    assert!(periods.list_active().unwrap().is_empty());

    let err = enrollments
        .admit(&AdmissionRequest::new(late.id, subject.id, campus.period.id))
        .unwrap_err();
    assert!(matches!(err, AdmissionError::InvalidState { .. }));
    assert_eq!(
        enrollments
            .list_for_student_in_period(held_by.id, campus.period.id)
            .unwrap()
            .total_enrolled,
        1
    );
}

#[test]
fn period_crud_validates_range_and_restricts_delete() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let spare = seed_period(&conn, "2026-I", false);
    let periods = PeriodService::new(SqlitePeriodRepository::new(&conn));

    let inverted = periods.create(&PeriodDraft {
        name: "Broken".to_string(),
        starts_at: 2_000,
        ends_at: 1_000,
        is_active: true,
    });
    assert!(matches!(
        inverted.unwrap_err(),
        ServiceError::Validation(ValidationError::InvalidDateRange { .. })
    ));
    assert!(matches!(
        periods
            .create(&PeriodDraft {
                name: spare.name.clone(),
                starts_at: 0,
                ends_at: 0,
                is_active: false,
            })
            .unwrap_err(),
        ServiceError::Duplicate(_)
    ));

    let student = seed_student(&conn, &campus, "Ibanez", true);
    let subject = seed_subject(&conn, &campus, "Zoology", 3);
    EnrollmentService::new(SqliteEnrollmentStore::new(&conn))
        .admit(&AdmissionRequest::new(student.id, subject.id, campus.period.id))
        .unwrap();

    assert!(matches!(
        periods.delete(campus.period.id).unwrap_err(),
        ServiceError::InUse { .. }
    ));
    assert_eq!(periods.delete(spare.id).unwrap(), spare);
    assert_eq!(periods.list().unwrap(), vec![campus.period.clone()]);
}

#[test]
fn catalog_lists_careers_by_name_and_cycles_by_ordinal() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteCatalogRepository::new(&conn));

    catalog.create_career("Nursing").unwrap();
    catalog.create_career("Law").unwrap();
    let third = catalog.create_cycle("Third", 3).unwrap();
    let first = catalog.create_cycle("First", 1).unwrap();

    let careers: Vec<_> = catalog
        .list_careers()
        .unwrap()
        .into_iter()
        .map(|career| career.name)
        .collect();
    assert_eq!(careers, vec!["Law", "Nursing"]);
    assert_eq!(catalog.list_cycles().unwrap(), vec![first, third]);

    assert!(matches!(
        catalog.create_career("Law").unwrap_err(),
        ServiceError::Duplicate(_)
    ));
    assert!(matches!(
        catalog.create_cycle("Zero", 0).unwrap_err(),
        ServiceError::Validation(ValidationError::InvalidOrdinal(0))
    ));
    assert!(matches!(
        catalog.get_career(Uuid::new_v4()).unwrap_err(),
        ServiceError::NotFound { entity: "career", .. }
    ));
}
