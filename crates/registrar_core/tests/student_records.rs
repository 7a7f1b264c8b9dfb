mod common;

use common::{seed_campus, seed_period, seed_student, seed_subject};
use registrar_core::db::open_db_in_memory;
use registrar_core::model::student::StudentDraft;
use registrar_core::repo::catalog_repo::SqliteCatalogRepository;
use registrar_core::repo::student_repo::SqliteStudentRepository;
use registrar_core::service::catalog_service::CatalogService;
use registrar_core::service::student_service::StudentService;
use registrar_core::{
    AdmissionRequest, EnrollmentService, ServiceError, SqliteEnrollmentStore, ValidationError,
};
use uuid::Uuid;

fn draft(career_id: Uuid, last_name: &str, email: &str) -> StudentDraft {
    StudentDraft {
        first_name: "Luis".to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone: Some("  ".to_string()),
        is_active: true,
        career_id,
    }
}

#[test]
fn create_normalizes_fields_and_get_attaches_career() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let service = StudentService::new(SqliteStudentRepository::new(&conn));

    let created = service
        .create(&draft(campus.career.id, "  Prado ", " Luis.Prado@Example.EDU "))
        .unwrap();

    assert_eq!(created.last_name, "Prado");
    assert_eq!(created.email, "luis.prado@example.edu");
    assert_eq!(created.phone, None);

    let loaded = service.get(created.id).unwrap();
    assert_eq!(loaded.student, created);
    assert_eq!(loaded.career, campus.career);
}

#[test]
fn create_rejects_bad_email_and_unknown_career() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let service = StudentService::new(SqliteStudentRepository::new(&conn));

    let err = service
        .create(&draft(campus.career.id, "Prado", "not-an-email"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::InvalidEmail(_))
    ));

    let missing = Uuid::new_v4();
    let err = service
        .create(&draft(missing, "Prado", "prado@example.edu"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::ReferenceNotFound { entity: "career", id } if id == missing
    ));
}

#[test]
fn duplicate_email_is_reported_as_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let service = StudentService::new(SqliteStudentRepository::new(&conn));

    service
        .create(&draft(campus.career.id, "Prado", "same@example.edu"))
        .unwrap();
    let err = service
        .create(&draft(campus.career.id, "Pinto", "SAME@example.edu"))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Duplicate(_)));
    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn update_replaces_fields_and_missing_student_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let service = StudentService::new(SqliteStudentRepository::new(&conn));
    let created = service
        .create(&draft(campus.career.id, "Prado", "prado@example.edu"))
        .unwrap();

    let mut changes = draft(campus.career.id, "Prado Ruiz", "prado.ruiz@example.edu");
    changes.is_active = false;
    changes.phone = Some("999-111".to_string());
    let updated = service.update(created.id, &changes).unwrap();

    assert_eq!(service.get(created.id).unwrap().student, updated);
    assert!(!updated.is_active);
    assert_eq!(updated.phone.as_deref(), Some("999-111"));

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.update(missing, &changes).unwrap_err(),
        ServiceError::NotFound { entity: "student", .. }
    ));
}

#[test]
fn delete_is_restricted_while_enrollments_exist() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let student = seed_student(&conn, &campus, "Leon", true);
    let subject = seed_subject(&conn, &campus, "Anatomy", 3);
    let enrollments = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    let held = enrollments
        .admit(&AdmissionRequest::new(student.id, subject.id, campus.period.id))
        .unwrap();
    let service = StudentService::new(SqliteStudentRepository::new(&conn));

    let err = service.delete(student.id).unwrap_err();
    assert!(matches!(err, ServiceError::InUse { entity: "student", id } if id == student.id));

    enrollments.withdraw(held.enrollment.id).unwrap();
    assert_eq!(service.delete(student.id).unwrap(), student);
    assert!(matches!(
        service.get(student.id).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}

#[test]
fn active_listing_is_ordered_by_last_name_with_career() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    seed_student(&conn, &campus, "Zevallos", true);
    seed_student(&conn, &campus, "Benavides", true);
    seed_student(&conn, &campus, "Molina", false);
    let service = StudentService::new(SqliteStudentRepository::new(&conn));

    let active = service.list_active_with_career().unwrap();

    let names: Vec<_> = active
        .iter()
        .map(|row| row.student.last_name.as_str())
        .collect();
    assert_eq!(names, vec!["Benavides", "Zevallos"]);
    assert!(active.iter().all(|row| row.career == campus.career));
}

#[test]
fn career_and_period_filter_requires_activity_and_an_enrollment_in_period() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let other_career = CatalogService::new(SqliteCatalogRepository::new(&conn))
        .create_career("Medicine")
        .unwrap();
    let other_period = seed_period(&conn, "2025-II", true);
    let subject = seed_subject(&conn, &campus, "Ecology", 10);

    let enrolled = seed_student(&conn, &campus, "Gamarra", true);
    let other_term = seed_student(&conn, &campus, "Herrera", true);
    let deactivated = seed_student(&conn, &campus, "Ibarra", true);
    seed_student(&conn, &campus, "Jara", true);
    let students = StudentService::new(SqliteStudentRepository::new(&conn));
    let outsider = students
        .create(&draft(other_career.id, "Kuong", "kuong@example.edu"))
        .unwrap();

    let enrollments = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    for (student_id, period_id) in [
        (enrolled.id, campus.period.id),
        (other_term.id, other_period.id),
        (deactivated.id, campus.period.id),
        (outsider.id, campus.period.id),
    ] {
        enrollments
            .admit(&AdmissionRequest::new(student_id, subject.id, period_id))
            .unwrap();
    }

    let mut inactive = draft(campus.career.id, "Ibarra", &deactivated.email);
    inactive.first_name = deactivated.first_name.clone();
    inactive.is_active = false;
    students.update(deactivated.id, &inactive).unwrap();

    let matches = students
        .list_active_by_career_and_period(campus.career.id, campus.period.id)
        .unwrap();

    let ids: Vec<_> = matches.iter().map(|row| row.student.id).collect();
    assert_eq!(ids, vec![enrolled.id]);
}
