mod common;

use common::{seed_campus, seed_period, seed_student, seed_subject};
use registrar_core::db::open_db_in_memory;
use registrar_core::{
    AdmissionError, AdmissionRequest, EnrollmentReportRow, EnrollmentService,
    SqliteEnrollmentStore,
};
use uuid::Uuid;

fn request_at(
    student_id: Uuid,
    subject_id: Uuid,
    period_id: Uuid,
    enrolled_at: i64,
) -> AdmissionRequest {
    let mut request = AdmissionRequest::new(student_id, subject_id, period_id);
    request.enrolled_at = Some(enrolled_at);
    request
}

#[test]
fn student_period_listing_is_newest_first_and_scoped_to_period() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let other_period = seed_period(&conn, "2025-II", true);
    let student = seed_student(&conn, &campus, "Lopez", true);
    let early = seed_subject(&conn, &campus, "Geometry", 10);
    let late = seed_subject(&conn, &campus, "Topology", 10);
    let service = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));

    service
        .admit(&request_at(student.id, early.id, campus.period.id, 1_000))
        .unwrap();
    service
        .admit(&request_at(student.id, late.id, campus.period.id, 2_000))
        .unwrap();
    service
        .admit(&request_at(student.id, early.id, other_period.id, 3_000))
        .unwrap();

    let listing = service
        .list_for_student_in_period(student.id, campus.period.id)
        .unwrap();

    assert_eq!(listing.student, student);
    assert_eq!(listing.academic_period, campus.period);
    assert_eq!(listing.total_enrolled, 2);
    let subjects: Vec<_> = listing
        .enrollments
        .iter()
        .map(|detail| detail.subject.subject.name.as_str())
        .collect();
    assert_eq!(subjects, vec!["Topology", "Geometry"]);
}

#[test]
fn student_period_listing_requires_student_and_period() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let student = seed_student(&conn, &campus, "Nunez", true);
    let service = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));

    let missing_student = service
        .list_for_student_in_period(Uuid::new_v4(), campus.period.id)
        .unwrap_err();
    assert!(matches!(
        missing_student,
        AdmissionError::NotFound { entity: "student", .. }
    ));

    let missing_period = service
        .list_for_student_in_period(student.id, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(
        missing_period,
        AdmissionError::NotFound {
            entity: "academic period",
            ..
        }
    ));

    let empty = service
        .list_for_student_in_period(student.id, campus.period.id)
        .unwrap();
    assert_eq!(empty.total_enrolled, 0);
    assert!(empty.enrollments.is_empty());
}

#[test]
fn get_and_list_all_reflect_committed_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let student = seed_student(&conn, &campus, "Ortiz", true);
    let algebra = seed_subject(&conn, &campus, "Algebra", 4);
    let biology = seed_subject(&conn, &campus, "Biology", 4);
    let service = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));

    let first = service
        .admit(&request_at(student.id, algebra.id, campus.period.id, 10))
        .unwrap();
    let second = service
        .admit(&request_at(student.id, biology.id, campus.period.id, 20))
        .unwrap();

    assert_eq!(service.get(first.enrollment.id).unwrap(), first);
    let all: Vec<_> = service
        .list_all()
        .unwrap()
        .into_iter()
        .map(|detail| detail.enrollment.id)
        .collect();
    assert_eq!(all, vec![second.enrollment.id, first.enrollment.id]);

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.get(missing).unwrap_err(),
        AdmissionError::NotFound { entity: "enrollment", id } if id == missing
    ));
}

#[test]
fn report_counts_per_student_and_skips_students_without_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let busy = seed_student(&conn, &campus, "Zapata", true);
    let light = seed_student(&conn, &campus, "Acosta", true);
    seed_student(&conn, &campus, "Idle", true);
    let subjects = [
        seed_subject(&conn, &campus, "Art", 5),
        seed_subject(&conn, &campus, "Music", 5),
        seed_subject(&conn, &campus, "Drama", 5),
    ];
    let service = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));

    for subject in &subjects {
        service
            .admit(&AdmissionRequest::new(busy.id, subject.id, campus.period.id))
            .unwrap();
    }
    service
        .admit(&AdmissionRequest::new(light.id, subjects[0].id, campus.period.id))
        .unwrap();

    let report = service.report().unwrap();

    assert_eq!(report.total_students, 2);
    assert!(report.generated_at > 0);
    assert_eq!(
        report.rows,
        vec![
            EnrollmentReportRow {
                student_name: "Ana Zapata".to_string(),
                career_name: campus.career.name.clone(),
                total_subjects: 3,
            },
            EnrollmentReportRow {
                student_name: "Ana Acosta".to_string(),
                career_name: campus.career.name.clone(),
                total_subjects: 1,
            },
        ]
    );
}

#[test]
fn report_payload_serializes_to_json() {
    let conn = open_db_in_memory().unwrap();
    let campus = seed_campus(&conn);
    let student = seed_student(&conn, &campus, "Reyes", true);
    let subject = seed_subject(&conn, &campus, "History", 2);
    let service = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    service
        .admit(&AdmissionRequest::new(student.id, subject.id, campus.period.id))
        .unwrap();

    let value = serde_json::to_value(service.report().unwrap()).unwrap();

    assert_eq!(value["total_students"], 1);
    assert_eq!(value["rows"][0]["student_name"], "Ana Reyes");
    assert_eq!(value["rows"][0]["total_subjects"], 1);
}
