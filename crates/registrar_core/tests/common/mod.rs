#![allow(dead_code)]

use registrar_core::model::catalog::{Career, Cycle};
use registrar_core::model::period::{AcademicPeriod, PeriodDraft};
use registrar_core::model::student::{Student, StudentDraft};
use registrar_core::model::subject::Subject;
use registrar_core::repo::catalog_repo::SqliteCatalogRepository;
use registrar_core::repo::period_repo::SqlitePeriodRepository;
use registrar_core::repo::student_repo::SqliteStudentRepository;
use registrar_core::repo::subject_repo::SqliteSubjectRepository;
use registrar_core::service::catalog_service::CatalogService;
use registrar_core::service::period_service::PeriodService;
use registrar_core::service::student_service::StudentService;
use registrar_core::service::subject_service::SubjectService;
use rusqlite::Connection;
use uuid::Uuid;

/// Career, cycle and active period shared by most scenarios.
pub struct Campus {
    pub career: Career,
    pub cycle: Cycle,
    pub period: AcademicPeriod,
}

pub fn seed_campus(conn: &Connection) -> Campus {
    let catalog = CatalogService::new(SqliteCatalogRepository::new(conn));
    let career = catalog.create_career("Systems Engineering").unwrap();
    let cycle = catalog.create_cycle("First cycle", 1).unwrap();
    let period = seed_period(conn, "2025-I", true);
    Campus {
        career,
        cycle,
        period,
    }
}

pub fn seed_period(conn: &Connection, name: &str, is_active: bool) -> AcademicPeriod {
    PeriodService::new(SqlitePeriodRepository::new(conn))
        .create(&PeriodDraft {
            name: name.to_string(),
            starts_at: 1_735_689_600_000,
            ends_at: 1_751_328_000_000,
            is_active,
        })
        .unwrap()
}

pub fn seed_student(conn: &Connection, campus: &Campus, last_name: &str, is_active: bool) -> Student {
    StudentService::new(SqliteStudentRepository::new(conn))
        .create(&StudentDraft {
            first_name: "Ana".to_string(),
            last_name: last_name.to_string(),
            email: format!("{}.{}@example.edu", last_name.to_lowercase(), Uuid::new_v4().simple()),
            phone: None,
            is_active,
            career_id: campus.career.id,
        })
        .unwrap()
}

pub fn seed_subject(conn: &Connection, campus: &Campus, name: &str, total_quota: i64) -> Subject {
    SubjectService::new(SqliteSubjectRepository::new(conn))
        .create(name, campus.career.id, campus.cycle.id, total_quota)
        .unwrap()
}

/// Forces `available_quota` to a fixed value, bypassing the service layer.
pub fn set_available_quota(conn: &Connection, subject_id: Uuid, available: i64) {
    conn.execute(
        "UPDATE subjects SET available_quota = ?2 WHERE id = ?1;",
        rusqlite::params![subject_id.to_string(), available],
    )
    .unwrap();
}

/// Returns `(total_quota, available_quota)` for one subject.
pub fn quota(conn: &Connection, subject_id: Uuid) -> (i64, i64) {
    conn.query_row(
        "SELECT total_quota, available_quota FROM subjects WHERE id = ?1;",
        [subject_id.to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap()
}

pub fn enrollment_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM enrollments;", [], |row| row.get(0))
        .unwrap()
}

pub fn seat_holders(conn: &Connection, subject_id: Uuid) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM enrollments WHERE subject_id = ?1;",
        [subject_id.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}

/// Asserts `available_quota == total_quota - live enrollments` for every subject.
pub fn assert_seat_accounting(conn: &Connection) {
    let mut stmt = conn
        .prepare(
            "SELECT sb.id, sb.total_quota, sb.available_quota, COUNT(en.id)
             FROM subjects sb
             LEFT JOIN enrollments en ON en.subject_id = sb.id
             GROUP BY sb.id;",
        )
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .unwrap();
    for row in rows {
        let (id, total, available, live) = row.unwrap();
        assert_eq!(
            available,
            total - live,
            "seat accounting broken for subject {id}"
        );
    }
}
