//! Column lists and row parsers shared across repositories.
//!
//! Every entity is selected through an aliased column list (`st_*`, `sb_*`,
//! ...) so joined detail queries and single-table queries reuse one parser.

use super::{RepoError, RepoResult};
use crate::model::catalog::{Career, Cycle};
use crate::model::enrollment::{Enrollment, EnrollmentDetail};
use crate::model::period::AcademicPeriod;
use crate::model::student::Student;
use crate::model::subject::{Subject, SubjectDetail};
use crate::model::teacher::{EmploymentType, Teacher};
use rusqlite::Row;
use uuid::Uuid;

pub(crate) const CAREER_COLUMNS: &str = "ca.id AS ca_id, ca.name AS ca_name";

pub(crate) const CYCLE_COLUMNS: &str = "cy.id AS cy_id, cy.name AS cy_name, cy.ordinal AS cy_ordinal";

pub(crate) const STUDENT_COLUMNS: &str = "st.id AS st_id,
    st.first_name AS st_first_name,
    st.last_name AS st_last_name,
    st.email AS st_email,
    st.phone AS st_phone,
    st.is_active AS st_is_active,
    st.career_id AS st_career_id";

pub(crate) const TEACHER_COLUMNS: &str = "te.id AS te_id,
    te.first_name AS te_first_name,
    te.last_name AS te_last_name,
    te.email AS te_email,
    te.employment_type AS te_employment_type,
    te.is_active AS te_is_active";

pub(crate) const SUBJECT_COLUMNS: &str = "sb.id AS sb_id,
    sb.name AS sb_name,
    sb.career_id AS sb_career_id,
    sb.cycle_id AS sb_cycle_id,
    sb.total_quota AS sb_total_quota,
    sb.available_quota AS sb_available_quota";

pub(crate) const PERIOD_COLUMNS: &str = "pe.id AS pe_id,
    pe.name AS pe_name,
    pe.starts_at AS pe_starts_at,
    pe.ends_at AS pe_ends_at,
    pe.is_active AS pe_is_active";

pub(crate) const ENROLLMENT_COLUMNS: &str = "en.id AS en_id,
    en.student_id AS en_student_id,
    en.subject_id AS en_subject_id,
    en.academic_period_id AS en_academic_period_id,
    en.enrolled_at AS en_enrolled_at";

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn get_uuid(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    parse_uuid(&text, column)
}

fn get_bool(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn parse_career_row(row: &Row<'_>) -> RepoResult<Career> {
    Ok(Career {
        id: get_uuid(row, "ca_id")?,
        name: row.get("ca_name")?,
    })
}

pub(crate) fn parse_cycle_row(row: &Row<'_>) -> RepoResult<Cycle> {
    Ok(Cycle {
        id: get_uuid(row, "cy_id")?,
        name: row.get("cy_name")?,
        ordinal: row.get("cy_ordinal")?,
    })
}

pub(crate) fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    Ok(Student {
        id: get_uuid(row, "st_id")?,
        first_name: row.get("st_first_name")?,
        last_name: row.get("st_last_name")?,
        email: row.get("st_email")?,
        phone: row.get("st_phone")?,
        is_active: get_bool(row, "st_is_active")?,
        career_id: get_uuid(row, "st_career_id")?,
    })
}

pub(crate) fn parse_teacher_row(row: &Row<'_>) -> RepoResult<Teacher> {
    let employment_text: String = row.get("te_employment_type")?;
    let employment_type = EmploymentType::parse_db(&employment_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid employment type `{employment_text}` in teachers.employment_type"
        ))
    })?;
    Ok(Teacher {
        id: get_uuid(row, "te_id")?,
        first_name: row.get("te_first_name")?,
        last_name: row.get("te_last_name")?,
        email: row.get("te_email")?,
        employment_type,
        is_active: get_bool(row, "te_is_active")?,
    })
}

/// Parses a subject and rejects rows that break the quota invariant.
pub(crate) fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let subject = Subject {
        id: get_uuid(row, "sb_id")?,
        name: row.get("sb_name")?,
        career_id: get_uuid(row, "sb_career_id")?,
        cycle_id: get_uuid(row, "sb_cycle_id")?,
        total_quota: row.get("sb_total_quota")?,
        available_quota: row.get("sb_available_quota")?,
    };
    subject.validate().map_err(|err| {
        RepoError::InvalidData(format!("subject {} is inconsistent: {err}", subject.id))
    })?;
    Ok(subject)
}

pub(crate) fn parse_subject_detail_row(row: &Row<'_>) -> RepoResult<SubjectDetail> {
    Ok(SubjectDetail {
        subject: parse_subject_row(row)?,
        career: parse_career_row(row)?,
        cycle: parse_cycle_row(row)?,
    })
}

pub(crate) fn parse_period_row(row: &Row<'_>) -> RepoResult<AcademicPeriod> {
    Ok(AcademicPeriod {
        id: get_uuid(row, "pe_id")?,
        name: row.get("pe_name")?,
        starts_at: row.get("pe_starts_at")?,
        ends_at: row.get("pe_ends_at")?,
        is_active: get_bool(row, "pe_is_active")?,
    })
}

pub(crate) fn parse_enrollment_row(row: &Row<'_>) -> RepoResult<Enrollment> {
    Ok(Enrollment {
        id: get_uuid(row, "en_id")?,
        student_id: get_uuid(row, "en_student_id")?,
        subject_id: get_uuid(row, "en_subject_id")?,
        academic_period_id: get_uuid(row, "en_academic_period_id")?,
        enrolled_at: row.get("en_enrolled_at")?,
    })
}

pub(crate) fn parse_enrollment_detail_row(row: &Row<'_>) -> RepoResult<EnrollmentDetail> {
    Ok(EnrollmentDetail {
        enrollment: parse_enrollment_row(row)?,
        student: parse_student_row(row)?,
        subject: parse_subject_detail_row(row)?,
        academic_period: parse_period_row(row)?,
    })
}
