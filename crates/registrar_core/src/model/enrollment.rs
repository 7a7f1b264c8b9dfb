//! Enrollment fact records and admission inputs.
//!
//! # Invariants
//! - `(student_id, subject_id, academic_period_id)` is unique.
//! - Every live enrollment holds exactly one seat of its subject.

use super::period::{AcademicPeriod, PeriodId};
use super::student::{Student, StudentId};
use super::subject::{SubjectDetail, SubjectId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EnrollmentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub academic_period_id: PeriodId,
    /// Unix epoch milliseconds.
    pub enrolled_at: i64,
}

/// The uniqueness triple of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentKey {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub academic_period_id: PeriodId,
}

/// Caller input for an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub academic_period_id: PeriodId,
    /// Defaults to the store's current time when absent.
    pub enrolled_at: Option<i64>,
}

/// Row to insert once a seat has been reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEnrollment {
    pub id: EnrollmentId,
    pub key: EnrollmentKey,
    pub enrolled_at: Option<i64>,
}

/// Enrollment with student, subject (career and cycle) and period attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentDetail {
    pub enrollment: Enrollment,
    pub student: Student,
    pub subject: SubjectDetail,
    pub academic_period: AcademicPeriod,
}

/// One line of the per-student enrollment count report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentReportRow {
    pub student_name: String,
    pub career_name: String,
    pub total_subjects: u32,
}

impl Enrollment {
    pub fn key(&self) -> EnrollmentKey {
        EnrollmentKey {
            student_id: self.student_id,
            subject_id: self.subject_id,
            academic_period_id: self.academic_period_id,
        }
    }
}

impl AdmissionRequest {
    pub fn new(student_id: StudentId, subject_id: SubjectId, academic_period_id: PeriodId) -> Self {
        Self {
            student_id,
            subject_id,
            academic_period_id,
            enrolled_at: None,
        }
    }

    pub fn key(&self) -> EnrollmentKey {
        EnrollmentKey {
            student_id: self.student_id,
            subject_id: self.subject_id,
            academic_period_id: self.academic_period_id,
        }
    }
}
