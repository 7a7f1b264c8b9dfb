//! Enrollment admission and withdrawal use-cases.
//!
//! # Responsibility
//! - Validate an admission against student, subject and period state.
//! - Reserve one seat and record the enrollment as one unit of work.
//! - Release the seat and remove the enrollment as one unit of work.
//!
//! # Invariants
//! - For every subject, `available_quota == total_quota - live enrollments`.
//! - The conditional seat decrement is the authoritative capacity guard; the
//!   cached quota check before it only short-circuits obvious rejections.
//! - A caller that receives an error observes no side effect.

use crate::model::enrollment::{
    AdmissionRequest, Enrollment, EnrollmentDetail, EnrollmentId, EnrollmentKey,
    EnrollmentReportRow, NewEnrollment,
};
use crate::model::period::{AcademicPeriod, PeriodId};
use crate::model::student::{Student, StudentId};
use crate::model::subject::SubjectId;
use crate::repo::enrollment_repo::{AtomicEnrollmentStore, EnrollmentStore};
use crate::repo::RepoError;
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Why an admission could not take a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityReason {
    /// The subject had no seat left when the request was validated.
    NoSeats,
    /// A concurrent admission took the last seat first.
    LostRace,
}

/// Errors from admission, withdrawal and enrollment queries.
#[derive(Debug)]
pub enum AdmissionError {
    /// A referenced record does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// A referenced record exists but fails a business precondition.
    InvalidState {
        entity: &'static str,
        id: Uuid,
        reason: &'static str,
    },
    /// No seat could be reserved.
    Capacity {
        subject_id: SubjectId,
        reason: CapacityReason,
    },
    /// The student already holds this subject in this period.
    Conflict(EnrollmentKey),
    /// Store fault; the unit of work has been rolled back.
    Infrastructure(RepoError),
}

impl AdmissionError {
    /// Stable machine-readable code for logs and callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::Capacity { .. } => "capacity",
            Self::Conflict(_) => "conflict",
            Self::Infrastructure(_) => "infrastructure",
        }
    }

    /// Business rejections, as opposed to store faults.
    pub fn is_business_failure(&self) -> bool {
        !matches!(self, Self::Infrastructure(_))
    }
}

impl Display for AdmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidState { entity, id, reason } => write!(f, "{entity} {id} {reason}"),
            Self::Capacity {
                subject_id,
                reason: CapacityReason::NoSeats,
            } => write!(f, "no available seats for subject {subject_id}"),
            Self::Capacity {
                subject_id,
                reason: CapacityReason::LostRace,
            } => write!(
                f,
                "no available seats for subject {subject_id} (concurrent enrollment)"
            ),
            Self::Conflict(key) => write!(
                f,
                "student {} is already enrolled in subject {} for period {}",
                key.student_id, key.subject_id, key.academic_period_id
            ),
            Self::Infrastructure(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdmissionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Infrastructure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AdmissionError {
    fn from(value: RepoError) -> Self {
        Self::Infrastructure(value)
    }
}

/// One student's enrollments within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentPeriodEnrollments {
    pub student: Student,
    pub academic_period: AcademicPeriod,
    pub enrollments: Vec<EnrollmentDetail>,
    pub total_enrolled: usize,
}

/// Per-student enrollment counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentReport {
    pub rows: Vec<EnrollmentReportRow>,
    pub total_students: usize,
    /// Unix epoch milliseconds.
    pub generated_at: i64,
}

/// Admission engine and enrollment query facade.
pub struct EnrollmentService<S: AtomicEnrollmentStore> {
    store: S,
}

impl<S: AtomicEnrollmentStore> EnrollmentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Admits a student into one seat of a subject for a period.
    ///
    /// # Contract
    /// - Validation order: student exists, student active, subject exists,
    ///   period exists, period active, cached seat available, no duplicate.
    /// - On success the seat decrement and the insert commit together and
    ///   the enrollment is returned with student, subject (career, cycle)
    ///   and period attached.
    ///
    /// # Errors
    /// - `Capacity(LostRace)` when the conditional decrement changes no row.
    /// - `Conflict` when the unique triple is violated at insert time; the
    ///   reserved seat is rolled back with the rest of the unit of work.
    pub fn admit(&self, request: &AdmissionRequest) -> Result<EnrollmentDetail, AdmissionError> {
        let started_at = Instant::now();
        let result = self.store.run_atomic(|store| admit_within(store, request));

        match &result {
            Ok(detail) => info!(
                "event=enrollment_admit module=enrollment status=ok enrollment_id={} subject_id={} period_id={} duration_ms={}",
                detail.enrollment.id,
                request.subject_id,
                request.academic_period_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("enrollment_admit", request.subject_id, err, started_at),
        }
        result
    }

    /// Withdraws one enrollment and gives its seat back.
    ///
    /// The lookup, seat release and delete share one unit of work, so two
    /// concurrent withdrawals of the same id release at most one seat.
    pub fn withdraw(&self, id: EnrollmentId) -> Result<Enrollment, AdmissionError> {
        let started_at = Instant::now();
        let result = self.store.run_atomic(|store| withdraw_within(store, id));

        match &result {
            Ok(removed) => info!(
                "event=enrollment_withdraw module=enrollment status=ok enrollment_id={} subject_id={} duration_ms={}",
                removed.id,
                removed.subject_id,
                started_at.elapsed().as_millis()
            ),
            Err(AdmissionError::NotFound { .. }) => info!(
                "event=enrollment_withdraw module=enrollment status=rejected error_code=not_found enrollment_id={id}"
            ),
            Err(err) => error!(
                "event=enrollment_withdraw module=enrollment status=error error_code={} enrollment_id={id} error={}",
                err.code(),
                err
            ),
        }
        result
    }

    /// Loads one enrollment with nested references.
    pub fn get(&self, id: EnrollmentId) -> Result<EnrollmentDetail, AdmissionError> {
        self.store
            .load_enrollment_detail(id)?
            .ok_or(AdmissionError::NotFound {
                entity: "enrollment",
                id,
            })
    }

    /// Lists every enrollment, newest first.
    pub fn list_all(&self) -> Result<Vec<EnrollmentDetail>, AdmissionError> {
        Ok(self.store.list_enrollment_details()?)
    }

    /// Lists one student's enrollments in one period, newest first.
    ///
    /// Both the student and the period must exist.
    pub fn list_for_student_in_period(
        &self,
        student_id: StudentId,
        period_id: PeriodId,
    ) -> Result<StudentPeriodEnrollments, AdmissionError> {
        let student = require_student(&self.store, student_id)?;
        let academic_period = require_period(&self.store, period_id)?;
        let enrollments = self
            .store
            .list_student_period_enrollments(student_id, period_id)?;
        Ok(StudentPeriodEnrollments {
            student,
            academic_period,
            total_enrolled: enrollments.len(),
            enrollments,
        })
    }

    /// Builds the per-student enrollment count report.
    pub fn report(&self) -> Result<EnrollmentReport, AdmissionError> {
        let rows = self.store.enrollment_report()?;
        Ok(EnrollmentReport {
            total_students: rows.len(),
            rows,
            generated_at: now_epoch_ms(),
        })
    }
}

fn admit_within(
    store: &dyn EnrollmentStore,
    request: &AdmissionRequest,
) -> Result<EnrollmentDetail, AdmissionError> {
    let student = require_student(store, request.student_id)?;
    if !student.is_active {
        return Err(AdmissionError::InvalidState {
            entity: "student",
            id: student.id,
            reason: "is not active",
        });
    }

    let subject = store
        .get_subject(request.subject_id)?
        .ok_or(AdmissionError::NotFound {
            entity: "subject",
            id: request.subject_id,
        })?;

    let period = require_period(store, request.academic_period_id)?;
    if !period.is_active {
        return Err(AdmissionError::InvalidState {
            entity: "academic period",
            id: period.id,
            reason: "is not active",
        });
    }

    if !subject.has_available_seat() {
        return Err(AdmissionError::Capacity {
            subject_id: subject.id,
            reason: CapacityReason::NoSeats,
        });
    }

    let key = request.key();
    if store.find_enrollment(&key)?.is_some() {
        return Err(AdmissionError::Conflict(key));
    }

    if store.reserve_seat(subject.id)? == 0 {
        return Err(AdmissionError::Capacity {
            subject_id: subject.id,
            reason: CapacityReason::LostRace,
        });
    }

    let new = NewEnrollment {
        id: Uuid::new_v4(),
        key,
        enrolled_at: request.enrolled_at,
    };
    let enrollment = match store.insert_enrollment(&new) {
        Ok(enrollment) => enrollment,
        Err(RepoError::UniqueViolation(_)) => return Err(AdmissionError::Conflict(key)),
        Err(err) => return Err(err.into()),
    };

    store
        .load_enrollment_detail(enrollment.id)?
        .ok_or_else(|| {
            AdmissionError::Infrastructure(RepoError::InvalidData(format!(
                "enrollment {} vanished inside its own transaction",
                enrollment.id
            )))
        })
}

fn withdraw_within(
    store: &dyn EnrollmentStore,
    id: EnrollmentId,
) -> Result<Enrollment, AdmissionError> {
    let not_found = AdmissionError::NotFound {
        entity: "enrollment",
        id,
    };
    let enrollment = match store.get_enrollment(id)? {
        Some(enrollment) => enrollment,
        None => return Err(not_found),
    };

    if store.release_seat(enrollment.subject_id)? == 0 {
        return Err(AdmissionError::Infrastructure(RepoError::InvalidData(format!(
            "subject {} has no held seat to release for enrollment {id}",
            enrollment.subject_id
        ))));
    }

    store.delete_enrollment(id)?.ok_or(not_found)
}

fn require_student(
    store: &dyn EnrollmentStore,
    id: StudentId,
) -> Result<Student, AdmissionError> {
    store.get_student(id)?.ok_or(AdmissionError::NotFound {
        entity: "student",
        id,
    })
}

fn require_period(
    store: &dyn EnrollmentStore,
    id: PeriodId,
) -> Result<AcademicPeriod, AdmissionError> {
    store.get_period(id)?.ok_or(AdmissionError::NotFound {
        entity: "academic period",
        id,
    })
}

fn log_failure(event: &str, subject_id: SubjectId, err: &AdmissionError, started_at: Instant) {
    if err.is_business_failure() {
        info!(
            "event={event} module=enrollment status=rejected error_code={} subject_id={subject_id} duration_ms={}",
            err.code(),
            started_at.elapsed().as_millis()
        );
    } else {
        error!(
            "event={event} module=enrollment status=error error_code={} subject_id={subject_id} duration_ms={} error={}",
            err.code(),
            started_at.elapsed().as_millis(),
            err
        );
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
