//! Subject record and seat accounting.
//!
//! # Invariants
//! - `0 <= available_quota <= total_quota` at all times.
//! - `total_quota - available_quota` equals the live enrollment count; only
//!   the admission engine's reserve/release paths move `available_quota`.

use super::catalog::{Career, CareerId, Cycle, CycleId};
use super::validation::{normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SubjectId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub career_id: CareerId,
    pub cycle_id: CycleId,
    /// Seat capacity.
    pub total_quota: i64,
    /// Remaining seats. Stored counter, not recomputed on read.
    pub available_quota: i64,
}

/// Subject with its owning career and cycle attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDetail {
    pub subject: Subject,
    pub career: Career,
    pub cycle: Cycle,
}

impl Subject {
    /// Creates a subject whose seats are all free.
    pub fn new(
        name: &str,
        career_id: CareerId,
        cycle_id: CycleId,
        total_quota: i64,
    ) -> Result<Self, ValidationError> {
        let subject = Self {
            id: Uuid::new_v4(),
            name: normalize_required("subject name", name)?,
            career_id,
            cycle_id,
            total_quota,
            available_quota: total_quota,
        };
        subject.validate()?;
        Ok(subject)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("subject name"));
        }
        if self.total_quota < 0 || self.available_quota < 0 || self.available_quota > self.total_quota {
            return Err(ValidationError::QuotaOutOfRange {
                total: self.total_quota,
                available: self.available_quota,
            });
        }
        Ok(())
    }

    /// Seats currently held by live enrollments.
    pub fn enrolled_count(&self) -> i64 {
        self.total_quota - self.available_quota
    }

    pub fn has_available_seat(&self) -> bool {
        self.available_quota > 0
    }
}
