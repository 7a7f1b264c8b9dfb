//! Academic period record.
//!
//! Enrollments may only be created against an active period.

use super::validation::{normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PeriodId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPeriod {
    pub id: PeriodId,
    pub name: String,
    /// Unix epoch milliseconds.
    pub starts_at: i64,
    /// Unix epoch milliseconds. Never earlier than `starts_at`.
    pub ends_at: i64,
    pub is_active: bool,
}

/// Create/update input for a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodDraft {
    pub name: String,
    pub starts_at: i64,
    pub ends_at: i64,
    pub is_active: bool,
}

impl AcademicPeriod {
    pub fn new(
        name: &str,
        starts_at: i64,
        ends_at: i64,
        is_active: bool,
    ) -> Result<Self, ValidationError> {
        Self::with_id(
            Uuid::new_v4(),
            &PeriodDraft {
                name: name.to_string(),
                starts_at,
                ends_at,
                is_active,
            },
        )
    }

    /// Builds a period with a caller-provided id; used by update paths.
    pub fn with_id(id: PeriodId, draft: &PeriodDraft) -> Result<Self, ValidationError> {
        let period = Self {
            id,
            name: normalize_required("period name", &draft.name)?,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            is_active: draft.is_active,
        };
        period.validate()?;
        Ok(period)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("period name"));
        }
        if self.ends_at < self.starts_at {
            return Err(ValidationError::InvalidDateRange {
                starts_at: self.starts_at,
                ends_at: self.ends_at,
            });
        }
        Ok(())
    }
}
