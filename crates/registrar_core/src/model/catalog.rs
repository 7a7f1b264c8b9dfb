//! Career and cycle reference data.

use super::validation::{normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CareerId = Uuid;
pub type CycleId = Uuid;

/// Degree program that owns students and subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Career {
    pub id: CareerId,
    pub name: String,
}

/// Curriculum stage (semester / year) a subject belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: CycleId,
    pub name: String,
    /// 1-based position inside the curriculum.
    pub ordinal: i64,
}

impl Career {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_required("career name", name)?,
        })
    }
}

impl Cycle {
    pub fn new(name: &str, ordinal: i64) -> Result<Self, ValidationError> {
        if ordinal <= 0 {
            return Err(ValidationError::InvalidOrdinal(ordinal));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_required("cycle name", name)?,
            ordinal,
        })
    }
}
