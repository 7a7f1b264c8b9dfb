//! Student record.
//!
//! Students are referenced, never owned, by enrollments. Only active
//! students may be admitted into a subject.

use super::catalog::{Career, CareerId};
use super::validation::{
    normalize_email, normalize_optional, normalize_required, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StudentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub career_id: CareerId,
}

/// Create/update input for a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub career_id: CareerId,
}

/// Student together with the career it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithCareer {
    pub student: Student,
    pub career: Career,
}

impl Student {
    /// Builds a new student with a generated id from validated draft fields.
    pub fn from_draft(draft: &StudentDraft) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Builds a student with a caller-provided id; used by update paths.
    pub fn with_id(id: StudentId, draft: &StudentDraft) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            first_name: normalize_required("first name", &draft.first_name)?,
            last_name: normalize_required("last name", &draft.last_name)?,
            email: normalize_email(&draft.email)?,
            phone: normalize_optional(draft.phone.as_deref()),
            is_active: draft.is_active,
            career_id: draft.career_id,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
