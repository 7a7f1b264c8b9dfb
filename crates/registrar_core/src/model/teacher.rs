//! Teacher record and employment classification.

use super::subject::Subject;
use super::validation::{normalize_email, normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TeacherId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
}

impl EmploymentType {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        match value {
            "full_time" => Some(Self::FullTime),
            "part_time" => Some(Self::PartTime),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub employment_type: EmploymentType,
    pub is_active: bool,
}

/// Create/update input for a teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub employment_type: EmploymentType,
    pub is_active: bool,
}

/// Teacher read model annotated with the number of assigned subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherWithLoad {
    pub teacher: Teacher,
    pub total_subjects: u32,
}

/// Teacher with the subjects assigned to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub teacher: Teacher,
    pub subjects: Vec<Subject>,
}

impl Teacher {
    pub fn from_draft(draft: &TeacherDraft) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), draft)
    }

    pub fn with_id(id: TeacherId, draft: &TeacherDraft) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            first_name: normalize_required("first name", &draft.first_name)?,
            last_name: normalize_required("last name", &draft.last_name)?,
            email: normalize_email(&draft.email)?,
            employment_type: draft.employment_type,
            is_active: draft.is_active,
        })
    }
}
