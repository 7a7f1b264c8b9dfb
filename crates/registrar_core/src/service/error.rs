//! Error type shared by administrative CRUD services.

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field validation.
    Validation(ValidationError),
    /// Target record does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// A record referenced by the input does not exist.
    ReferenceNotFound { entity: &'static str, id: Uuid },
    /// Input collides with a unique field of another record.
    Duplicate(String),
    /// Delete refused because other records still reference the target.
    InUse { entity: &'static str, id: Uuid },
    /// Capacity change would drop below the seats already held.
    QuotaBelowEnrolled {
        subject_id: Uuid,
        enrolled: i64,
        requested: i64,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Maps a delete failure, turning restricted foreign keys into `InUse`.
    pub(crate) fn from_delete(entity: &'static str, id: Uuid, err: RepoError) -> Self {
        match err {
            RepoError::ForeignKeyViolation(_) => Self::InUse { entity, id },
            other => other.into(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ReferenceNotFound { entity, id } => {
                write!(f, "referenced {entity} not found: {id}")
            }
            Self::Duplicate(detail) => write!(f, "duplicate record: {detail}"),
            Self::InUse { entity, id } => {
                write!(f, "{entity} {id} is still referenced by other records")
            }
            Self::QuotaBelowEnrolled {
                subject_id,
                enrolled,
                requested,
            } => write!(
                f,
                "subject {subject_id} has {enrolled} enrolled students; quota {requested} is too small"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::UniqueViolation(detail) => Self::Duplicate(detail),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}
