//! Repository error type shared by all SQLite repositories.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const FOREIGN_KEY_FAILED: &str = "FOREIGN KEY constraint failed";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Transport, lock or bootstrap failure from SQLite.
    Db(DbError),
    /// Target row does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Insert/update collided with a UNIQUE or PRIMARY KEY constraint.
    UniqueViolation(String),
    /// Write referenced a missing row, or delete was restricted by dependents.
    ForeignKeyViolation(String),
    /// Write violated a CHECK constraint.
    CheckViolation(String),
    /// Record failed model validation before reaching SQL.
    Validation(ValidationError),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UniqueViolation(detail) => write!(f, "unique constraint violated: {detail}"),
            Self::ForeignKeyViolation(detail) => {
                write!(f, "foreign key constraint violated: {detail}")
            }
            Self::CheckViolation(detail) => write!(f, "check constraint violated: {detail}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            let detail = message
                .clone()
                .unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Self::UniqueViolation(detail);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKeyViolation(detail),
                // Deferred and RESTRICT foreign key actions are enforced as triggers.
                ffi::SQLITE_CONSTRAINT_TRIGGER if detail == FOREIGN_KEY_FAILED => {
                    return Self::ForeignKeyViolation(detail);
                }
                ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(detail),
                _ => {}
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}
