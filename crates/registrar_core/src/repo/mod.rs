//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, constraint
//!   violations) in addition to DB transport errors.
//! - `subjects.available_quota` is only written through conditional
//!   statements; no repository performs a blind overwrite of it.

pub mod catalog_repo;
pub mod enrollment_repo;
pub mod error;
pub mod period_repo;
mod row_mapping;
pub mod student_repo;
pub mod subject_repo;
pub mod teacher_repo;

pub use error::{RepoError, RepoResult};
