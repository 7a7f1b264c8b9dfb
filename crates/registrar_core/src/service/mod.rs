//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce business preconditions above the persistence contracts.
//!
//! # Invariants
//! - Services hold no shared mutable state; each call is one self-contained
//!   unit of work against the store.

pub mod catalog_service;
pub mod enrollment_service;
pub mod error;
pub mod period_service;
pub mod student_service;
pub mod subject_service;
pub mod teacher_service;

pub use error::{ServiceError, ServiceResult};
