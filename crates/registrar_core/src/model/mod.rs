//! Academic records domain model.
//!
//! # Responsibility
//! - Define plain records shared by repositories and services.
//! - Keep field-level validation next to the data it guards.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - `Subject::available_quota` never leaves `0..=total_quota`.

pub mod catalog;
pub mod enrollment;
pub mod period;
pub mod student;
pub mod subject;
pub mod teacher;
pub mod validation;
