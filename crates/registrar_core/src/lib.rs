//! Core domain logic for the registrar.
//! This crate is the single source of truth for enrollment and seat invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DatabaseConfig, LoggingConfig, RegistrarConfig};
pub use db::{open_db, open_db_in_memory, open_db_with, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::enrollment::{
    AdmissionRequest, Enrollment, EnrollmentDetail, EnrollmentId, EnrollmentKey,
    EnrollmentReportRow,
};
pub use model::validation::ValidationError;
pub use repo::enrollment_repo::{AtomicEnrollmentStore, EnrollmentStore, SqliteEnrollmentStore};
pub use repo::{RepoError, RepoResult};
pub use service::enrollment_service::{
    AdmissionError, CapacityReason, EnrollmentReport, EnrollmentService, StudentPeriodEnrollments,
};
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
