//! Operator CLI over `registrar_core`.
//!
//! # Responsibility
//! - Load configuration, open the database and dispatch one command.
//! - Print command results as JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use registrar_core::{
    open_db_with, AdmissionRequest, ConfigError, EnrollmentService, RegistrarConfig,
    SqliteEnrollmentStore,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "registrar", version, about = "Enrollment admission operator tool")]
struct Cli {
    /// Path to a registrar.toml file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check core linkage.
    Ping,
    /// Print per-student enrollment counts.
    Report,
    /// Admit a student into one seat of a subject.
    Admit {
        #[arg(long)]
        student: Uuid,
        #[arg(long)]
        subject: Uuid,
        #[arg(long)]
        period: Uuid,
        /// Admission time in epoch milliseconds; defaults to the store clock.
        #[arg(long)]
        enrolled_at: Option<i64>,
    },
    /// Withdraw an enrollment and release its seat.
    Withdraw {
        #[arg(long)]
        enrollment: Uuid,
    },
    /// List a student's enrollments in one period.
    List {
        #[arg(long)]
        student: Uuid,
        #[arg(long)]
        period: Uuid,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = match cli.command {
        Command::Ping => ping_payload(),
        command => run_with_store(command, cli.config.as_deref())?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn ping_payload() -> Value {
    json!({ "ping": registrar_core::ping(), "version": registrar_core::core_version() })
}

fn run_with_store(command: Command, config_path: Option<&Path>) -> Result<Value> {
    let config = load_config(config_path)?;
    registrar_core::init_logging_from(&config.logging)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let conn = open_db_with(&config.database)
        .with_context(|| format!("failed to open database `{}`", config.database.path))?;
    let service = EnrollmentService::new(SqliteEnrollmentStore::new(&conn));
    info!("event=cli_command module=cli status=start command={command:?}");

    let output = match command {
        Command::Ping => ping_payload(),
        Command::Report => serde_json::to_value(service.report()?)?,
        Command::Admit {
            student,
            subject,
            period,
            enrolled_at,
        } => {
            let request = admission_request(student, subject, period, enrolled_at);
            serde_json::to_value(service.admit(&request)?)?
        }
        Command::Withdraw { enrollment } => serde_json::to_value(service.withdraw(enrollment)?)?,
        Command::List { student, period } => {
            serde_json::to_value(service.list_for_student_in_period(student, period)?)?
        }
    };
    Ok(output)
}

fn admission_request(
    student: Uuid,
    subject: Uuid,
    period: Uuid,
    enrolled_at: Option<i64>,
) -> AdmissionRequest {
    AdmissionRequest {
        enrolled_at,
        ..AdmissionRequest::new(student, subject, period)
    }
}

fn load_config(explicit: Option<&Path>) -> Result<RegistrarConfig> {
    if let Some(path) = explicit {
        return RegistrarConfig::from_file(path)
            .with_context(|| format!("failed to load config `{}`", path.display()));
    }
    match RegistrarConfig::from_default_location() {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound) => Ok(RegistrarConfig::default()),
        Err(err) => Err(err).context("failed to load default config"),
    }
}
