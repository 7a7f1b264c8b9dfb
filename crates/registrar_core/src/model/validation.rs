//! Field normalization shared by model constructors and validators.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Quota pair violates `0 <= available <= total`.
    QuotaOutOfRange { total: i64, available: i64 },
    /// Period ends before it starts.
    InvalidDateRange { starts_at: i64, ends_at: i64 },
    /// Cycle ordinal must be positive.
    InvalidOrdinal(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
            Self::QuotaOutOfRange { total, available } => write!(
                f,
                "available quota {available} must be within 0..={total}"
            ),
            Self::InvalidDateRange { starts_at, ends_at } => write!(
                f,
                "period end {ends_at} is earlier than start {starts_at}"
            ),
            Self::InvalidOrdinal(value) => write!(f, "cycle ordinal must be positive, got {value}"),
        }
    }
}

impl Error for ValidationError {}

/// Trims a required text field, rejecting blank input.
pub fn normalize_required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

/// Trims and lowercases an email, rejecting malformed input.
pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_ascii_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail(value.trim().to_string()));
    }
    Ok(normalized)
}

/// Trims optional text, mapping blank input to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
