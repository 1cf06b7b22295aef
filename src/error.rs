//! Error types.
//!
//! `LoadError` is the typed outcome of one pipeline load; callers match on the
//! kind. `AppError` adds the binary's own failures and maps everything onto a
//! process exit code.

use std::fmt;

use thiserror::Error;

use crate::domain::Field;

/// Underlying cause of a `SourceUnavailable` failure.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("server answered with status {status}")]
    Status { status: u16 },

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("source has no header row")]
    MissingHeader,

    /// The body is a web page (typically a sign-in screen), not CSV.
    #[error("expected CSV, got {found}")]
    NotCsv { found: String },
}

/// A requirement the column normalizer could not satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRequirement {
    Field(Field),
    /// None of the numeric metric columns resolved.
    AnyMetric,
}

impl fmt::Display for MissingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingRequirement::Field(field) => write!(f, "`{field}`"),
            MissingRequirement::AnyMetric => f.write_str("at least one metric column"),
        }
    }
}

/// Terminal failure of one load attempt.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source unavailable ({source_desc}): {cause}")]
    SourceUnavailable {
        source_desc: String,
        #[source]
        cause: SourceError,
    },

    #[error("schema mismatch: missing {}", join_missing(.missing))]
    SchemaMismatch { missing: Vec<MissingRequirement> },

    #[error("no valid rows: every row has an empty date cell")]
    EmptySeries,
}

impl LoadError {
    pub fn exit_code(&self) -> u8 {
        match self {
            LoadError::SourceUnavailable { .. } => 4,
            LoadError::SchemaMismatch { .. } => 2,
            LoadError::EmptySeries => 3,
        }
    }

    /// Short user-facing hint for the front-end.
    pub fn hint(&self) -> &'static str {
        match self {
            LoadError::SourceUnavailable { .. } => {
                "Could not reach the spreadsheet. Check the link and its sharing permissions, then reload."
            }
            LoadError::SchemaMismatch { .. } => {
                "The spreadsheet is missing required columns. Check the header row or the alias table."
            }
            LoadError::EmptySeries => {
                "The spreadsheet has data, but no row has a usable date. Check the date column."
            }
        }
    }
}

fn join_missing(missing: &[MissingRequirement]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level error for the `health` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid configuration `{key}`: {message}")]
    Config { key: String, message: String },

    #[error("{message}")]
    Output { message: String },
}

impl AppError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        AppError::Output {
            message: message.into(),
        }
    }

    pub fn is_load(&self) -> bool {
        matches!(self, AppError::Load(_))
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Load(err) => err.exit_code(),
            AppError::Config { .. } | AppError::Output { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_lists_every_requirement() {
        let err = LoadError::SchemaMismatch {
            missing: vec![MissingRequirement::Field(Field::Date), MissingRequirement::AnyMetric],
        };
        assert_eq!(
            err.to_string(),
            "schema mismatch: missing `date`, at least one metric column"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let unavailable = LoadError::SourceUnavailable {
            source_desc: "demo".to_string(),
            cause: SourceError::Status { status: 404 },
        };
        assert_eq!(unavailable.exit_code(), 4);
        assert_eq!(LoadError::EmptySeries.exit_code(), 3);
        assert_eq!(AppError::from(LoadError::EmptySeries).exit_code(), 3);
        assert_eq!(AppError::config("HEALTH_CACHE_TTL_SECS", "bad").exit_code(), 2);
    }

    #[test]
    fn not_csv_is_source_unavailable() {
        let err = LoadError::SourceUnavailable {
            source_desc: "https://example.test/sheet".to_string(),
            cause: SourceError::NotCsv {
                found: "text/html".to_string(),
            },
        };
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("expected CSV, got text/html"));
        assert!(AppError::from(err).is_load());
        assert!(!AppError::output("disk full").is_load());
    }

    #[test]
    fn source_unavailable_keeps_cause() {
        let err = LoadError::SourceUnavailable {
            source_desc: "https://example.test/sheet".to_string(),
            cause: SourceError::Status { status: 404 },
        };
        assert!(err.to_string().contains("status 404"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
