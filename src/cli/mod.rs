//! CLI support for sylva
//!
//! Provides programmatic access to sylva CLI functionality for embedding
//! in other tools.

mod run;

pub use run::{execute_filter, execute_get, execute_transform, RunOptions};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Expression error
    Expr(crate::ExprError),
    /// Filter evaluation error
    Filter(crate::FilterError),
    /// Transform application error
    Transform(crate::TransformError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Expr(e) => write!(f, "Expression error: {}", e),
            CliError::Filter(e) => write!(f, "Filter error: {}", e),
            CliError::Transform(e) => write!(f, "Transform error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Use --input or pipe JSON to stdin."),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Expr(e) => Some(e),
            CliError::Filter(e) => Some(e),
            CliError::Transform(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<crate::ExprError> for CliError {
    fn from(e: crate::ExprError) -> Self {
        CliError::Expr(e)
    }
}

impl From<crate::FilterError> for CliError {
    fn from(e: crate::FilterError) -> Self {
        CliError::Filter(e)
    }
}

impl From<crate::TransformError> for CliError {
    fn from(e: crate::TransformError) -> Self {
        CliError::Transform(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
