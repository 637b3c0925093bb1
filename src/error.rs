//! Crate-level error type aggregating the per-module errors.

use std::io;

use crate::expr::ExprError;
use crate::filter::FilterError;
use crate::record::RecordError;
use crate::transform::TransformError;

/// Any error the library can produce.
///
/// The computation core reports through its own enums; this type adds the
/// I/O conditions of the readers, writers, and utilities, and is what
/// record streams yield alongside records.
#[derive(Debug)]
pub enum Error {
    /// Record access or mutation error
    Record(RecordError),
    /// Expression literal rejected at construction
    Expr(ExprError),
    /// Filter evaluation error
    Filter(FilterError),
    /// Transform application error
    Transform(TransformError),
    /// IO error
    Io(io::Error),
    /// JSON parsing or serialization error
    Json(serde_json::Error),
    /// CSV parsing or writing error
    Csv(csv::Error),
    /// XML parsing or writing error
    Xml(quick_xml::Error),
    /// An identifier-derived directory structure needs a non-empty identifier
    EmptyIdentifier,
    /// A record key fell outside the configured CSV columns
    ExtraColumn(String),
    /// An XML document had no root element
    EmptyDocument,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Record(e) => write!(f, "Record error: {}", e),
            Error::Expr(e) => write!(f, "Expression error: {}", e),
            Error::Filter(e) => write!(f, "Filter error: {}", e),
            Error::Transform(e) => write!(f, "Transform error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Json(e) => write!(f, "Invalid JSON: {}", e),
            Error::Csv(e) => write!(f, "CSV error: {}", e),
            Error::Xml(e) => write!(f, "Invalid XML: {}", e),
            Error::EmptyIdentifier => {
                write!(f, "Cannot derive a directory structure from an empty identifier")
            }
            Error::ExtraColumn(key) => {
                write!(f, "Record key '{}' is not in the CSV columns", key)
            }
            Error::EmptyDocument => write!(f, "Document contains no root element"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Record(e) => Some(e),
            Error::Expr(e) => Some(e),
            Error::Filter(e) => Some(e),
            Error::Transform(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Csv(e) => Some(e),
            Error::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordError> for Error {
    fn from(e: RecordError) -> Self {
        Error::Record(e)
    }
}

impl From<ExprError> for Error {
    fn from(e: ExprError) -> Self {
        Error::Expr(e)
    }
}

impl From<FilterError> for Error {
    fn from(e: FilterError) -> Self {
        Error::Filter(e)
    }
}

impl From<TransformError> for Error {
    fn from(e: TransformError) -> Self {
        Error::Transform(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Xml(e)
    }
}
