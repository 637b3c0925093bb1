//! Shared plumbing for the expression literal form.
//!
//! Filter and transform expressions arrive as [`Value`] trees, in practice
//! built from JSON arrays such as `["eq", "header.setSpec._text", "X"]`.
//! This module holds the construction-time error type and the helpers that
//! pull operators, strings, and paths out of those literals. Malformed
//! shapes are rejected here, once, so compiled expressions never re-check
//! their own structure during evaluation.

use crate::path;
use crate::value::Value;

/// Errors raised while compiling an expression literal.
#[derive(Debug, Clone)]
pub enum ExprError {
    /// The expression list had no elements
    Empty,

    /// An operator was given the wrong number of arguments
    Arity {
        op: String,
        expected: &'static str,
        found: usize,
    },

    /// A transform operator name that the engine does not define
    UnknownOperator(String),

    /// Any other structural problem with the literal
    Malformed(String),
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::Empty => write!(f, "Empty expression"),
            ExprError::Arity { op, expected, found } => {
                write!(f, "The '{}' operator takes {}, found {}", op, expected, found)
            }
            ExprError::UnknownOperator(op) => {
                write!(f, "Unknown transform operator: '{}'", op)
            }
            ExprError::Malformed(msg) => write!(f, "Malformed expression: {}", msg),
        }
    }
}

impl std::error::Error for ExprError {}

/// View an expression literal as its element list.
pub(crate) fn expr_items(value: &Value) -> Result<&[Value], ExprError> {
    match value {
        Value::List(items) if items.is_empty() => Err(ExprError::Empty),
        Value::List(items) => Ok(items),
        other => Err(ExprError::Malformed(format!(
            "expected an expression list, found {}",
            other.type_name()
        ))),
    }
}

/// The operator name heading an expression list.
pub(crate) fn operator(items: &[Value]) -> Result<&str, ExprError> {
    match &items[0] {
        Value::String(op) => Ok(op),
        other => Err(ExprError::Malformed(format!(
            "expected an operator name, found {}",
            other.type_name()
        ))),
    }
}

/// Extract a required string argument (target paths, joiners, splitters).
pub(crate) fn string_item(value: &Value, what: &str, op: &str) -> Result<String, ExprError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ExprError::Malformed(format!(
            "the {} of '{}' must be a string, found {}",
            what,
            op,
            other.type_name()
        ))),
    }
}

/// Extract a read path: a dotted string or a pre-split segment list.
///
/// Integer segments in the list form are accepted and stringified, so
/// `["a", 0]` addresses the same location as `"a.0"`.
pub(crate) fn path_item(value: &Value, op: &str) -> Result<Vec<String>, ExprError> {
    match value {
        Value::String(s) => Ok(path::split(s)),
        Value::List(segments) => segments
            .iter()
            .map(|segment| match segment {
                Value::String(s) => Ok(s.clone()),
                Value::Integer(n) => Ok(n.to_string()),
                other => Err(ExprError::Malformed(format!(
                    "path segments for '{}' must be strings, found {}",
                    op,
                    other.type_name()
                ))),
            })
            .collect(),
        other => Err(ExprError::Malformed(format!(
            "the source of '{}' must be a path string or segment list, found {}",
            op,
            other.type_name()
        ))),
    }
}
