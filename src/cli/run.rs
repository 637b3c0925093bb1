//! Execute path lookups, filters, and transforms against JSON input

use super::CliError;
use crate::{Filter, Record, Transform, Value};

/// Options shared by the get, filter, and transform commands
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
}

/// The parsed input, either one record or a stream of them
enum Documents {
    Single(Record),
    Stream(Vec<Record>),
}

/// Parse the JSON input into records
///
/// A top-level object is a single record, a top-level array is a stream
/// of records. Anything else is wrapped under a "value" key.
fn parse_documents(options: &RunOptions) -> Result<Documents, CliError> {
    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;

    let json_value: serde_json::Value =
        serde_json::from_str(json_str).map_err(CliError::Json)?;

    Ok(match Value::from(json_value) {
        Value::List(items) => Documents::Stream(items.into_iter().map(wrap_record).collect()),
        other => Documents::Single(wrap_record(other)),
    })
}

fn wrap_record(value: Value) -> Record {
    match value {
        Value::Record(record) => record,
        other => {
            let mut record = Record::new();
            record.insert("value", other);
            record
        }
    }
}

fn parse_expression(expression: &str) -> Result<Value, CliError> {
    let json_value: serde_json::Value =
        serde_json::from_str(expression).map_err(CliError::Json)?;
    Ok(Value::from(json_value))
}

fn record_to_json(record: Record) -> serde_json::Value {
    serde_json::Value::from(Value::Record(record))
}

fn resolve(record: &Record, path: &str) -> serde_json::Value {
    serde_json::Value::from(record.get(path).unwrap_or(Value::Null))
}

/// Execute a get operation, resolving a path against the input
///
/// A single record resolves to the value at the path (null when the path
/// does not resolve); a stream resolves element-wise to an array.
pub fn execute_get(path: &str, options: &RunOptions) -> Result<serde_json::Value, CliError> {
    Ok(match parse_documents(options)? {
        Documents::Single(record) => resolve(&record, path),
        Documents::Stream(records) => serde_json::Value::Array(
            records.iter().map(|record| resolve(record, path)).collect(),
        ),
    })
}

/// Execute a filter operation against the input
///
/// A single record yields itself when it matches and null when it does
/// not; a stream yields the array of matching records.
pub fn execute_filter(
    expression: &str,
    options: &RunOptions,
) -> Result<serde_json::Value, CliError> {
    let filter = Filter::new(&parse_expression(expression)?).map_err(CliError::Expr)?;

    Ok(match parse_documents(options)? {
        Documents::Single(record) => {
            if filter.matches(&record).map_err(CliError::Filter)? {
                record_to_json(record)
            } else {
                serde_json::Value::Null
            }
        }
        Documents::Stream(records) => {
            let mut kept = Vec::new();
            for record in records {
                if filter.matches(&record).map_err(CliError::Filter)? {
                    kept.push(record_to_json(record));
                }
            }
            serde_json::Value::Array(kept)
        }
    })
}

/// Execute a transform operation against the input
///
/// Each input record is mapped to its transformed counterpart.
pub fn execute_transform(
    expression: &str,
    options: &RunOptions,
) -> Result<serde_json::Value, CliError> {
    let transform = Transform::new(&parse_expression(expression)?).map_err(CliError::Expr)?;

    Ok(match parse_documents(options)? {
        Documents::Single(record) => {
            record_to_json(transform.apply(&record).map_err(CliError::Transform)?)
        }
        Documents::Stream(records) => {
            let mut transformed = Vec::new();
            for record in records {
                transformed.push(record_to_json(
                    transform.apply(&record).map_err(CliError::Transform)?,
                ));
            }
            serde_json::Value::Array(transformed)
        }
    })
}
