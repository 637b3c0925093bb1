//! Boolean filter expressions evaluated against records.
//!
//! A filter is compiled once from an expression literal and then applied
//! to any number of records. Expressions are lists headed by an operator
//! name:
//!
//! ```text
//! ["eq", operand, operand]        equal
//! ["neq", operand, operand]       not equal
//! ["gt" | "gte" | "lt" | "lte", operand, operand]
//!                                 ordered comparison
//! ["contains", operand, operand]  second resolved value is a member of
//!                                 the first (sequence element, substring,
//!                                 or record key)
//! ["exists", operand]             resolved value is present and not null
//! ["not", expr?]                  negation; vacuously true with no args
//! ["and", expr...]                short-circuiting conjunction
//! ["or", expr...]                 short-circuiting disjunction
//! ["true"] / ["false"]            constants
//! ```
//!
//! An operand is resolved against the record only if it is a pre-split
//! segment list, or a string containing `.` or both `[` and `]`; any
//! other value is a literal constant. An unrecognized operator never
//! matches; it is not an error.

use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive};

use crate::error::Error;
use crate::expr::{self, ExprError};
use crate::path;
use crate::record::{Record, RecordItem};
use crate::value::Value;

/// Errors that can occur during filter evaluation.
#[derive(Debug, Clone)]
pub enum FilterError {
    /// Ordered comparison between types with no defined order
    Incomparable { left: &'static str, right: &'static str },
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Incomparable { left, right } => {
                write!(f, "Cannot compare {} with {}", left, right)
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// One side of a comparison, classified at construction.
///
/// The literal parser applies the path heuristic once: segment lists and
/// strings containing path characters become `Path`, everything else
/// becomes `Literal`. Callers who need a literal string that contains a
/// dot (for example `"3.14"` as text) build this variant directly.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Resolved against the record at evaluation time
    Path(Vec<String>),

    /// Used as-is
    Literal(Value),
}

impl Operand {
    fn resolve(&self, record: &Record) -> Value {
        match self {
            Operand::Path(segments) => record.get_path(segments).unwrap_or(Value::Null),
            Operand::Literal(value) => value.clone(),
        }
    }
}

/// A filter expression node.
///
/// Built either by the literal parser in [`Filter::new`] or directly in
/// code. `Unknown` holds an unrecognized operator name and never matches.
#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(Operand, Operand),
    Neq(Operand, Operand),
    Gt(Operand, Operand),
    Gte(Operand, Operand),
    Lt(Operand, Operand),
    Lte(Operand, Operand),
    Contains(Operand, Operand),
    Exists(Operand),
    Not(Box<FilterOp>),
    And(Vec<FilterOp>),
    Or(Vec<FilterOp>),
    True,
    False,
    Unknown(String),
}

impl FilterOp {
    /// Evaluate this node against a record.
    pub fn matches(&self, record: &Record) -> Result<bool, FilterError> {
        match self {
            FilterOp::Eq(a, b) => Ok(values_equal(&a.resolve(record), &b.resolve(record))),
            FilterOp::Neq(a, b) => Ok(!values_equal(&a.resolve(record), &b.resolve(record))),
            FilterOp::Gt(a, b) => Ok(ordering(&a.resolve(record), &b.resolve(record))?.is_gt()),
            FilterOp::Gte(a, b) => Ok(ordering(&a.resolve(record), &b.resolve(record))?.is_ge()),
            FilterOp::Lt(a, b) => Ok(ordering(&a.resolve(record), &b.resolve(record))?.is_lt()),
            FilterOp::Lte(a, b) => Ok(ordering(&a.resolve(record), &b.resolve(record))?.is_le()),
            FilterOp::Contains(a, b) => {
                Ok(contains_value(&a.resolve(record), &b.resolve(record)))
            }
            FilterOp::Exists(a) => Ok(!a.resolve(record).is_null()),
            FilterOp::Not(inner) => Ok(!inner.matches(record)?),
            FilterOp::And(parts) => {
                for part in parts {
                    if !part.matches(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            FilterOp::Or(parts) => {
                // Vacuously true with no parts, like `and` and `not`.
                if parts.is_empty() {
                    return Ok(true);
                }
                for part in parts {
                    if part.matches(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            FilterOp::True => Ok(true),
            FilterOp::False => Ok(false),
            FilterOp::Unknown(_) => Ok(false),
        }
    }
}

/// A compiled, reusable record predicate.
///
/// # Examples
///
/// ```
/// use sylva::{Filter, Record, Value};
/// use serde_json::json;
///
/// let record = Record::try_from(json!({"a": {"one": "1"}})).unwrap();
///
/// let expr = Value::from(json!(["eq", "a.one", "1"]));
/// let filter = Filter::new(&expr).unwrap();
/// assert!(filter.matches(&record).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Filter {
    op: FilterOp,
}

impl Filter {
    /// Compile a filter from its expression literal.
    ///
    /// Arities are checked here; a malformed expression never becomes a
    /// `Filter`. Unrecognized operator names are accepted and compile to
    /// an always-false node.
    pub fn new(expr: &Value) -> Result<Self, ExprError> {
        Ok(Filter {
            op: parse_filter(expr)?,
        })
    }

    /// The compiled expression tree.
    pub fn op(&self) -> &FilterOp {
        &self.op
    }

    /// Apply the filter to a record.
    ///
    /// Only ordered comparison of unordered types errors; every other
    /// condition resolves to a boolean.
    pub fn matches(&self, record: &Record) -> Result<bool, FilterError> {
        self.op.matches(record)
    }
}

impl From<FilterOp> for Filter {
    fn from(op: FilterOp) -> Self {
        Filter { op }
    }
}

// ============================================================================
// Literal parsing
// ============================================================================

fn parse_filter(expr: &Value) -> Result<FilterOp, ExprError> {
    let items = expr::expr_items(expr)?;
    let op = expr::operator(items)?;
    let args = &items[1..];

    match op {
        "eq" | "neq" | "gt" | "gte" | "lt" | "lte" | "contains" => {
            if args.len() != 2 {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "2 operands",
                    found: args.len(),
                });
            }
            let left = classify(&args[0], op)?;
            let right = classify(&args[1], op)?;
            Ok(match op {
                "eq" => FilterOp::Eq(left, right),
                "neq" => FilterOp::Neq(left, right),
                "gt" => FilterOp::Gt(left, right),
                "gte" => FilterOp::Gte(left, right),
                "lt" => FilterOp::Lt(left, right),
                "lte" => FilterOp::Lte(left, right),
                _ => FilterOp::Contains(left, right),
            })
        }
        "exists" => {
            if args.len() != 1 {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "1 operand",
                    found: args.len(),
                });
            }
            Ok(FilterOp::Exists(classify(&args[0], op)?))
        }
        "not" => match args {
            [] => Ok(FilterOp::True),
            [inner] => Ok(FilterOp::Not(Box::new(parse_filter(inner)?))),
            _ => Err(ExprError::Arity {
                op: op.to_string(),
                expected: "at most 1 nested expression",
                found: args.len(),
            }),
        },
        "and" => {
            let mut parts = args.iter().map(parse_filter).collect::<Result<Vec<_>, _>>()?;
            if parts.len() == 1 {
                return Ok(parts.remove(0));
            }
            Ok(FilterOp::And(parts))
        }
        "or" => {
            let mut parts = args.iter().map(parse_filter).collect::<Result<Vec<_>, _>>()?;
            if parts.len() == 1 {
                return Ok(parts.remove(0));
            }
            Ok(FilterOp::Or(parts))
        }
        "true" | "false" => {
            if !args.is_empty() {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "no arguments",
                    found: args.len(),
                });
            }
            Ok(if op == "true" { FilterOp::True } else { FilterOp::False })
        }
        _ => Ok(FilterOp::Unknown(op.to_string())),
    }
}

/// Apply the operand heuristic: segment lists are always paths, strings
/// are paths only when they contain `.` or both `[` and `]`.
fn classify(value: &Value, op: &str) -> Result<Operand, ExprError> {
    match value {
        Value::List(_) => Ok(Operand::Path(expr::path_item(value, op)?)),
        Value::String(s) if s.contains('.') || (s.contains('[') && s.contains(']')) => {
            Ok(Operand::Path(path::split(s)))
        }
        other => Ok(Operand::Literal(other.clone())),
    }
}

// ============================================================================
// Comparison semantics
// ============================================================================

/// Equality across the value universe.
///
/// Integers and floats compare numerically; any other cross-type pair is
/// unequal rather than an error. Sequences compare element-wise, records
/// key-wise regardless of key order.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Float(y)) | (Value::Float(y), Value::Integer(x)) => {
            numeric_ordering(*x, *y) == Some(Ordering::Equal)
        }
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Record(x), Value::Record(y)) => records_equal(x, y),
        _ => a == b,
    }
}

fn records_equal(a: &Record, b: &Record) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.get_key(key).is_some_and(|other| values_equal(value, other)))
}

/// Ordering across the value universe, where one is defined.
///
/// Numbers order against numbers (exactly, via `Decimal`), strings
/// against strings, booleans against booleans, and sequences
/// lexicographically. Everything else is a [`FilterError`].
fn ordering(a: &Value, b: &Value) -> Result<Ordering, FilterError> {
    if let (Value::List(xs), Value::List(ys)) = (a, b) {
        for (x, y) in xs.iter().zip(ys.iter()) {
            match ordering(x, y)? {
                Ordering::Equal => {}
                unequal => return Ok(unequal),
            }
        }
        return Ok(xs.len().cmp(&ys.len()));
    }

    let ord = match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Integer(x), Value::Float(y)) => numeric_ordering(*x, *y),
        (Value::Float(x), Value::Integer(y)) => numeric_ordering(*y, *x).map(Ordering::reverse),
        (Value::String(x), Value::String(y)) => x.partial_cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.partial_cmp(y),
        _ => None,
    };
    ord.ok_or(FilterError::Incomparable {
        left: a.type_name(),
        right: b.type_name(),
    })
}

fn numeric_ordering(i: i64, f: f64) -> Option<Ordering> {
    if let Some(id) = Decimal::from_i64(i)
        && let Some(fd) = Decimal::from_f64(f)
    {
        return id.partial_cmp(&fd);
    }
    (i as f64).partial_cmp(&f)
}

fn contains_value(container: &Value, needle: &Value) -> bool {
    match container {
        Value::List(items) => items.iter().any(|item| values_equal(item, needle)),
        Value::String(s) => match needle {
            Value::String(sub) => s.contains(sub.as_str()),
            _ => false,
        },
        Value::Record(rec) => match needle {
            Value::String(key) => rec.contains_key(key),
            _ => false,
        },
        _ => false,
    }
}

// ============================================================================
// Filtering record stream
// ============================================================================

/// A record stream yielding only the records a filter matches.
///
/// The container is restartable: iterating `&stream` starts a fresh pass
/// whenever the underlying source supports repeated iteration, while
/// `into_iter` consumes the source for a single pass. Skipping happens
/// lazily, one source record at a time.
#[derive(Debug, Clone)]
pub struct FilteredRecords<S> {
    source: S,
    filter: Filter,
}

impl<S> FilteredRecords<S> {
    pub fn new(source: S, filter: Filter) -> Self {
        FilteredRecords { source, filter }
    }
}

impl<S> IntoIterator for FilteredRecords<S>
where
    S: IntoIterator,
    S::Item: RecordItem,
{
    type Item = Result<Record, Error>;
    type IntoIter = FilteredIter<S::IntoIter>;

    fn into_iter(self) -> Self::IntoIter {
        FilteredIter {
            source: self.source.into_iter(),
            filter: self.filter,
        }
    }
}

impl<'a, S> IntoIterator for &'a FilteredRecords<S>
where
    &'a S: IntoIterator,
    <&'a S as IntoIterator>::Item: RecordItem,
{
    type Item = Result<Record, Error>;
    type IntoIter = FilteredIter<<&'a S as IntoIterator>::IntoIter>;

    fn into_iter(self) -> Self::IntoIter {
        FilteredIter {
            source: (&self.source).into_iter(),
            filter: self.filter.clone(),
        }
    }
}

/// One pass over a filtered record stream.
pub struct FilteredIter<I> {
    source: I,
    filter: Filter,
}

impl<I> Iterator for FilteredIter<I>
where
    I: Iterator,
    I::Item: RecordItem,
{
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.source.next()?.into_record() {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            match self.filter.matches(&record) {
                Ok(true) => return Some(Ok(record)),
                Ok(false) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
