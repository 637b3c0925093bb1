//! Transform expressions that reshape one record into another.
//!
//! A transform is compiled once and then applied to any number of
//! records; each application reads the input record and builds a fresh
//! output record. Expressions are lists headed by an operator name:
//!
//! ```text
//! ["static", target, value]           write the literal value at target
//! ["copy", target, source]            write source's resolved value
//! ["fill", target, value]            write value only when the input has
//!                                     nothing at target, otherwise carry
//!                                     the input's value forward
//! ["split", target, splitter, source] split a string source (or take a
//!                                     list source as-is) and write each
//!                                     part, with `{}` in the target
//!                                     replaced by the 1-based index
//! ["combine", target, source...]      write the list of resolved sources
//! ["join", target, joiner, source]    join a list source into one string
//! ["join", target, joiner, source...] join several resolved sources
//! ["sequence", expr...]               thread each stage's output into
//!                                     the next stage's input
//! ["parallel", expr...]               apply every stage to the same
//!                                     input and merge the outputs
//! ```
//!
//! A top-level list of expressions is an implicit `parallel`. Source
//! paths follow the same notation as record access; target paths are
//! always dotted strings. The `custom` operator, which wraps a function,
//! exists only in the typed [`TransformOp`] form.

use std::sync::Arc;

use crate::error::Error;
use crate::expr::{self, ExprError};
use crate::record::{Record, RecordError, RecordItem};
use crate::value::Value;

/// Errors that can occur while applying a transform.
#[derive(Debug, Clone)]
pub enum TransformError {
    /// A string source was split with an empty splitter
    EmptySplitter,

    /// A target path could not be written
    Record(RecordError),
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::EmptySplitter => write!(f, "Cannot split on an empty splitter"),
            TransformError::Record(e) => write!(f, "Write error: {}", e),
        }
    }
}

impl std::error::Error for TransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransformError::Record(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordError> for TransformError {
    fn from(e: RecordError) -> Self {
        TransformError::Record(e)
    }
}

/// A caller-supplied transform step.
///
/// Wraps a shared function from input record to output value, so compiled
/// transforms stay cloneable.
#[derive(Clone)]
pub struct CustomFn(Arc<dyn Fn(&Record) -> Value + Send + Sync>);

impl CustomFn {
    pub fn new(func: impl Fn(&Record) -> Value + Send + Sync + 'static) -> Self {
        CustomFn(Arc::new(func))
    }

    fn call(&self, record: &Record) -> Value {
        (self.0)(record)
    }
}

impl std::fmt::Debug for CustomFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CustomFn")
    }
}

/// A transform expression node.
///
/// Built either by the literal parser in [`Transform::new`] or directly
/// in code. Source paths are pre-split segment lists; target paths stay
/// textual because `split` substitutes indices into them.
#[derive(Debug, Clone)]
pub enum TransformOp {
    Static { target: String, value: Value },
    Copy { target: String, source: Vec<String> },
    Fill { target: String, value: Value },
    Split { target: String, splitter: String, source: Vec<String> },
    Combine { target: String, sources: Vec<Vec<String>> },
    Join { target: String, joiner: String, sources: Vec<Vec<String>> },
    Sequence(Vec<TransformOp>),
    Parallel(Vec<TransformOp>),
    Custom { target: String, func: CustomFn },
}

impl TransformOp {
    /// Apply this node to a record, producing a fresh output record.
    pub fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        let mut result = Record::new();
        match self {
            TransformOp::Static { target, value } => {
                result.set(target, value.clone())?;
            }
            TransformOp::Copy { target, source } => {
                result.set(target, record.get_path(source).unwrap_or(Value::Null))?;
            }
            TransformOp::Fill { target, value } => match record.get(target) {
                Some(existing) if !existing.is_null() => result.set(target, existing)?,
                _ => result.set(target, value.clone())?,
            },
            TransformOp::Split { target, splitter, source } => {
                match record.get_path(source) {
                    Some(Value::String(s)) if !s.is_empty() => {
                        if splitter.is_empty() {
                            return Err(TransformError::EmptySplitter);
                        }
                        for (idx, part) in s.split(splitter.as_str()).enumerate() {
                            result.set(&indexed_target(target, idx), part.into())?;
                        }
                    }
                    Some(Value::List(items)) if !items.is_empty() => {
                        for (idx, element) in items.into_iter().enumerate() {
                            result.set(&indexed_target(target, idx), element)?;
                        }
                    }
                    // Missing or falsy source: no output.
                    _ => {}
                }
            }
            TransformOp::Combine { target, sources } => {
                let values = sources
                    .iter()
                    .map(|source| record.get_path(source).unwrap_or(Value::Null))
                    .collect();
                result.set(target, Value::List(values))?;
            }
            TransformOp::Join { target, joiner, sources } => {
                if let [source] = sources.as_slice() {
                    if let Some(value) = record.get_path(source)
                        && value.is_truthy()
                    {
                        let joined = match value {
                            Value::List(items) => items
                                .iter()
                                .map(Value::as_string)
                                .collect::<Vec<_>>()
                                .join(joiner),
                            other => other.as_string(),
                        };
                        result.set(target, Value::String(joined))?;
                    }
                } else {
                    let mut resolved = Vec::with_capacity(sources.len());
                    let mut complete = true;
                    for source in sources {
                        match record.get_path(source) {
                            Some(value) if value.is_truthy() => resolved.push(value.as_string()),
                            _ => {
                                complete = false;
                                break;
                            }
                        }
                    }
                    if complete {
                        result.set(target, Value::String(resolved.join(joiner)))?;
                    }
                }
            }
            TransformOp::Sequence(stages) => {
                if let Some((first, rest)) = stages.split_first() {
                    let mut current = first.apply(record)?;
                    for stage in rest {
                        current = stage.apply(&current)?;
                    }
                    result = current;
                }
            }
            TransformOp::Parallel(parts) => {
                for part in parts {
                    result.merge(part.apply(record)?);
                }
            }
            TransformOp::Custom { target, func } => {
                result.set(target, func.call(record))?;
            }
        }
        Ok(result)
    }
}

/// A compiled, reusable record rewriter.
///
/// # Examples
///
/// ```
/// use sylva::{Record, Transform, Value};
/// use serde_json::json;
///
/// let record = Record::try_from(json!({
///     "a": {"one": {"_text": "1"}},
///     "b": {"two": {"_text": "2"}},
/// })).unwrap();
///
/// let expr = Value::from(json!([
///     ["copy", "a", "a.one._text"],
///     ["copy", "b", "b.two._text"],
/// ]));
/// let transform = Transform::new(&expr).unwrap();
///
/// let output = transform.apply(&record).unwrap();
/// assert_eq!(output.get("a"), Some(Value::String("1".to_string())));
/// assert_eq!(output.get("b"), Some(Value::String("2".to_string())));
/// ```
#[derive(Debug, Clone)]
pub struct Transform {
    op: TransformOp,
}

impl Transform {
    /// Compile a transform from its expression literal.
    ///
    /// A top-level list whose first element is itself a list compiles to
    /// an implicit `parallel` over those expressions. Arities and
    /// operator names are checked here; a malformed expression never
    /// becomes a `Transform`.
    pub fn new(expr: &Value) -> Result<Self, ExprError> {
        let items = expr::expr_items(expr)?;
        let op = if matches!(items[0], Value::List(_)) {
            TransformOp::Parallel(
                items
                    .iter()
                    .map(parse_transform)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        } else {
            parse_transform(expr)?
        };
        Ok(Transform { op })
    }

    /// The compiled expression tree.
    pub fn op(&self) -> &TransformOp {
        &self.op
    }

    /// Apply the transform to a record, producing a fresh output record.
    ///
    /// The input record is never mutated. Missing sources follow the
    /// per-operator no-write rules; only structural write failures and
    /// empty-splitter splits error.
    pub fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        self.op.apply(record)
    }
}

impl From<TransformOp> for Transform {
    fn from(op: TransformOp) -> Self {
        Transform { op }
    }
}

// ============================================================================
// Literal parsing
// ============================================================================

fn parse_transform(expr: &Value) -> Result<TransformOp, ExprError> {
    let items = expr::expr_items(expr)?;
    let op = expr::operator(items)?;
    let args = &items[1..];

    match op {
        "static" | "fill" => {
            if args.len() != 2 {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "2 arguments (target, value)",
                    found: args.len(),
                });
            }
            let target = expr::string_item(&args[0], "target", op)?;
            let value = args[1].clone();
            Ok(if op == "static" {
                TransformOp::Static { target, value }
            } else {
                TransformOp::Fill { target, value }
            })
        }
        "copy" => {
            if args.len() != 2 {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "2 arguments (target, source)",
                    found: args.len(),
                });
            }
            Ok(TransformOp::Copy {
                target: expr::string_item(&args[0], "target", op)?,
                source: expr::path_item(&args[1], op)?,
            })
        }
        "split" => {
            if args.len() != 3 {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "3 arguments (target, splitter, source)",
                    found: args.len(),
                });
            }
            Ok(TransformOp::Split {
                target: expr::string_item(&args[0], "target", op)?,
                splitter: expr::string_item(&args[1], "splitter", op)?,
                source: expr::path_item(&args[2], op)?,
            })
        }
        "combine" => {
            if args.len() < 2 {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "at least 2 arguments (target, source...)",
                    found: args.len(),
                });
            }
            Ok(TransformOp::Combine {
                target: expr::string_item(&args[0], "target", op)?,
                sources: args[1..]
                    .iter()
                    .map(|source| expr::path_item(source, op))
                    .collect::<Result<Vec<_>, _>>()?,
            })
        }
        "join" => {
            if args.len() < 3 {
                return Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "at least 3 arguments (target, joiner, source...)",
                    found: args.len(),
                });
            }
            Ok(TransformOp::Join {
                target: expr::string_item(&args[0], "target", op)?,
                joiner: expr::string_item(&args[1], "joiner", op)?,
                sources: args[2..]
                    .iter()
                    .map(|source| expr::path_item(source, op))
                    .collect::<Result<Vec<_>, _>>()?,
            })
        }
        "sequence" => Ok(TransformOp::Sequence(
            args.iter()
                .map(parse_transform)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        "parallel" => Ok(TransformOp::Parallel(
            args.iter()
                .map(parse_transform)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        "custom" => Err(ExprError::Malformed(
            "the 'custom' operator holds a function and has no literal form".to_string(),
        )),
        _ => Err(ExprError::UnknownOperator(op.to_string())),
    }
}

/// Substitute the 1-based part index into a `{}` target template.
fn indexed_target(target: &str, idx: usize) -> String {
    target.replace("{}", &(idx + 1).to_string())
}

// ============================================================================
// Transforming record stream
// ============================================================================

/// A record stream applying a transform to every source record.
///
/// One output record per source record, in order; the stream never skips
/// or merges. Like [`FilteredRecords`](crate::filter::FilteredRecords),
/// the container restarts cleanly: iterating `&stream` starts a fresh
/// pass when the source supports it, `into_iter` consumes the source.
#[derive(Debug, Clone)]
pub struct TransformedRecords<S> {
    source: S,
    transform: Transform,
}

impl<S> TransformedRecords<S> {
    pub fn new(source: S, transform: Transform) -> Self {
        TransformedRecords { source, transform }
    }
}

impl<S> IntoIterator for TransformedRecords<S>
where
    S: IntoIterator,
    S::Item: RecordItem,
{
    type Item = Result<Record, Error>;
    type IntoIter = TransformedIter<S::IntoIter>;

    fn into_iter(self) -> Self::IntoIter {
        TransformedIter {
            source: self.source.into_iter(),
            transform: self.transform,
        }
    }
}

impl<'a, S> IntoIterator for &'a TransformedRecords<S>
where
    &'a S: IntoIterator,
    <&'a S as IntoIterator>::Item: RecordItem,
{
    type Item = Result<Record, Error>;
    type IntoIter = TransformedIter<<&'a S as IntoIterator>::IntoIter>;

    fn into_iter(self) -> Self::IntoIter {
        TransformedIter {
            source: (&self.source).into_iter(),
            transform: self.transform.clone(),
        }
    }
}

/// One pass over a transformed record stream.
pub struct TransformedIter<I> {
    source: I,
    transform: Transform,
}

impl<I> Iterator for TransformedIter<I>
where
    I: Iterator,
    I::Item: RecordItem,
{
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.source.next()?.into_record() {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        Some(self.transform.apply(&record).map_err(Error::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}
