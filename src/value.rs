use crate::record::Record;

/// A value stored inside a record tree.
///
/// This type represents all shapes a record field can take, with a
/// distinction between integers and floats (unlike standard JSON which
/// only has "number"). Mappings are always [`Record`]s: the conversions
/// from `serde_json::Value` coerce raw JSON objects recursively, at every
/// nesting level, including objects found inside arrays.
///
/// # Examples
///
/// ```
/// use sylva::Value;
///
/// // Scalar values
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let float = Value::Float(3.14);
/// let string = Value::String("hello".to_string());
///
/// // Sequences
/// let list = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
/// assert!(list.is_truthy());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Sequence of values (homogeneous or heterogeneous)
    List(Vec<Value>),

    /// Nested record with ordered string keys
    Record(Record),
}

impl Value {
    /// Check if the value is truthy (for no-write guards)
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n > 0.0,
            Integer(n) => *n > 0,
            String(s) => !s.is_empty(),
            List(items) => !items.is_empty(),
            Record(rec) => !rec.is_empty(),
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as string (used when joining and rendering scalar output)
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            _ => serde_json::Value::from(self.clone()).to_string(),
        }
    }

    /// Returns a human-readable type name for a Value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }
}

// ============================================================================
// JSON conversions
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::List(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Record(
                obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Record(rec) => serde_json::Value::Object(
                rec.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// Literal conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(rec: Record) -> Self {
        Value::Record(rec)
    }
}
