pub mod error;
pub mod expr;
pub mod filter;
pub mod path;
pub mod reader;
pub mod record;
pub mod transform;
pub mod util;
pub mod value;
pub mod writer;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::Error;
pub use expr::ExprError;
pub use filter::{Filter, FilterError, FilterOp, FilteredRecords, Operand};
pub use reader::{CsvReader, JsonReader, XmlReader};
pub use record::{Record, RecordError, RecordItem};
pub use transform::{CustomFn, Transform, TransformError, TransformOp, TransformedRecords};
pub use value::Value;
pub use writer::{CsvWriter, ExtrasAction, JsonWriter, XmlWriter};
