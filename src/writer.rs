//! Writers that serialise record streams to the local filesystem.
//!
//! The JSON and XML writers store one file per record, placed by the
//! record's identifier so large collections spread over nested
//! directories. The CSV writer flattens a stream into one headered file.
//! All writers accept anything a stream adapter yields, including the
//! `Result` items of readers.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use regex::Regex;

use crate::error::Error;
use crate::path;
use crate::record::{Record, RecordItem};
use crate::util::identifier_to_directory_structure;
use crate::value::Value;

/// Writes each record to its own JSON file.
///
/// The record's identifier, resolved at `id_path`, determines the file
/// location: [`identifier_to_directory_structure`] supplies the
/// directories under the base, and the identifier's local part names the
/// file. Records with a missing or falsy identifier are skipped.
#[derive(Debug, Clone)]
pub struct JsonWriter {
    directory: PathBuf,
    id_path: Vec<String>,
}

impl JsonWriter {
    pub fn new(directory: impl Into<PathBuf>, id_path: &str) -> Self {
        JsonWriter {
            directory: directory.into(),
            id_path: path::split(id_path),
        }
    }

    /// Write the records, one compact JSON document per file.
    pub fn write<I>(&self, records: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: RecordItem,
    {
        for item in records {
            let record = item.into_record()?;
            let Some(target) = record_file(&self.directory, &self.id_path, &record, "json")?
            else {
                continue;
            };
            let document = serde_json::Value::from(Value::Record(record));
            fs::write(target, serde_json::to_string(&document)?)?;
        }
        Ok(())
    }
}

/// Writes each record to its own XML file.
///
/// File placement follows [`JsonWriter`]. Each record is wrapped in a
/// `<record>` element; keys become sanitized tags, sequences repeat
/// their tag once per element, and scalars become element text.
#[derive(Debug, Clone)]
pub struct XmlWriter {
    directory: PathBuf,
    id_path: Vec<String>,
}

impl XmlWriter {
    pub fn new(directory: impl Into<PathBuf>, id_path: &str) -> Self {
        XmlWriter {
            directory: directory.into(),
            id_path: path::split(id_path),
        }
    }

    /// Write the records, one XML document per file.
    pub fn write<I>(&self, records: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: RecordItem,
    {
        for item in records {
            let record = item.into_record()?;
            let Some(target) = record_file(&self.directory, &self.id_path, &record, "xml")?
            else {
                continue;
            };
            fs::write(target, render_xml(&record)?)?;
        }
        Ok(())
    }
}

/// Resolve a record's output file, creating the directory chain.
///
/// `None` when the record carries no usable identifier.
fn record_file(
    directory: &Path,
    id_path: &[String],
    record: &Record,
    extension: &str,
) -> Result<Option<PathBuf>, Error> {
    let Some(identifier) = record.get_path(id_path) else {
        return Ok(None);
    };
    if !identifier.is_truthy() {
        return Ok(None);
    }
    let identifier = identifier.as_string();
    let mut target = directory.to_path_buf();
    for part in identifier_to_directory_structure(&identifier)? {
        target.push(part);
    }
    fs::create_dir_all(&target)?;
    let stem = identifier.rsplit(':').next().unwrap_or(identifier.as_str());
    target.push(format!("{}.{}", stem, extension));
    Ok(Some(target))
}

// ============================================================================
// XML rendering
// ============================================================================

fn render_xml(record: &Record) -> Result<Vec<u8>, Error> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(BytesStart::new("record")))?;
    write_children(&mut writer, record)?;
    writer.write_event(Event::End(BytesEnd::new("record")))?;
    Ok(writer.into_inner())
}

fn write_children<W: std::io::Write>(
    writer: &mut Writer<W>,
    record: &Record,
) -> Result<(), Error> {
    for (key, value) in record {
        write_element(writer, key, value)?;
    }
    Ok(())
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    key: &str,
    value: &Value,
) -> Result<(), Error> {
    match value {
        Value::List(items) => {
            for element in items {
                write_element(writer, key, element)?;
            }
        }
        Value::Record(rec) => {
            let tag = element_tag(key);
            writer.write_event(Event::Start(BytesStart::new(tag.as_str())))?;
            write_children(writer, rec)?;
            writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        }
        scalar => {
            let tag = element_tag(key);
            let text = scalar.as_string();
            writer.write_event(Event::Start(BytesStart::new(tag.as_str())))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        }
    }
    Ok(())
}

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static TAG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\-.]").expect("valid regex"));

/// Turn a record key into a valid XML tag.
///
/// Whitespace runs become hyphens, anything outside word characters,
/// hyphens, and dots is removed, and leading characters are stripped
/// until the tag starts with a non-digit word character. A leading `xml`
/// (a reserved prefix) is dropped. A key with nothing usable left falls
/// back to `_`.
fn element_tag(key: &str) -> String {
    let hyphenated = WHITESPACE.replace_all(key, "-");
    let mut tag: String = TAG_CHARS
        .find_iter(&hyphenated)
        .map(|m| m.as_str())
        .collect();
    while tag
        .chars()
        .next()
        .is_some_and(|c| c.is_numeric() || !(c.is_alphanumeric() || c == '_'))
    {
        tag.remove(0);
    }
    if tag.to_lowercase().starts_with("xml") {
        tag = tag[3..].to_string();
    }
    if tag.is_empty() {
        tag.push('_');
    }
    tag
}

// ============================================================================
// CSV writer
// ============================================================================

/// What to do with record keys outside the configured CSV columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtrasAction {
    /// Drop the extra values silently
    #[default]
    Ignore,
    /// Fail the write
    Error,
}

/// Writes a record stream into one CSV file, a row per record.
///
/// Assumes flat records; nested values are rendered through their string
/// conversion. Columns come from an explicit list or, by default, the
/// first record's keys. Missing values take a configurable default.
#[derive(Debug, Clone)]
pub struct CsvWriter {
    path: PathBuf,
    columns: Option<Vec<String>>,
    default_value: String,
    extras_action: ExtrasAction,
}

impl CsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvWriter {
            path: path.into(),
            columns: None,
            default_value: String::new(),
            extras_action: ExtrasAction::Ignore,
        }
    }

    /// Use these column names instead of the first record's keys.
    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// The value written when a record misses a column. Defaults to the
    /// empty string.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn extras_action(mut self, action: ExtrasAction) -> Self {
        self.extras_action = action;
        self
    }

    /// Write the records. An empty stream creates no file.
    pub fn write<I>(&self, records: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: RecordItem,
    {
        let mut records = records.into_iter();
        let Some(first) = records.next() else {
            return Ok(());
        };
        let first = first.into_record()?;
        let columns = match &self.columns {
            Some(columns) => columns.clone(),
            None => first.keys().cloned().collect(),
        };
        let mut out = csv::Writer::from_path(&self.path)?;
        out.write_record(&columns)?;
        self.write_row(&mut out, &columns, &first)?;
        for item in records {
            let record = item.into_record()?;
            self.write_row(&mut out, &columns, &record)?;
        }
        out.flush()?;
        Ok(())
    }

    fn write_row(
        &self,
        out: &mut csv::Writer<File>,
        columns: &[String],
        record: &Record,
    ) -> Result<(), Error> {
        if self.extras_action == ExtrasAction::Error {
            for key in record.keys() {
                if !columns.iter().any(|column| column == key) {
                    return Err(Error::ExtraColumn(key.clone()));
                }
            }
        }
        let row: Vec<String> = columns
            .iter()
            .map(|column| match record.get_key(column) {
                Some(value) => value.as_string(),
                None => self.default_value.clone(),
            })
            .collect();
        out.write_record(&row)?;
        Ok(())
    }
}
