//! Readers that stream records from the local filesystem.
//!
//! Each reader is a restartable container: iterating `&reader` starts a
//! fresh pass over the underlying files. Iteration yields
//! `Result<Record, Error>`, so a single unreadable file surfaces as an
//! `Err` item without ending the stream.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;
use crate::record::Record;
use crate::value::Value;

// ============================================================================
// Directory readers
// ============================================================================

/// Reads every `*.json` file under a directory as a record.
///
/// The directory is walked recursively at construction and the file list
/// is sorted, so iteration order is stable across passes. Files are
/// parsed lazily, one per iteration step. A document whose top level is
/// not an object is wrapped as `{"value": <document>}`.
#[derive(Debug, Clone)]
pub struct JsonReader {
    files: Vec<PathBuf>,
}

impl JsonReader {
    /// Collect the `*.json` files under `directory`.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(JsonReader {
            files: collect_files(directory.as_ref(), "json")?,
        })
    }
}

impl IntoIterator for JsonReader {
    type Item = Result<Record, Error>;
    type IntoIter = JsonIter<std::vec::IntoIter<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        JsonIter {
            files: self.files.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a JsonReader {
    type Item = Result<Record, Error>;
    type IntoIter = JsonIter<std::slice::Iter<'a, PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        JsonIter {
            files: self.files.iter(),
        }
    }
}

/// One pass over a [`JsonReader`]'s files.
pub struct JsonIter<I> {
    files: I,
}

impl<I> Iterator for JsonIter<I>
where
    I: Iterator,
    I::Item: AsRef<Path>,
{
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(load_json(path.as_ref()))
    }
}

/// Reads every `*.xml` file under a directory as a record.
///
/// Same walking and ordering behaviour as [`JsonReader`]; documents are
/// converted through [`xml_to_record`].
#[derive(Debug, Clone)]
pub struct XmlReader {
    files: Vec<PathBuf>,
}

impl XmlReader {
    /// Collect the `*.xml` files under `directory`.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(XmlReader {
            files: collect_files(directory.as_ref(), "xml")?,
        })
    }
}

impl IntoIterator for XmlReader {
    type Item = Result<Record, Error>;
    type IntoIter = XmlIter<std::vec::IntoIter<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        XmlIter {
            files: self.files.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a XmlReader {
    type Item = Result<Record, Error>;
    type IntoIter = XmlIter<std::slice::Iter<'a, PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        XmlIter {
            files: self.files.iter(),
        }
    }
}

/// One pass over an [`XmlReader`]'s files.
pub struct XmlIter<I> {
    files: I,
}

impl<I> Iterator for XmlIter<I>
where
    I: Iterator,
    I::Item: AsRef<Path>,
{
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(load_xml(path.as_ref()))
    }
}

fn collect_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    walk(directory, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(directory: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<(), Error> {
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, extension, files)?;
        } else if path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    Ok(())
}

fn load_json(path: &Path) -> Result<Record, Error> {
    let text = fs::read_to_string(path)?;
    let document: serde_json::Value = serde_json::from_str(&text)?;
    Ok(match Value::from(document) {
        Value::Record(record) => record,
        other => {
            let mut record = Record::new();
            record.insert("value", other);
            record
        }
    })
}

fn load_xml(path: &Path) -> Result<Record, Error> {
    let text = fs::read_to_string(path)?;
    xml_to_record(&text)
}

// ============================================================================
// XML conversion
// ============================================================================

/// Convert an XML document into a record.
///
/// Child elements become keys of their parent; where a tag occurs more
/// than once the key holds a list, so document ordering across different
/// tags is lost. An element's text lands under `_text`, text directly
/// following its close tag under `_tail`, and its attributes under
/// `_attrib`. Namespace-prefixed names are keyed with the prefix joined
/// by an underscore (`b:element` becomes `b_element`), elements in a
/// default namespace keep their plain names, and `xmlns` declarations
/// are dropped. The root element contributes its content but not its
/// tag.
///
/// # Examples
///
/// ```
/// use sylva::Value;
/// use sylva::reader::xml_to_record;
///
/// let record = xml_to_record(
///     "<test><element>Test</element><element>Test 2</element> this</test>",
/// ).unwrap();
///
/// assert_eq!(record.get("element.0._text"), Some(Value::String("Test".to_string())));
/// assert_eq!(record.get("element.1._tail"), Some(Value::String(" this".to_string())));
/// ```
pub fn xml_to_record(xml: &str) -> Result<Record, Error> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                stack.push(Frame::open(&e));
            }
            Event::Empty(e) => {
                let frame = Frame::open(&e);
                match stack.last_mut() {
                    Some(parent) => parent.close_child(frame),
                    None => root = Some(frame.record),
                }
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else { continue };
                match stack.last_mut() {
                    Some(parent) => parent.close_child(frame),
                    None => root = Some(frame.record),
                }
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut() {
                    frame.absorb_text(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(frame) = stack.last_mut() {
                    frame.absorb_text(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            // Comments, processing instructions, doctypes, and the XML
            // declaration carry no record content.
            _ => {}
        }
        buf.clear();
    }

    root.ok_or(Error::EmptyDocument)
}

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    record: Record,
    last_closed: Option<String>,
}

impl Frame {
    fn open(element: &BytesStart) -> Self {
        let mut record = Record::new();
        let mut attrib = Record::new();
        for attr in element.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr.unescape_value().unwrap_or_default().to_string();
            attrib.insert(tag_key(&key), Value::String(value));
        }
        if !attrib.is_empty() {
            record.insert("_attrib", Value::Record(attrib));
        }
        Frame {
            name: tag_key(&String::from_utf8_lossy(element.name().as_ref())),
            record,
            last_closed: None,
        }
    }

    /// Attach a finished child element, promoting repeated tags to lists.
    fn close_child(&mut self, child: Frame) {
        let value = Value::Record(child.record);
        match self.record.get_key_mut(&child.name) {
            Some(Value::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Value::Null);
                *existing = Value::List(vec![first, value]);
            }
            None => {
                self.record.insert(child.name.as_str(), value);
            }
        }
        self.last_closed = Some(child.name);
    }

    /// Record a text chunk: element text before any child closes, tail
    /// text of the most recently closed child afterwards. Chunks are
    /// appended, so text interrupted by removed constructs (comments,
    /// CDATA boundaries) still reads as one string.
    fn absorb_text(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        match &self.last_closed {
            Some(key) => {
                if let Some(child) = self.record.get_key_mut(key) {
                    let slot = match child {
                        Value::List(items) => items.last_mut(),
                        other => Some(other),
                    };
                    if let Some(Value::Record(rec)) = slot {
                        append_text(rec, "_tail", chunk);
                    }
                }
            }
            None => append_text(&mut self.record, "_text", chunk),
        }
    }
}

fn append_text(record: &mut Record, key: &str, chunk: &str) {
    match record.get_key_mut(key) {
        Some(Value::String(text)) => text.push_str(chunk),
        _ => {
            record.insert(key, Value::String(chunk.to_string()));
        }
    }
}

fn tag_key(raw: &str) -> String {
    raw.replace(':', "_")
}

// ============================================================================
// CSV reader
// ============================================================================

/// Reads a headered CSV file, one flat record per row.
///
/// Every field becomes a string value keyed by its column name. The file
/// is reopened on each pass, so the container restarts cleanly.
#[derive(Debug, Clone)]
pub struct CsvReader {
    path: PathBuf,
}

impl CsvReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvReader { path: path.into() }
    }
}

impl IntoIterator for CsvReader {
    type Item = Result<Record, Error>;
    type IntoIter = CsvIter;

    fn into_iter(self) -> Self::IntoIter {
        CsvIter::open(&self.path)
    }
}

impl IntoIterator for &CsvReader {
    type Item = Result<Record, Error>;
    type IntoIter = CsvIter;

    fn into_iter(self) -> Self::IntoIter {
        CsvIter::open(&self.path)
    }
}

/// One pass over a [`CsvReader`]'s rows.
pub struct CsvIter {
    headers: csv::StringRecord,
    rows: Option<csv::StringRecordsIntoIter<File>>,
    failed: Option<Error>,
}

impl CsvIter {
    /// A failure to open the file becomes the pass's single `Err` item.
    fn open(path: &Path) -> Self {
        match open_csv(path) {
            Ok((headers, rows)) => CsvIter {
                headers,
                rows: Some(rows),
                failed: None,
            },
            Err(e) => CsvIter {
                headers: csv::StringRecord::new(),
                rows: None,
                failed: Some(e),
            },
        }
    }
}

fn open_csv(
    path: &Path,
) -> Result<(csv::StringRecord, csv::StringRecordsIntoIter<File>), Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    Ok((headers, reader.into_records()))
}

impl Iterator for CsvIter {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.failed.take() {
            return Some(Err(e));
        }
        let row = match self.rows.as_mut()?.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };
        let mut record = Record::new();
        for (key, field) in self.headers.iter().zip(row.iter()) {
            record.insert(key, Value::String(field.to_string()));
        }
        Some(Ok(record))
    }
}
