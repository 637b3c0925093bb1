//! Path notation shared by record access, filters, and transforms.
//!
//! A path addresses a location inside a nested record. The two textual
//! forms are equivalent: `a.b.c` and `a[b][c]` both split into the
//! segments `["a", "b", "c"]`. Segments that contain a literal `.`, `[`,
//! or `]` cannot be written in the textual form; callers pass those as a
//! pre-split segment list instead.

/// Split a path expression into its segments.
///
/// Dots and brackets are both segment delimiters; the bracket characters
/// themselves are discarded and empty segments are dropped, so consecutive
/// delimiters collapse.
///
/// # Examples
///
/// ```
/// use sylva::path;
///
/// assert_eq!(path::split("a.b.c"), vec!["a", "b", "c"]);
/// assert_eq!(path::split("a[b][c]"), vec!["a", "b", "c"]);
/// assert_eq!(path::split("a[0].b"), vec!["a", "0", "b"]);
/// assert_eq!(path::split(""), Vec::<String>::new());
/// ```
pub fn split(path: &str) -> Vec<String> {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a possibly-negative index against a sequence length.
///
/// Negative indices count from the end. Returns `None` when the index
/// falls outside the sequence.
pub(crate) fn resolve_index(idx: i64, len: usize) -> Option<usize> {
    let index = if idx < 0 {
        let abs = idx.unsigned_abs() as usize;
        if abs > len {
            return None;
        }
        len - abs
    } else {
        idx as usize
    };
    if index < len { Some(index) } else { None }
}
