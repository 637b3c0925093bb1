//! Small helpers shared by the file-per-record writers.

use crate::error::Error;

/// Derive a directory structure from a record identifier.
///
/// The identifier is split on `:`; the first part (the scheme, when there
/// is more than one part) is dropped, middle parts become directories,
/// and the final part is chopped into two-character chunks so large
/// collections spread over nested directories.
///
/// # Examples
///
/// ```
/// use sylva::util::identifier_to_directory_structure;
///
/// let dirs = identifier_to_directory_structure("oai:example.com:abcd").unwrap();
/// assert_eq!(dirs, vec!["example.com", "ab", "cd"]);
///
/// let dirs = identifier_to_directory_structure("abcde").unwrap();
/// assert_eq!(dirs, vec!["ab", "cd", "e"]);
/// ```
pub fn identifier_to_directory_structure(identifier: &str) -> Result<Vec<String>, Error> {
    if identifier.is_empty() {
        return Err(Error::EmptyIdentifier);
    }
    let parts: Vec<&str> = identifier.split(':').collect();
    let (dirs, local) = match parts.as_slice() {
        [local] => (&[] as &[&str], *local),
        [_scheme, middle @ .., local] => (middle, *local),
        [] => return Err(Error::EmptyIdentifier),
    };
    let mut structure: Vec<String> = dirs.iter().map(|part| part.to_string()).collect();
    structure.extend(pairs(local));
    Ok(structure)
}

/// Chop a string into two-character chunks; a trailing odd character
/// stands alone.
fn pairs(part: &str) -> Vec<String> {
    let chars: Vec<char> = part.chars().collect();
    chars.chunks(2).map(|chunk| chunk.iter().collect()).collect()
}
