//! Path utilities for `tree-patch`.
//!
//! A path addresses one node of a tree of maps and sequences. It is written
//! as `/`-separated segments (`/projects/0/team/-`) or supplied as an already
//! tokenized list of [`Key`]s.
//!
//! # Example
//!
//! ```
//! use tree_patch_path::{split_path, Key, PathSpec};
//!
//! let (ancestors, target) = split_path(&PathSpec::from("/projects/0/team/-")).unwrap();
//! assert_eq!(ancestors, vec![Key::from("projects"), Key::from("0"), Key::from("team")]);
//! assert_eq!(target, Key::from("-"));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Key, Path, PathSpec, APPEND};

/// Segment separator of string paths.
pub const SEPARATOR: char = '/';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
}

/// Strip every leading and trailing separator.
///
/// # Example
///
/// ```
/// use tree_patch_path::trim_separators;
///
/// assert_eq!(trim_separators("//a/b/"), "a/b");
/// assert_eq!(trim_separators("///"), "");
/// ```
pub fn trim_separators(path: &str) -> &str {
    path.trim_matches(SEPARATOR)
}

/// Tokenize a path string.
///
/// Leading and trailing separators are trimmed, the remainder is split on
/// every separator. Empty inner segments are kept as empty keys. A path that
/// is empty after trimming yields no keys.
///
/// # Example
///
/// ```
/// use tree_patch_path::{parse_path, Key};
///
/// assert_eq!(parse_path("/a/b"), vec![Key::from("a"), Key::from("b")]);
/// assert_eq!(parse_path("a//b/"), vec![Key::from("a"), Key::from(""), Key::from("b")]);
/// assert!(parse_path("/").is_empty());
/// ```
pub fn parse_path(path: &str) -> Path {
    let trimmed = trim_separators(path);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(SEPARATOR).map(Key::from).collect()
}

/// Join keys with the separator, without a leading separator.
///
/// This is the form used to key the per-call copy cache.
///
/// # Example
///
/// ```
/// use tree_patch_path::{format_path, Key};
///
/// assert_eq!(format_path(&[Key::from("a"), Key::Index(0), Key::Append]), "a/0/-");
/// assert_eq!(format_path(&[]), "");
/// ```
pub fn format_path(keys: &[Key]) -> String {
    let mut out = String::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(&key.to_string());
    }
    out
}

/// Split a path into its ancestor keys and its final target key.
///
/// # Errors
///
/// Returns [`PathError::Empty`] if the path has no keys.
pub fn split_path(spec: &PathSpec) -> Result<(Path, Key), PathError> {
    let mut keys = spec.to_keys();
    let target = keys.pop().ok_or(PathError::Empty)?;
    Ok((keys, target))
}

/// Check if a string consists only of ASCII digits.
pub fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
