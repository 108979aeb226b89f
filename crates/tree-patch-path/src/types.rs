//! Type definitions for tree paths.

use serde_json::Value;
use std::fmt;

/// The append sentinel: as the last step of a sequence path it addresses the
/// position right after the last element.
pub const APPEND: &str = "-";

/// A single step in a path.
///
/// Steps parsed from a path string are always [`Key::Name`]; they are coerced
/// into sequence indices only when resolved against a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal map key (or a not-yet-coerced sequence index).
    Name(String),
    /// A sequence index, or an integer map key.
    Index(usize),
    /// The position after the last element of a sequence.
    Append,
}

impl Key {
    /// Coerce this key into a sequence position.
    ///
    /// `Append` and the `"-"` name resolve to `len`. Numeric names resolve to
    /// their value. Returns `None` for anything else.
    ///
    /// # Example
    ///
    /// ```
    /// use tree_patch_path::Key;
    ///
    /// assert_eq!(Key::from("2").as_index(5), Some(2));
    /// assert_eq!(Key::from("-").as_index(5), Some(5));
    /// assert_eq!(Key::Append.as_index(0), Some(0));
    /// assert_eq!(Key::from("name").as_index(5), None);
    /// ```
    pub fn as_index(&self, len: usize) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Append => Some(len),
            Key::Name(name) if name == APPEND => Some(len),
            Key::Name(name) if crate::is_integer(name) => name.parse().ok(),
            Key::Name(_) => None,
        }
    }

    /// The map key this step addresses. Integer keys use their decimal form.
    pub fn to_map_key(&self) -> String {
        self.to_string()
    }

    /// Decode a key from a JSON string or non-negative integer.
    pub fn from_json(value: &Value) -> Option<Key> {
        match value {
            Value::String(s) => Some(Key::Name(s.clone())),
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()).map(Key::Index),
            _ => None,
        }
    }

    /// Encode a key as a JSON string or integer.
    pub fn to_json(&self) -> Value {
        match self {
            Key::Name(s) => Value::String(s.clone()),
            Key::Index(i) => Value::from(*i),
            Key::Append => Value::String(APPEND.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(s) => f.write_str(s),
            Key::Index(i) => write!(f, "{i}"),
            Key::Append => f.write_str(APPEND),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

/// A tokenized path: keys from the root down to the target.
pub type Path = Vec<Key>;

/// A path as supplied by a caller: either a `/`-delimited string or an
/// already tokenized key sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec {
    Pointer(String),
    Keys(Path),
}

impl PathSpec {
    /// Tokenize into keys. See [`crate::parse_path`] for the string rules.
    pub fn to_keys(&self) -> Path {
        match self {
            PathSpec::Pointer(s) => crate::parse_path(s),
            PathSpec::Keys(keys) => keys.clone(),
        }
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSpec::Pointer(s) => f.write_str(s),
            PathSpec::Keys(keys) => write!(f, "/{}", crate::format_path(keys)),
        }
    }
}

impl From<&str> for PathSpec {
    fn from(s: &str) -> Self {
        PathSpec::Pointer(s.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(s: String) -> Self {
        PathSpec::Pointer(s)
    }
}

impl From<Vec<Key>> for PathSpec {
    fn from(keys: Vec<Key>) -> Self {
        PathSpec::Keys(keys)
    }
}

impl From<&[Key]> for PathSpec {
    fn from(keys: &[Key]) -> Self {
        PathSpec::Keys(keys.to_vec())
    }
}
