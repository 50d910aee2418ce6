use std::fmt;

use serde::{Deserialize, Serialize};

/// A dotted path to a form value, e.g. `"personalInfo.age"`.
///
/// Every question in the catalog owns exactly one field path (its `field_key`).
/// `FormState` walks the segments of a path to find or create the nested map
/// the value lives in.
///
/// Paths are stored in canonical form: stray dots are dropped on construction,
/// so `"a..b"`, `".a.b"` and `"a.b."` are all the path `"a.b"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    /// Dot-separated path string, e.g. "personalInfo.age"
    path: String,
}

impl FieldPath {
    /// Create a new path from a dot-separated string.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.split('.').any(str::is_empty) {
            let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
            return Self {
                path: segments.join("."),
            };
        }
        Self { path }
    }

    /// Create an empty path (the root of a form state).
    pub fn empty() -> Self {
        Self {
            path: String::new(),
        }
    }

    /// Append a child segment to this path, returning a new path.
    pub fn child(&self, name: &str) -> Self {
        if name.is_empty() {
            self.clone()
        } else if self.path.is_empty() {
            Self::new(name)
        } else {
            Self::new(format!("{}.{}", self.path, name))
        }
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Get the segments of this path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.').filter(|s| !s.is_empty())
    }

    /// Get the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments().count()
    }

    /// Returns a new path with the given prefix removed, if it matches on a segment boundary.
    pub fn strip_prefix(&self, prefix: &str) -> Option<Self> {
        if self.path == prefix {
            Some(Self::empty())
        } else if self.path.starts_with(prefix) && self.path[prefix.len()..].starts_with('.') {
            Some(Self::new(&self.path[prefix.len() + 1..]))
        } else {
            None
        }
    }

    /// Check whether `other` lies at or below this path.
    ///
    /// `"a.b"` contains `"a.b"` and `"a.b.c"`, but not `"a.bc"`.
    pub fn contains(&self, other: &FieldPath) -> bool {
        other.strip_prefix(self.as_str()).is_some()
    }

    /// Two paths overlap when one is equal to or nested inside the other.
    ///
    /// Overlapping field keys cannot both be leaves of the same form tree.
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        self.contains(other) || other.contains(self)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.path
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for FieldPath {
    fn from(s: &String) -> Self {
        Self::new(s.clone())
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(p: &FieldPath) -> Self {
        p.clone()
    }
}
