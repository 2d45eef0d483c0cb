//! Object reference identifiers.
//!
//! Every record in a project graph is keyed by an opaque textual
//! reference. Two forms occur in the wild: the sequential form
//! (`OBJ_1`, `OBJ_2`, ...) emitted by the Swift Package Manager project
//! generator, and the literal form (24/32-digit hex GUIDs from Xcode,
//! or human-chosen strings such as `"Lib::Target"`). Comparison places
//! all sequential references before all literal ones, orders
//! sequential references numerically, and literal references lexically.

use std::cmp::Ordering;
use std::fmt;

/// Prefix of sequentially numbered references.
pub const SEQUENTIAL_REFERENCE_PREFIX: &str = "OBJ_";

/// An opaque identifier for a record in the object graph.
///
/// Equality, ordering and hashing all operate on the unquoted value, so
/// `"ABC"` and `ABC` denote the same record.
#[derive(Debug, Clone)]
pub struct Reference {
    raw: String,
}

impl Reference {
    pub fn new(raw: impl Into<String>) -> Self {
        Reference { raw: raw.into() }
    }

    /// The reference text as stored, which may include wrapping quotes.
    pub fn as_raw(&self) -> &str {
        &self.raw
    }

    /// The reference value with any wrapping double quotes removed.
    pub fn unquoted(&self) -> &str {
        let s = self.raw.as_str();
        if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
            &s[1..s.len() - 1]
        } else {
            s
        }
    }

    /// Whether this is a sequentially numbered (`OBJ_<n>`) reference.
    pub fn is_sequential(&self) -> bool {
        self.sequence_number().is_some()
    }

    /// The numeric suffix of a sequential reference, if it has one.
    pub fn sequence_number(&self) -> Option<u64> {
        self.unquoted()
            .strip_prefix(SEQUENTIAL_REFERENCE_PREFIX)?
            .parse()
            .ok()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.unquoted().starts_with(prefix)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.unquoted().contains(needle)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.unquoted() == other.unquoted()
    }
}

impl Eq for Reference {}

impl PartialEq<str> for Reference {
    fn eq(&self, other: &str) -> bool {
        self.unquoted() == other
    }
}

impl PartialEq<&str> for Reference {
    fn eq(&self, other: &&str) -> bool {
        self.unquoted() == *other
    }
}

impl std::hash::Hash for Reference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.unquoted().hash(state);
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.sequence_number(), other.sequence_number()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.unquoted().cmp(other.unquoted()),
        }
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Reference {
    fn from(s: &str) -> Self {
        Reference::new(s)
    }
}

impl From<String> for Reference {
    fn from(s: String) -> Self {
        Reference::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_detection() {
        assert!(Reference::new("OBJ_1").is_sequential());
        assert!(Reference::new("OBJ_42").is_sequential());
        assert!(!Reference::new("OBJ_x").is_sequential());
        assert!(!Reference::new("4F2A1C").is_sequential());
        assert_eq!(Reference::new("OBJ_17").sequence_number(), Some(17));
    }

    #[test]
    fn test_ordering_law() {
        let a = Reference::new("OBJ_1");
        let b = Reference::new("OBJ_2");
        let c = Reference::new("4F2A1C");
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn test_numeric_not_lexical() {
        // OBJ_9 sorts before OBJ_10 even though "9" > "1" lexically.
        assert!(Reference::new("OBJ_9") < Reference::new("OBJ_10"));
    }

    #[test]
    fn test_quoting_ignored_by_equality() {
        assert_eq!(Reference::new("\"ABC\""), Reference::new("ABC"));
        assert_eq!(Reference::new("\"ABC\"").unquoted(), "ABC");
        assert_eq!(
            Reference::new("\"A\"").cmp(&Reference::new("A")),
            Ordering::Equal
        );
    }
}
