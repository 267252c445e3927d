//! Entity references.

use std::fmt;
use std::sync::Arc;

/// Identifies an entity by URI within a dataset.
///
/// Both fields are reference counted so references can be cloned into
/// constraint indexes without copying the strings.
///
/// # Example
///
/// ```
/// use linkforge_core::EntityRef;
///
/// let a = EntityRef::new("http://example.org/cat", "left");
/// let b = EntityRef::new("http://example.org/cat", "right");
///
/// assert_ne!(a, b);
/// assert_eq!(a.uri(), b.uri());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    uri: Arc<str>,
    dataset: Arc<str>,
}

impl EntityRef {
    /// Creates a new entity reference.
    pub fn new(uri: impl Into<Arc<str>>, dataset: impl Into<Arc<str>>) -> Self {
        Self {
            uri: uri.into(),
            dataset: dataset.into(),
        }
    }

    /// Returns the entity URI.
    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the dataset identifier.
    #[inline]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>@{}", self.uri, self.dataset)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_uses_both_fields() {
        let a = EntityRef::new("file:test#a", "ds");
        assert_eq!(a, EntityRef::new("file:test#a", "ds"));
        assert_ne!(a, EntityRef::new("file:test#a", "other"));
        assert_ne!(a, EntityRef::new("file:test#b", "ds"));
    }

    #[test]
    fn test_ordering_is_uri_first() {
        let a = EntityRef::new("a", "z");
        let b = EntityRef::new("b", "a");
        assert!(a < b);
    }

    #[test]
    fn test_display() {
        let a = EntityRef::new("file:test#a", "ds");
        assert_eq!(a.to_string(), "<file:test#a>");
        assert_eq!(format!("{:?}", a), "<file:test#a>@ds");
    }
}
