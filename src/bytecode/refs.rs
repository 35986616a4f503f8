//! Symbolic operands carried by bytecode expressions.
//!
//! Kismet instructions never embed names as plain strings. Functions dispatched virtually carry
//! a script name, everything else carries a [`PackageIndex`] into the owning asset's import or
//! export table. Property references come in two encodings: a package index (older assets)
//! or a field path with an owner (assets saved after the property system rewrite).

use std::fmt;

use serde::Serialize;

use crate::asset::PackageIndex;

/// An in-script name (`FScriptName` in memory).
///
/// The display form follows engine conventions: a non-zero `number` is appended as a
/// zero-based `_N` suffix, so `ScriptName::with_number("Node", 3)` prints as `Node_2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScriptName {
    /// Base text of the name
    pub text: String,
    /// Instance number, `0` when absent
    pub number: u32,
}

impl ScriptName {
    /// Create a name without an instance number.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        ScriptName {
            text: text.into(),
            number: 0,
        }
    }

    /// Create a name with an explicit instance number.
    #[must_use]
    pub fn with_number(text: impl Into<String>, number: u32) -> Self {
        ScriptName {
            text: text.into(),
            number,
        }
    }

    /// Returns `true` for the engine's `None` name.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.text.is_empty() || self.text == "None"
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.number == 0 {
            write!(f, "{}", self.text)
        } else {
            write!(f, "{}_{}", self.text, self.number - 1)
        }
    }
}

impl From<&str> for ScriptName {
    fn from(value: &str) -> Self {
        ScriptName::new(value)
    }
}

/// Reference to an object in the import or export table.
pub type ObjectRef = PackageIndex;

/// Reference to a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PropertyRef {
    /// Property stored as an object in the import/export table
    Index(PackageIndex),
    /// Property addressed by a field path relative to `owner`
    Path {
        /// Path segments, outermost first
        path: Vec<String>,
        /// Object owning the first path segment
        owner: PackageIndex,
    },
}

impl PropertyRef {
    /// Shorthand for a single-segment field path.
    #[must_use]
    pub fn field(name: impl Into<String>, owner: PackageIndex) -> Self {
        PropertyRef::Path {
            path: vec![name.into()],
            owner,
        }
    }

    /// The innermost path segment, for field paths.
    #[must_use]
    pub fn leaf_name(&self) -> Option<&str> {
        match self {
            PropertyRef::Index(_) => None,
            PropertyRef::Path { path, .. } => path.last().map(String::as_str),
        }
    }

    /// The package index that anchors this reference.
    #[must_use]
    pub fn anchor(&self) -> PackageIndex {
        match self {
            PropertyRef::Index(index) => *index,
            PropertyRef::Path { owner, .. } => *owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_name_display() {
        assert_eq!(ScriptName::new("Foo").to_string(), "Foo");
        assert_eq!(ScriptName::with_number("Node", 3).to_string(), "Node_2");
        assert_eq!(ScriptName::with_number("Node", 1).to_string(), "Node_0");
    }

    #[test]
    fn test_script_name_none() {
        assert!(ScriptName::new("None").is_none());
        assert!(ScriptName::new("").is_none());
        assert!(!ScriptName::new("Self").is_none());
    }

    #[test]
    fn test_property_ref_leaf() {
        let path = PropertyRef::Path {
            path: vec!["Outer".into(), "Inner".into()],
            owner: PackageIndex::from_export(0),
        };
        assert_eq!(path.leaf_name(), Some("Inner"));
        assert_eq!(path.anchor(), PackageIndex::from_export(0));
        assert_eq!(PropertyRef::Index(PackageIndex::NULL).leaf_name(), None);
    }
}
