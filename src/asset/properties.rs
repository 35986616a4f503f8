//! Tagged property values attached to exports.

use serde::Serialize;

use crate::asset::PackageIndex;

/// A single decoded property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyValue {
    /// `BoolProperty`
    Bool(bool),
    /// Any integer property
    Int(i64),
    /// `FloatProperty` or `DoubleProperty`
    Float(f64),
    /// `StrProperty`
    Str(String),
    /// `NameProperty`, and enum values stored by name
    Name(String),
    /// `ObjectProperty` and its soft/weak variants
    Object(PackageIndex),
    /// `StructProperty`
    Struct(PropertyBag),
    /// `ArrayProperty`
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Text of a string or name value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(text) | PropertyValue::Name(text) => Some(text),
            _ => None,
        }
    }

    /// Target of an object value.
    #[must_use]
    pub fn as_object(&self) -> Option<PackageIndex> {
        match self {
            PropertyValue::Object(index) => Some(*index),
            _ => None,
        }
    }

    /// Nested bag of a struct value.
    #[must_use]
    pub fn as_struct(&self) -> Option<&PropertyBag> {
        match self {
            PropertyValue::Struct(bag) => Some(bag),
            _ => None,
        }
    }
}

/// Ordered name → value list of an export's tagged properties.
///
/// Properties keep the order they were serialized in; lookups return the first match.
///
/// # Examples
///
/// ```rust
/// use kismetscope::{PropertyBag, PropertyValue};
///
/// let bag = PropertyBag::new().with(
///     "FunctionReference",
///     PropertyValue::Struct(
///         PropertyBag::new().with("MemberName", PropertyValue::Name("PrintString".into())),
///     ),
/// );
///
/// let member = bag.get_path(&["FunctionReference", "MemberName"]);
/// assert_eq!(member.and_then(PropertyValue::as_str), Some("PrintString"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        PropertyBag::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Append a property.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.entries.push((name.into(), value));
    }

    /// First property called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// Follow a chain of struct properties.
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&PropertyValue> {
        let (last, parents) = path.split_last()?;
        let mut bag = self;
        for name in parents {
            bag = bag.get(name)?.as_struct()?;
        }
        bag.get(last)
    }

    /// Iterate over all properties in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bag holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_first_match() {
        let bag = PropertyBag::new()
            .with("A", PropertyValue::Int(1))
            .with("A", PropertyValue::Int(2));
        assert_eq!(bag.get("A"), Some(&PropertyValue::Int(1)));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_get_path_through_non_struct() {
        let bag = PropertyBag::new().with("A", PropertyValue::Int(1));
        assert_eq!(bag.get_path(&["A", "B"]), None);
        assert_eq!(bag.get_path(&[]), None);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(PropertyValue::Name("X".into()).as_str(), Some("X"));
        assert_eq!(PropertyValue::Int(3).as_str(), None);
        assert_eq!(
            PropertyValue::Object(PackageIndex::new(2)).as_object(),
            Some(PackageIndex::new(2))
        );
    }
}
