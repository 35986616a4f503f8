use std::fmt;

use serde::Serialize;

/// Signed reference into an asset's object tables (`FPackageIndex`).
///
/// Positive values `i` refer to export `i - 1`, negative values `i` refer to import `-i - 1`,
/// and zero is the null reference.
///
/// # Examples
///
/// ```rust
/// use kismetscope::PackageIndex;
///
/// let export = PackageIndex::new(3);
/// assert_eq!(export.export_index(), Some(2));
///
/// let import = PackageIndex::from_import(0);
/// assert_eq!(import.raw(), -1);
/// assert!(PackageIndex::NULL.is_null());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct PackageIndex(i32);

impl PackageIndex {
    /// The null reference.
    pub const NULL: PackageIndex = PackageIndex(0);

    /// Wrap a raw serialized index.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        PackageIndex(raw)
    }

    /// Reference to the import at zero-based position `index`.
    ///
    /// Positions that do not fit the serialized width saturate.
    #[must_use]
    pub fn from_import(index: usize) -> Self {
        let index = i32::try_from(index).unwrap_or(i32::MAX - 1);
        PackageIndex(-index - 1)
    }

    /// Reference to the export at zero-based position `index`.
    #[must_use]
    pub fn from_export(index: usize) -> Self {
        let index = i32::try_from(index).unwrap_or(i32::MAX - 1);
        PackageIndex(index + 1)
    }

    /// The serialized value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns `true` for the null reference.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if this refers to an import.
    #[must_use]
    pub const fn is_import(self) -> bool {
        self.0 < 0
    }

    /// Returns `true` if this refers to an export.
    #[must_use]
    pub const fn is_export(self) -> bool {
        self.0 > 0
    }

    /// Zero-based import position, if this refers to an import.
    #[must_use]
    pub fn import_index(self) -> Option<usize> {
        if self.is_import() {
            usize::try_from(-(i64::from(self.0)) - 1).ok()
        } else {
            None
        }
    }

    /// Zero-based export position, if this refers to an export.
    #[must_use]
    pub fn export_index(self) -> Option<usize> {
        if self.is_export() {
            usize::try_from(self.0 - 1).ok()
        } else {
            None
        }
    }
}

impl fmt::Display for PackageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.import_index() {
            write!(f, "import[{index}]")
        } else if let Some(index) = self.export_index() {
            write!(f, "export[{index}]")
        } else {
            write!(f, "null")
        }
    }
}

impl From<i32> for PackageIndex {
    fn from(raw: i32) -> Self {
        PackageIndex(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_convention() {
        let index = PackageIndex::from_export(4);
        assert_eq!(index.raw(), 5);
        assert!(index.is_export());
        assert_eq!(index.export_index(), Some(4));
        assert_eq!(index.import_index(), None);
    }

    #[test]
    fn test_import_convention() {
        let index = PackageIndex::new(-7);
        assert!(index.is_import());
        assert_eq!(index.import_index(), Some(6));
        assert_eq!(index.export_index(), None);
    }

    #[test]
    fn test_import_min_value() {
        assert_eq!(
            PackageIndex::new(i32::MIN).import_index(),
            Some(i32::MAX as usize)
        );
    }

    #[test]
    fn test_null() {
        assert!(PackageIndex::NULL.is_null());
        assert_eq!(PackageIndex::NULL.import_index(), None);
        assert_eq!(PackageIndex::NULL.export_index(), None);
        assert_eq!(PackageIndex::NULL.to_string(), "null");
    }

    #[test]
    fn test_display() {
        assert_eq!(PackageIndex::from_import(2).to_string(), "import[2]");
        assert_eq!(PackageIndex::from_export(0).to_string(), "export[0]");
    }
}
