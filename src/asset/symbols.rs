//! Name resolution service consumed by the renderer and the pin graph builder.

use crate::{
    asset::PackageIndex,
    bytecode::PropertyRef,
};

/// Read-only lookups against an asset's name tables.
///
/// Every method returns `None` for references that do not resolve; callers decide how an
/// unresolved name is rendered. The trait is object safe so analyses can take a
/// `&dyn SymbolTable` and run against hand-built tables in tests.
pub trait SymbolTable: Sync {
    /// Object name of an import or export.
    fn object_name(&self, index: PackageIndex) -> Option<&str>;

    /// Outer (owning object) of an import or export. `Some(PackageIndex::NULL)` means the
    /// object is top level.
    fn outer(&self, index: PackageIndex) -> Option<PackageIndex>;

    /// Class name of an import or export.
    fn class_name(&self, index: PackageIndex) -> Option<&str>;

    /// Symbolic name of `value` for an enum-typed property, when the table knows the enum.
    fn enum_value(&self, _property: &PropertyRef, _value: u8) -> Option<String> {
        None
    }

    /// Display name of a property reference.
    fn property_name(&self, property: &PropertyRef) -> Option<String> {
        match property {
            PropertyRef::Index(index) => self.object_name(*index).map(str::to_string),
            PropertyRef::Path { path, .. } => path.last().cloned(),
        }
    }

    /// Name of the outer of `index`, skipping the null outer of top-level objects.
    fn outer_name(&self, index: PackageIndex) -> Option<&str> {
        let outer = self.outer(index)?;
        if outer.is_null() {
            return None;
        }
        self.object_name(outer)
    }
}
