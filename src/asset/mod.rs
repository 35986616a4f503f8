//! In-memory model of a deserialized blueprint package.
//!
//! Reading the package container is the job of an upstream deserializer. This module defines
//! the shape the analyses expect from it: the import and export tables, per-export tagged
//! properties, compiled function bodies and the raw trailing bytes of graph node exports.
//! [`Asset`] also implements [`SymbolTable`], the lookup service every analysis resolves names
//! through.
//!
//! # Examples
//!
//! ```rust
//! use kismetscope::{Asset, Export, Import, PackageIndex, SymbolTable};
//!
//! let mut asset = Asset::new("BP_Door");
//! let library = asset.add_import(Import::new("KismetSystemLibrary", "Class", PackageIndex::NULL));
//! let print = asset.add_import(Import::new("PrintString", "Function", library));
//! let class = asset.add_export(Export::new("BP_Door_C", "BlueprintGeneratedClass"));
//!
//! assert_eq!(asset.object_name(print), Some("PrintString"));
//! assert_eq!(asset.outer_name(print), Some("KismetSystemLibrary"));
//! assert_eq!(asset.class_name(class), Some("BlueprintGeneratedClass"));
//! asset.validate()?;
//! # Ok::<(), kismetscope::Error>(())
//! ```

mod function;
mod index;
mod properties;
mod symbols;

use std::collections::BTreeMap;

pub use function::{FunctionBody, FunctionFlags};
pub use index::PackageIndex;
pub use properties::{PropertyBag, PropertyValue};
pub use symbols::SymbolTable;

use crate::{bytecode::PropertyRef, bytecode::ScriptLayout, pins::PinVersion, Result};

/// An entry of the import table.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// Object name
    pub object_name: String,
    /// Class name of the imported object
    pub class_name: String,
    /// Owning object
    pub outer: PackageIndex,
}

impl Import {
    /// Create an import entry.
    #[must_use]
    pub fn new(
        object_name: impl Into<String>,
        class_name: impl Into<String>,
        outer: PackageIndex,
    ) -> Self {
        Import {
            object_name: object_name.into(),
            class_name: class_name.into(),
            outer,
        }
    }
}

/// An entry of the export table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Export {
    /// Object name
    pub object_name: String,
    /// Class name of the exported object
    pub class_name: String,
    /// Owning object
    pub outer: PackageIndex,
    /// Tagged properties
    pub properties: PropertyBag,
    /// Compiled script, for function exports
    pub function: Option<FunctionBody>,
    /// Bytes following the tagged properties; graph nodes store their pin blob here
    pub extra: Vec<u8>,
}

impl Export {
    /// Create an export without outer, properties or payload.
    #[must_use]
    pub fn new(object_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Export {
            object_name: object_name.into(),
            class_name: class_name.into(),
            ..Export::default()
        }
    }

    /// Builder-style outer setter.
    #[must_use]
    pub fn with_outer(mut self, outer: PackageIndex) -> Self {
        self.outer = outer;
        self
    }

    /// Builder-style property bag setter.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    /// Builder-style function body setter.
    #[must_use]
    pub fn with_function(mut self, function: FunctionBody) -> Self {
        self.function = Some(function);
        self
    }

    /// Builder-style trailing bytes setter.
    #[must_use]
    pub fn with_extra(mut self, extra: Vec<u8>) -> Self {
        self.extra = extra;
        self
    }
}

/// Enumeration known to the asset, with the property names typed by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Enum type name, e.g. `EDoorState`
    pub name: String,
    /// Variant names indexed by value
    pub variants: Vec<String>,
}

/// A deserialized package.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Package name
    pub name: String,
    /// Pin blob layout version
    pub pin_version: PinVersion,
    /// Bytecode operand layout
    pub layout: ScriptLayout,
    /// Import table
    pub imports: Vec<Import>,
    /// Export table
    pub exports: Vec<Export>,
    /// Enum typing of byte properties, keyed by property name
    pub enums: BTreeMap<String, EnumDef>,
}

impl Asset {
    /// Create an empty asset using the newest pin layout.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Asset {
            name: name.into(),
            pin_version: PinVersion::LATEST,
            layout: ScriptLayout::default(),
            imports: Vec::new(),
            exports: Vec::new(),
            enums: BTreeMap::new(),
        }
    }

    /// Append an import and return its package index.
    pub fn add_import(&mut self, import: Import) -> PackageIndex {
        self.imports.push(import);
        PackageIndex::from_import(self.imports.len() - 1)
    }

    /// Append an export and return its package index.
    pub fn add_export(&mut self, export: Export) -> PackageIndex {
        self.exports.push(export);
        PackageIndex::from_export(self.exports.len() - 1)
    }

    /// Declare that the property called `property` holds values of `def`.
    pub fn bind_enum(&mut self, property: impl Into<String>, def: EnumDef) {
        self.enums.insert(property.into(), def);
    }

    /// Export referenced by `index`.
    #[must_use]
    pub fn export(&self, index: PackageIndex) -> Option<&Export> {
        self.exports.get(index.export_index()?)
    }

    /// Import referenced by `index`.
    #[must_use]
    pub fn import(&self, index: PackageIndex) -> Option<&Import> {
        self.imports.get(index.import_index()?)
    }

    /// Iterate over all function exports with their package index.
    pub fn functions(&self) -> impl Iterator<Item = (PackageIndex, &Export, &FunctionBody)> {
        self.exports.iter().enumerate().filter_map(|(i, export)| {
            export
                .function
                .as_ref()
                .map(|body| (PackageIndex::from_export(i), export, body))
        })
    }

    /// Check the asset tables for inconsistencies that make every analysis unreliable.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if an outer reference is out of range or refers to
    /// the object itself, or if an outer chain loops.
    pub fn validate(&self) -> Result<()> {
        let outers = self
            .imports
            .iter()
            .enumerate()
            .map(|(i, import)| (PackageIndex::from_import(i), import.outer))
            .chain(
                self.exports
                    .iter()
                    .enumerate()
                    .map(|(i, export)| (PackageIndex::from_export(i), export.outer)),
            );

        for (index, outer) in outers {
            if outer.is_null() {
                continue;
            }
            if outer == index {
                return Err(malformed_error!("{} is its own outer", index));
            }
            if !self.contains(outer) {
                return Err(malformed_error!(
                    "{} has out of range outer {}",
                    index,
                    outer
                ));
            }
        }

        let total = self.imports.len() + self.exports.len();
        for start in (0..self.imports.len())
            .map(PackageIndex::from_import)
            .chain((0..self.exports.len()).map(PackageIndex::from_export))
        {
            let mut current = start;
            for _ in 0..=total {
                match self.outer(current) {
                    Some(outer) if !outer.is_null() => current = outer,
                    _ => break,
                }
            }
            if self.outer(current).is_some_and(|outer| !outer.is_null()) {
                return Err(malformed_error!("Outer chain of {} loops", start));
            }
        }

        Ok(())
    }

    fn contains(&self, index: PackageIndex) -> bool {
        match (index.import_index(), index.export_index()) {
            (Some(i), _) => i < self.imports.len(),
            (_, Some(e)) => e < self.exports.len(),
            _ => false,
        }
    }
}

impl SymbolTable for Asset {
    fn object_name(&self, index: PackageIndex) -> Option<&str> {
        if let Some(import) = self.import(index) {
            return Some(&import.object_name);
        }
        self.export(index).map(|export| export.object_name.as_str())
    }

    fn outer(&self, index: PackageIndex) -> Option<PackageIndex> {
        if let Some(import) = self.import(index) {
            return Some(import.outer);
        }
        self.export(index).map(|export| export.outer)
    }

    fn class_name(&self, index: PackageIndex) -> Option<&str> {
        if let Some(import) = self.import(index) {
            return Some(&import.class_name);
        }
        self.export(index).map(|export| export.class_name.as_str())
    }

    fn enum_value(&self, property: &PropertyRef, value: u8) -> Option<String> {
        let name = self.property_name(property)?;
        let def = self.enums.get(&name)?;
        let variant = def.variants.get(usize::from(value))?;
        Some(format!("{}::{}", def.name, variant))
    }
}
