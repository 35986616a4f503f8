use serde::Serialize;
use strum::{AsRefStr, Display, FromRepr};
use uguid::Guid;

use crate::asset::PackageIndex;

/// Which side of a node a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, AsRefStr, Display, Serialize)]
#[repr(u8)]
pub enum PinDirection {
    /// Data or execution flows into the node
    Input = 0,
    /// Data or execution flows out of the node
    Output = 1,
}

/// Container shape of a pin's value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, AsRefStr, Display, Serialize,
)]
#[repr(u8)]
pub enum ContainerKind {
    /// Single value
    #[default]
    None = 0,
    /// `TArray`
    Array = 1,
    /// `TSet`
    Set = 2,
    /// `TMap`
    Map = 3,
}

/// Type descriptor of a pin (`FEdGraphPinType`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PinType {
    /// Category such as `exec`, `bool`, `object` or `struct`
    pub category: String,
    /// Sub category, often empty
    pub sub_category: String,
    /// Class, struct or enum narrowing the category
    pub sub_category_object: PackageIndex,
    /// Container shape
    pub container: ContainerKind,
}

impl PinType {
    /// Returns `true` for execution pins.
    #[must_use]
    pub fn is_exec(&self) -> bool {
        self.category == "exec"
    }
}

/// One pin as stored in a node's pin blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pin {
    /// Identifier, unique within the asset
    pub id: Guid,
    /// Pin name
    pub name: String,
    /// Input or output
    pub direction: PinDirection,
    /// Type descriptor
    pub pin_type: PinType,
    /// Not shown in the editor
    pub hidden: bool,
    /// Left behind after its node changed signature
    pub orphaned: bool,
    /// User supplied default value
    pub default_value: Option<String>,
    /// Default value generated by the editor
    pub autogenerated_default: Option<String>,
    /// Identifiers of the pins this pin connects to
    pub linked_to: Vec<Guid>,
}

impl Pin {
    /// Create a visible, unlinked pin.
    #[must_use]
    pub fn new(id: Guid, name: impl Into<String>, direction: PinDirection) -> Self {
        Pin {
            id,
            name: name.into(),
            direction,
            pin_type: PinType::default(),
            hidden: false,
            orphaned: false,
            default_value: None,
            autogenerated_default: None,
            linked_to: Vec::new(),
        }
    }

    /// Set the type category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.pin_type.category = category.into();
        self
    }

    /// Add a link to the pin identified by `target`.
    #[must_use]
    pub fn linked(mut self, target: Guid) -> Self {
        self.linked_to.push(target);
        self
    }

    /// Returns `true` if the pin is dropped from node graphs.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.hidden || self.orphaned
    }
}
