//! Pin blob layout versions.

use std::fmt;

use serde::Serialize;

/// Per-asset feature counter controlling which fields a pin blob contains.
///
/// Each gate is the first version at which a field is serialized. Readers must compare against
/// the gate before touching the field, otherwise every following byte of the blob shifts.
///
/// # Examples
///
/// ```rust
/// use kismetscope::PinVersion;
///
/// let old = PinVersion::new(1);
/// assert!(old.has_container_type());
/// assert!(!old.has_orphaned_flag());
/// assert!(PinVersion::LATEST.has_autogenerated_defaults());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PinVersion(u32);

impl PinVersion {
    /// Pins only carry an `is_array` flag.
    pub const INITIAL: PinVersion = PinVersion(0);
    /// Container kind (array, set, map) replaces the `is_array` flag.
    pub const CONTAINER_TYPE: PinVersion = PinVersion(1);
    /// Pins carry an orphaned flag.
    pub const ORPHANED_PINS: PinVersion = PinVersion(2);
    /// Pins carry an autogenerated default value.
    pub const AUTOGENERATED_DEFAULTS: PinVersion = PinVersion(3);
    /// Newest layout understood by the reader.
    pub const LATEST: PinVersion = PinVersion::AUTOGENERATED_DEFAULTS;

    /// Wrap a raw version number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        PinVersion(raw)
    }

    /// The raw version number.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if pins serialize a container kind instead of `is_array`.
    #[must_use]
    pub fn has_container_type(self) -> bool {
        self >= PinVersion::CONTAINER_TYPE
    }

    /// Returns `true` if pins serialize an orphaned flag.
    #[must_use]
    pub fn has_orphaned_flag(self) -> bool {
        self >= PinVersion::ORPHANED_PINS
    }

    /// Returns `true` if pins serialize an autogenerated default value.
    #[must_use]
    pub fn has_autogenerated_defaults(self) -> bool {
        self >= PinVersion::AUTOGENERATED_DEFAULTS
    }
}

impl Default for PinVersion {
    fn default() -> Self {
        PinVersion::LATEST
    }
}

impl fmt::Display for PinVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
