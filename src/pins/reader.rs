//! Decoding of serialized pin blobs.
//!
//! A node export stores its pins after the tagged properties:
//!
//! ```text
//! i32 pin_count
//! per pin:
//!   FString  name
//!   [u8;16]  id
//!   u8       direction
//!   FString  category
//!   FString  sub_category
//!   i32      sub_category_object
//!   u8       container        (v1+, earlier: u8 is_array)
//!   u8       hidden
//!   u8       orphaned         (v2+)
//!   u8       has_default      followed by FString when set
//!   u8       has_autogen      followed by FString when set (v3+)
//!   i32      link_count       followed by link_count ids
//! ```

use crate::{
    asset::PackageIndex,
    file::parser::Parser,
    pins::{ContainerKind, Pin, PinDirection, PinType, PinVersion},
    Result,
};

/// Upper bound for pin and link counts; larger values mean the blob is not a pin list.
const MAX_COUNT: usize = 1 << 16;

/// Smallest encoding of one pin: empty strings, no defaults, no links.
const MIN_PIN_SIZE: usize = 4 + 16 + 1 + 4 + 4 + 4 + 1 + 1 + 1 + 4;

/// Encoded size of one linked pin id.
const LINK_SIZE: usize = 16;

/// Decode all pins of a node blob written at `version`.
///
/// The whole blob must be consumed. Trailing bytes mean the version does not match the
/// writer's and every field after the first gated one was misread.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] for truncated blobs and [`crate::Error::Malformed`]
/// for invalid field values or trailing bytes.
///
/// # Examples
///
/// ```rust
/// use kismetscope::pins::{read_pins, write_pins, Pin, PinDirection};
/// use kismetscope::PinVersion;
/// use uguid::guid;
///
/// let pin = Pin::new(guid!("01234567-89ab-cdef-0123-456789abcdef"), "then", PinDirection::Output)
///     .with_category("exec");
/// let blob = write_pins(&[pin.clone()], PinVersion::LATEST);
/// assert_eq!(read_pins(&blob, PinVersion::LATEST)?, vec![pin]);
/// # Ok::<(), kismetscope::Error>(())
/// ```
pub fn read_pins(blob: &[u8], version: PinVersion) -> Result<Vec<Pin>> {
    let mut parser = Parser::new(blob);
    let count = read_count(&mut parser, "pin")?;

    let mut pins = Vec::with_capacity(count.min(parser.remaining() / MIN_PIN_SIZE));
    for _ in 0..count {
        pins.push(read_pin(&mut parser, version)?);
    }

    if parser.has_more_data() {
        return Err(malformed_error!(
            "{} trailing bytes after {} pins (layout {})",
            parser.remaining(),
            count,
            version
        ));
    }

    Ok(pins)
}

fn read_count(parser: &mut Parser<'_>, what: &str) -> Result<usize> {
    let count = parser.read_le::<i32>()?;
    match usize::try_from(count) {
        Ok(count) if count <= MAX_COUNT => Ok(count),
        _ => Err(malformed_error!("Invalid {} count {}", what, count)),
    }
}

fn read_optional(parser: &mut Parser<'_>) -> Result<Option<String>> {
    if parser.read_bool()? {
        Ok(Some(parser.read_fstring()?))
    } else {
        Ok(None)
    }
}

fn read_pin(parser: &mut Parser<'_>, version: PinVersion) -> Result<Pin> {
    let name = parser.read_fstring()?;
    let id = parser.read_guid()?;

    let raw_direction = parser.read_le::<u8>()?;
    let direction = PinDirection::from_repr(raw_direction).ok_or_else(|| {
        malformed_error!(
            "Pin '{}' has invalid direction {} at byte {}",
            name,
            raw_direction,
            parser.pos() - 1
        )
    })?;

    let category = parser.read_fstring()?;
    let sub_category = parser.read_fstring()?;
    let sub_category_object = PackageIndex::new(parser.read_le::<i32>()?);

    let container = if version.has_container_type() {
        let raw = parser.read_le::<u8>()?;
        ContainerKind::from_repr(raw)
            .ok_or_else(|| malformed_error!("Pin '{}' has invalid container {}", name, raw))?
    } else if parser.read_bool()? {
        ContainerKind::Array
    } else {
        ContainerKind::None
    };

    let hidden = parser.read_bool()?;
    let orphaned = if version.has_orphaned_flag() {
        parser.read_bool()?
    } else {
        false
    };

    let default_value = read_optional(parser)?;
    let autogenerated_default = if version.has_autogenerated_defaults() {
        read_optional(parser)?
    } else {
        None
    };

    let link_count = read_count(parser, "link")?;
    let mut linked_to = Vec::with_capacity(link_count.min(parser.remaining() / LINK_SIZE));
    for _ in 0..link_count {
        linked_to.push(parser.read_guid()?);
    }

    Ok(Pin {
        id,
        name,
        direction,
        pin_type: PinType {
            category,
            sub_category,
            sub_category_object,
            container,
        },
        hidden,
        orphaned,
        default_value,
        autogenerated_default,
        linked_to,
    })
}
