//! Encoding of pin lists into node blobs.
//!
//! The inverse of [`crate::pins::read_pins`]. Gated fields are omitted for layouts older than
//! their gate; a container kind written at [`PinVersion::INITIAL`] collapses to `is_array`.

use crate::pins::{ContainerKind, Pin, PinVersion};

/// Encode `pins` in the blob layout of `version`.
#[must_use]
pub fn write_pins(pins: &[Pin], version: PinVersion) -> Vec<u8> {
    let mut out = Vec::new();
    write_count(&mut out, pins.len());

    for pin in pins {
        write_fstring(&mut out, &pin.name);
        out.extend_from_slice(&pin.id.to_bytes());
        out.push(pin.direction as u8);
        write_fstring(&mut out, &pin.pin_type.category);
        write_fstring(&mut out, &pin.pin_type.sub_category);
        out.extend_from_slice(&pin.pin_type.sub_category_object.raw().to_le_bytes());

        if version.has_container_type() {
            out.push(pin.pin_type.container as u8);
        } else {
            out.push(u8::from(pin.pin_type.container == ContainerKind::Array));
        }

        out.push(u8::from(pin.hidden));
        if version.has_orphaned_flag() {
            out.push(u8::from(pin.orphaned));
        }

        write_optional(&mut out, pin.default_value.as_deref());
        if version.has_autogenerated_defaults() {
            write_optional(&mut out, pin.autogenerated_default.as_deref());
        }

        write_count(&mut out, pin.linked_to.len());
        for link in &pin.linked_to {
            out.extend_from_slice(&link.to_bytes());
        }
    }

    out
}

fn write_count(out: &mut Vec<u8>, count: usize) {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    out.extend_from_slice(&count.to_le_bytes());
}

fn write_optional(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(text) => {
            out.push(1);
            write_fstring(out, text);
        }
        None => out.push(0),
    }
}

/// Write an `FString`, as Latin-1 when every character fits and as UTF-16 otherwise.
pub(crate) fn write_fstring(out: &mut Vec<u8>, text: &str) {
    if text.is_empty() {
        out.extend_from_slice(&0i32.to_le_bytes());
        return;
    }

    if text.chars().all(|c| u32::from(c) <= 0xFF) {
        let count = text.chars().count() + 1;
        write_count(out, count);
        out.extend(text.chars().map(|c| u32::from(c) as u8));
        out.push(0);
    } else {
        let units: Vec<u16> = text.encode_utf16().collect();
        let count = i32::try_from(units.len() + 1).unwrap_or(i32::MAX);
        out.extend_from_slice(&(-count).to_le_bytes());
        for unit in units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
}
