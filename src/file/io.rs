//! Little-endian primitive decoding for serialized blueprint data.
//!
//! Every multi-byte value stored inside an Unreal package is little-endian. The [`KismetIO`]
//! trait describes how a primitive is rebuilt from its byte representation and
//! [`read_le_at`] performs a bounds-checked read at a moving offset. The
//! [`crate::file::parser::Parser`] builds all of its typed reads on top of these two pieces.

use crate::Result;

/// A primitive type that can be decoded from a fixed number of little-endian bytes.
pub trait KismetIO: Sized {
    /// Fixed-size byte array holding one encoded value.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Rebuild a value from its little-endian encoding.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_kismet_io {
    ($($ty:ty => $n:literal),* $(,)?) => {
        $(
            impl KismetIO for $ty {
                type Bytes = [u8; $n];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_kismet_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Reads a value of type `T` in little-endian order from `data` at `offset`.
///
/// On success `offset` is advanced past the value. On failure `offset` is left untouched.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: KismetIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let end = offset
        .checked_add(type_len)
        .ok_or(out_of_bounds_error!())?;
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_read_le_at_advances() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF];
        let mut offset = 0;

        assert_eq!(read_le_at::<u32>(&data, &mut offset).unwrap(), 1);
        assert_eq!(offset, 4);
        assert_eq!(read_le_at::<i16>(&data, &mut offset).unwrap(), -1);
        assert_eq!(offset, 6);
    }

    #[test]
    fn test_read_le_at_float() {
        let data = 1.5f32.to_le_bytes();
        let mut offset = 0;

        assert_eq!(read_le_at::<f32>(&data, &mut offset).unwrap(), 1.5);
    }

    #[test]
    fn test_read_le_at_out_of_bounds_keeps_offset() {
        let data = [0x01, 0x02, 0x03];
        let mut offset = 1;

        let result = read_le_at::<u32>(&data, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
        assert_eq!(offset, 1);
    }
}
