//! Cursor-based reader for serialized blueprint data.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor over a
//! byte slice. It is used to decode the binary pin blobs attached to graph node exports, which
//! mix little-endian integers, Unreal `FString` values and 16-byte identifiers.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::pos`] - Get current position
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::file::parser::Parser::read_bool`] - Read a single-byte boolean
//! - [`crate::file::parser::Parser::read_fstring`] - Read a length-prefixed ANSI or UTF-16 string
//! - [`crate::file::parser::Parser::read_guid`] - Read a 16-byte identifier
//!
//! # Usage Examples
//!
//! ```rust
//! use kismetscope::Parser;
//!
//! // FString "Hi": length 3 including the terminator
//! let data = [0x03, 0x00, 0x00, 0x00, b'H', b'i', 0x00, 0x2A];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_fstring()?, "Hi");
//! assert_eq!(parser.read_le::<u8>()?, 0x2A);
//! # Ok::<(), kismetscope::Error>(())
//! ```

use widestring::U16CStr;

use crate::{
    file::io::{read_le_at, KismetIO},
    Result,
};

/// Upper bound for a single serialized string, in characters.
///
/// Blobs are read from untrusted packages; a corrupt length prefix must not trigger a huge
/// allocation.
const MAX_FSTRING_LEN: usize = 1 << 20;

/// A bounds-checked cursor over a byte slice.
///
/// The parser maintains an internal position and refuses every read that would cross the end of
/// the underlying data, returning [`crate::Error::OutOfBounds`] instead.
///
/// # Examples
///
/// ```rust
/// use kismetscope::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// let first = parser.read_le::<u32>()?;
/// assert_eq!(first, 0x04030201);
///
/// parser.seek(6)?;
/// assert_eq!(parser.read_le::<u16>()?, 0x0807);
/// # Ok::<(), kismetscope::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new `Parser` positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` while unread bytes remain.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the cursor to `pos`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Current cursor position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Read a little-endian primitive and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value does not fit in the remaining data.
    pub fn read_le<T: KismetIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a single byte and interpret any non-zero value as `true`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_le::<u8>()? != 0)
    }

    /// Borrow the next `count` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count` bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Read a 16-byte identifier.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than 16 bytes remain.
    pub fn read_guid(&mut self) -> Result<uguid::Guid> {
        let bytes = self.read_bytes(16)?;
        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(bytes);
        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Read an Unreal `FString`.
    ///
    /// The value starts with an `i32` character count that includes the terminating null. A
    /// positive count is followed by that many single-byte (Latin-1) characters, a negative
    /// count by `-count` UTF-16 code units. A count of zero is the empty string.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data and [`crate::Error::Malformed`]
    /// for an implausible length or a missing terminator.
    pub fn read_fstring(&mut self) -> Result<String> {
        self.transactional(|parser| match parser.read_le::<i32>()? {
            0 => Ok(String::new()),
            len if len > 0 => parser.read_ansi(len.unsigned_abs() as usize),
            len => parser.read_utf16(len.unsigned_abs() as usize),
        })
    }

    fn read_ansi(&mut self, count: usize) -> Result<String> {
        if count > MAX_FSTRING_LEN {
            return Err(malformed_error!("String length {} is implausible", count));
        }

        let bytes = self.read_bytes(count)?;
        let Some((&0, text)) = bytes.split_last() else {
            return Err(malformed_error!(
                "String at offset {} is not null-terminated",
                self.position - count
            ));
        };

        Ok(text.iter().map(|&b| char::from(b)).collect())
    }

    fn read_utf16(&mut self, count: usize) -> Result<String> {
        if count > MAX_FSTRING_LEN {
            return Err(malformed_error!("String length {} is implausible", count));
        }

        let mut units = Vec::with_capacity(count);
        for _ in 0..count {
            units.push(self.read_le::<u16>()?);
        }

        let text = U16CStr::from_slice_truncate(&units)
            .map_err(|_| malformed_error!("UTF-16 string is not null-terminated"))?;
        Ok(text.to_string_lossy())
    }

    /// Run `f` and restore the cursor position if it fails.
    ///
    /// # Errors
    /// Propagates whatever error `f` returns.
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }
}
