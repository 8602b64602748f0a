//! Cursor-based byte parser for metadata decoding.
//!
//! [`Parser`] wraps a byte slice and a position. Every read goes through the bounds-checked
//! helpers in [`crate::file::io`], so the metadata decoder can walk untrusted input
//! sequentially without doing its own range arithmetic.
//!
//! # Usage Examples
//!
//! ```rust
//! use nativescope::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
//! let mut parser = Parser::new(&data);
//!
//! let first = parser.read_le::<u32>()?;
//! assert_eq!(first, 0x04030201);
//!
//! parser.seek(6)?;
//! let last_bytes = parser.read_le::<u16>()?;
//! assert_eq!(last_bytes, 0x0807);
//! # Ok::<(), nativescope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, read_le_at_dyn, CilIO},
    Result,
};

/// A bounds-checked reader over a byte slice.
///
/// The parser never reads past the end of its slice. A failed read returns
/// [`crate::Error::TruncatedMetadata`] and leaves the position where it was.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] positioned at the start of `data`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nativescope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes between the current position and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the current position to `pos`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(out_of_bounds!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the current position forward by `step` bytes.
    ///
    /// Advancing exactly to the end of the data is allowed.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the new position would exceed the data.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(out_of_bounds!()),
        }
    }

    /// Get the current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get the complete underlying slice, independent of the current position.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Advance the position to the next multiple of `alignment`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the padding would exceed the data.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = (alignment - (self.position % alignment)) % alignment;
        self.advance_by(padding)
    }

    /// Read a little-endian `T` at the current position and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if not enough data remains.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a 2- or 4-byte index, depending on `is_large`, widened to `u32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if not enough data remains.
    pub fn read_le_dyn(&mut self, is_large: bool) -> Result<u32> {
        read_le_at_dyn(self.data, &mut self.position, is_large)
    }

    /// Borrow the next `length` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if not enough data remains.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance_by(length)?;
        Ok(&self.data[start..self.position])
    }

    /// Read a NUL-terminated UTF-8 string and advance past its terminator.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if no terminator is found, or
    /// [`crate::Error::InvalidContainer`] if the bytes are not valid UTF-8.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let Some(len) = self.data[start.min(self.data.len())..]
            .iter()
            .position(|&b| b == 0)
        else {
            return Err(out_of_bounds!());
        };

        let string_data = &self.data[start..start + len];
        let string = String::from_utf8(string_data.to_vec()).map_err(|e| {
            invalid_container!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                start + len,
                e.utf8_error()
            )
        })?;

        self.position = start + len + 1;
        Ok(string)
    }
}
