use std::{borrow::Cow, ffi::CStr};

use crate::Result;

/// The `#Strings` heap.
///
/// Identifiers (type, namespace and method names) are stored here as NUL-terminated UTF-8 and
/// referenced by byte offset. Offset 0 always holds the empty string.
///
/// # Examples
///
/// ```rust
/// use nativescope::metadata::streams::Strings;
///
/// let heap = b"\0Kernel32\0Sleep\0";
/// let strings = Strings::from(heap)?;
/// assert_eq!(strings.resolve(1)?, "Kernel32");
/// assert_eq!(strings.resolve(10)?, "Sleep");
/// assert_eq!(strings.resolve(0)?, "");
/// # Ok::<(), nativescope::Error>(())
/// ```
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Wraps the bytes of a `#Strings` stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContainer`] if the heap is empty or does not start with
    /// the empty string.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(invalid_container!("Provided #Strings heap is empty or malformed"));
        }

        Ok(Strings { data })
    }

    /// Resolves the string starting at `index`.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD, obfuscators routinely emit names that
    /// are not valid UTF-8 and they still need to be reported.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if `index` is outside the heap or the string
    /// runs to the end of the heap without a terminator.
    pub fn resolve(&self, index: u32) -> Result<Cow<'a, str>> {
        let index = index as usize;
        if index >= self.data.len() {
            return Err(out_of_bounds!());
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => Ok(String::from_utf8_lossy(result.to_bytes())),
            Err(_) => Err(out_of_bounds!()),
        }
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap holds nothing but the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }
}
