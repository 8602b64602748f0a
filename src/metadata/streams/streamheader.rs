use crate::{file::io::read_le, Result};

/// Longest stream name ECMA-335 allows, excluding the terminator.
const MAX_NAME_LEN: usize = 32;

/// One entry of the stream directory that follows the metadata root.
///
/// Every stream is located by an offset relative to the metadata root and a size. The name
/// is stored NUL-terminated and padded to a 4-byte boundary.
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Name of the stream (`#~`, `#Strings`, `#Blob`, ...)
    pub name: String,
    /// Length of the name as stored, excluding the terminator
    name_len: usize,
}

impl StreamHeader {
    /// Reads a stream header from the start of `data`.
    ///
    /// Any name is accepted. Unknown streams are simply never looked up.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the header is cut off, or
    /// [`crate::Error::InvalidContainer`] if the name is longer than 32 bytes.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(out_of_bounds!());
        }

        let name_area = &data[8..data.len().min(8 + MAX_NAME_LEN + 1)];
        let Some(name_len) = name_area.iter().position(|&b| b == 0) else {
            if name_area.len() > MAX_NAME_LEN {
                return Err(invalid_container!("Stream header name is not terminated"));
            }
            return Err(out_of_bounds!());
        };

        let name = String::from_utf8_lossy(&name_area[..name_len]).into_owned();

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
            name_len,
        })
    }

    /// Number of bytes this header occupies in the stream directory, including padding.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        8 + ((self.name_len + 1 + 3) & !3)
    }
}
