//! In-memory backend for images that are already loaded.

use super::Backend;
use crate::Result;

/// An owned byte buffer used as the backing store of a [`crate::file::File`].
///
/// Used for fuzzing, tests and callers that hand the analyzer a buffer instead of a path.
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Takes ownership of `data`.
    pub fn new(data: Vec<u8>) -> Memory {
        Memory { data }
    }
}

impl Backend for Memory {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds!());
        };

        if offset_end > self.data.len() {
            return Err(out_of_bounds!());
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
