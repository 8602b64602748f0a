//! The CLI (COR20) header.
//!
//! Every managed image carries this 72-byte structure at the RVA named by the CLR runtime
//! header data directory. It is the bridge from the PE container to the metadata root.

use crate::{file::parser::Parser, Result};

/// Size of the CLI header in bytes.
pub const COR20_HEADER_SIZE: usize = 72;

/// The CLI header of a managed image.
///
/// Only the fields the analyzer relies on are kept. The remaining directories (resources,
/// strong name signature, vtable fixups, ...) are skipped over.
pub struct Cor20Header {
    /// Size of the header in bytes, at least 72
    pub cb: u32,
    /// Major version of the runtime required to run the image
    pub major_runtime_version: u16,
    /// Minor version of the runtime required to run the image
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata in bytes
    pub meta_data_size: u32,
    /// Runtime flags (`COMIMAGE_FLAGS_*`)
    pub flags: u32,
    /// Token or RVA of the entry point
    pub entry_point_token: u32,
}

impl Cor20Header {
    /// Reads the CLI header from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContainer`] if `data` is shorter than the header or the
    /// header declares a size below 72 bytes.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < COR20_HEADER_SIZE {
            return Err(invalid_container!(
                "CLI header truncated - {} of {} bytes",
                data.len(),
                COR20_HEADER_SIZE
            ));
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if (cb as usize) < COR20_HEADER_SIZE {
            return Err(invalid_container!(
                "Invalid CLI header size: expected at least 72, got {}",
                cb
            ));
        }

        let major_runtime_version = parser.read_le::<u16>()?;
        let minor_runtime_version = parser.read_le::<u16>()?;
        let meta_data_rva = parser.read_le::<u32>()?;
        let meta_data_size = parser.read_le::<u32>()?;
        let flags = parser.read_le::<u32>()?;
        let entry_point_token = parser.read_le::<u32>()?;

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags,
            entry_point_token,
        })
    }

    /// Returns `true` if the header points at a non-empty metadata directory.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        self.meta_data_rva != 0 && self.meta_data_size != 0
    }
}
