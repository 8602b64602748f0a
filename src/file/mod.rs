//! PE container access for managed images.
//!
//! This module owns the raw bytes of an input image and the `goblin` view of its PE headers.
//! It answers the container-level questions the metadata decoder needs: where the CLR runtime
//! header lives, and how a relative virtual address maps to a file offset.
//!
//! # Key Components
//!
//! - [`File`] - the image bytes together with the parsed PE headers
//! - [`Backend`] - storage abstraction, implemented for memory-mapped files and owned buffers
//! - [`io`] - bounds-checked little-endian reads
//! - [`parser::Parser`] - cursor-based reader built on [`io`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use nativescope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("tests/Library.dll"))?;
//! match file.clr() {
//!     Some((rva, size)) => println!("CLR header at RVA {rva:#x} ({size} bytes)"),
//!     None => println!("native image"),
//! }
//! # Ok::<(), nativescope::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::Result;
use goblin::pe::PE;
use log::debug;
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Storage behind a [`File`].
///
/// Implementations must be thread-safe, a batch scan may move images between worker threads.
pub trait Backend: Send + Sync {
    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the range is outside the data.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns all bytes of the image.
    fn data(&self) -> &[u8];

    /// Returns the size of the image in bytes.
    fn len(&self) -> usize;
}

/// A PE image: its bytes and the headers `goblin` parsed from them.
///
/// The parsed [`PE`] borrows from the backing storage, `ouroboros` keeps both in one owner.
#[self_referencing]
pub struct File {
    /// The backing storage
    data: Box<dyn Backend>,
    /// The parsed PE headers
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Memory-maps and parses the file at `file`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, or
    /// [`crate::Error::InvalidContainer`] if it is not a PE image.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Parses an image that is already in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContainer`] if `data` is not a PE image.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(invalid_container!("The image is empty"));
        }

        let data = Box::new(data);

        File::try_new(data, |data| match PE::parse(data.data()) {
            Ok(pe) => {
                if pe.header.optional_header.is_none() {
                    return Err(invalid_container!("File does not have an OptionalHeader"));
                }

                debug!(
                    "PE image: machine {:#06x}, {}, {} sections",
                    pe.header.coff_header.machine,
                    if pe.is_64 { "PE32+" } else { "PE32" },
                    pe.sections.len()
                );
                Ok(pe)
            }
            Err(error) => Err(invalid_container!("Not a PE image - {}", error)),
        })
    }

    /// Returns the size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the image has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The COFF machine type.
    #[must_use]
    pub fn machine(&self) -> u16 {
        self.with_pe(|pe| pe.header.coff_header.machine)
    }

    /// Returns `true` for PE32+ (64-bit) images.
    #[must_use]
    pub fn is_pe32_plus(&self) -> bool {
        self.with_pe(|pe| pe.is_64)
    }

    /// The CLR runtime header directory as `(rva, size)`.
    ///
    /// Returns `None` when the directory is missing or zeroed, which is the case for every
    /// native image.
    #[must_use]
    pub fn clr(&self) -> Option<(usize, usize)> {
        self.with_pe(|pe| {
            let optional_header = pe.header.optional_header.as_ref()?;
            if let Some(clr_dir) = optional_header.data_directories.get_clr_runtime_header() {
                if clr_dir.virtual_address != 0 && clr_dir.size != 0 {
                    return Some((clr_dir.virtual_address as usize, clr_dir.size as usize));
                }
            }

            None
        })
    }

    /// Returns all bytes of the image.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data())
    }

    /// Returns `len` bytes starting at file offset `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the range is outside the image.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.data_slice(offset, len))
    }

    /// Maps a relative virtual address to a file offset through the section table.
    ///
    /// A section covers `virtual_address..virtual_address + max(virtual_size, size_of_raw_data)`.
    /// The resulting offset must also fall inside the section's raw data.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContainer`] if no section contains `rva` in its raw data.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        let rva_u32 = u32::try_from(rva)
            .map_err(|_| invalid_container!("RVA too large to fit in u32: {}", rva))?;

        self.with_pe(|pe| {
            for section in &pe.sections {
                let span = section.virtual_size.max(section.size_of_raw_data);
                let Some(section_max) = section.virtual_address.checked_add(span) else {
                    return Err(invalid_container!(
                        "Section malformed, causing integer overflow - {} + {}",
                        section.virtual_address,
                        span
                    ));
                };

                if section.virtual_address <= rva_u32 && rva_u32 < section_max {
                    let delta = rva_u32 - section.virtual_address;
                    if delta >= section.size_of_raw_data {
                        return Err(invalid_container!(
                            "RVA {:#x} lies outside the raw data of its section",
                            rva
                        ));
                    }

                    return Ok(section.pointer_to_raw_data as usize + delta as usize);
                }
            }

            Err(invalid_container!(
                "RVA could not be converted to offset - {:#x}",
                rva
            ))
        })
    }
}
