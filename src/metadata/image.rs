use std::path::Path;

use log::debug;

use crate::{
    file::File,
    metadata::{
        cor20header::{Cor20Header, COR20_HEADER_SIZE},
        view::MetadataView,
    },
    Error, Result,
};

/// Location of the metadata blob inside an image, as a file offset and a length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetadataRegion {
    /// File offset of the metadata root
    pub offset: usize,
    /// Size of the metadata in bytes
    pub len: usize,
}

/// A managed PE image with a located metadata region.
///
/// Construction validates the container down to the metadata directory. Decoding the
/// metadata itself is deferred to [`Image::metadata`].
///
/// # Examples
///
/// ```rust,no_run
/// use nativescope::{Error, Image};
/// use std::path::Path;
///
/// match Image::from_file(Path::new("kernel32.dll")) {
///     Err(Error::NoMetadataDirectory) => println!("native image, nothing to analyze"),
///     Err(e) => println!("failed: {e}"),
///     Ok(image) => println!("{:?}", image.region()),
/// }
/// ```
pub struct Image {
    file: File,
    region: MetadataRegion,
}

impl Image {
    /// Opens the image at `path`.
    ///
    /// # Errors
    /// - [`Error::FileError`] if the file cannot be read
    /// - [`Error::InvalidContainer`] if it is not a valid PE image
    /// - [`Error::NoMetadataDirectory`] if it carries no CLI metadata
    pub fn from_file(path: &Path) -> Result<Image> {
        Self::from_container(File::from_file(path)?)
    }

    /// Builds an image from an in-memory buffer.
    ///
    /// # Errors
    /// - [`Error::InvalidContainer`] if `data` is not a valid PE image
    /// - [`Error::NoMetadataDirectory`] if it carries no CLI metadata
    pub fn from_mem(data: Vec<u8>) -> Result<Image> {
        Self::from_container(File::from_mem(data)?)
    }

    fn from_container(file: File) -> Result<Image> {
        let region = locate_metadata(&file)?;
        debug!(
            "Metadata region at {:#x}, {} bytes",
            region.offset, region.len
        );

        Ok(Image { file, region })
    }

    /// The metadata region.
    #[must_use]
    pub fn region(&self) -> MetadataRegion {
        self.region
    }

    /// The underlying PE container.
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Decodes the metadata region.
    ///
    /// # Errors
    /// See [`MetadataView::decode`].
    pub fn metadata(&self) -> Result<MetadataView<'_>> {
        let data = self.file.data_slice(self.region.offset, self.region.len)?;
        MetadataView::decode(data)
    }
}

/// Follows the CLR runtime header directory to the metadata root.
fn locate_metadata(file: &File) -> Result<MetadataRegion> {
    let Some((clr_rva, clr_size)) = file.clr() else {
        return Err(Error::NoMetadataDirectory);
    };
    if clr_size < COR20_HEADER_SIZE {
        debug!("CLR runtime header directory is only {clr_size} bytes");
    }

    let clr_offset = file.rva_to_offset(clr_rva)?;
    if clr_offset >= file.len() {
        return Err(invalid_container!(
            "CLI header at {:#x} is outside the file ({} bytes)",
            clr_offset,
            file.len()
        ));
    }
    let available = file.len().saturating_sub(clr_offset);
    let header = Cor20Header::read(file.data_slice(clr_offset, available.min(COR20_HEADER_SIZE))?)?;
    debug!(
        "CLI header: runtime {}.{}, flags {:#x}",
        header.major_runtime_version, header.minor_runtime_version, header.flags
    );

    if !header.has_metadata() {
        return Err(Error::NoMetadataDirectory);
    }

    let offset = file.rva_to_offset(header.meta_data_rva as usize)?;
    let len = header.meta_data_size as usize;
    match offset.checked_add(len) {
        Some(end) if end <= file.len() => Ok(MetadataRegion { offset, len }),
        _ => Err(invalid_container!(
            "Metadata region {:#x}+{:#x} exceeds the file ({} bytes)",
            offset,
            len,
            file.len()
        )),
    }
}
