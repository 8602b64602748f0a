use std::{fmt, path::Path};

use log::trace;

use crate::{
    interop::{classify, qualified_name, NativeInteropFlag},
    metadata::image::Image,
    Result,
};

/// One native-interop method found in one input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindingRecord {
    /// The input path, as given
    pub source_path: String,
    /// Dotted name of the method, see [`crate::interop::qualified_name`]
    pub qualified_name: String,
    /// Which native boundary the method crosses
    pub kind: NativeInteropFlag,
}

impl fmt::Display for FindingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]\t{}", self.source_path, self.qualified_name)
    }
}

/// Collects the native-interop methods of an opened image, in `MethodDef` row order.
///
/// # Errors
/// Returns any error of [`Image::metadata`] or [`qualified_name`].
pub fn analyze_image(source_path: &str, image: &Image) -> Result<Vec<FindingRecord>> {
    let view = image.metadata()?;
    let methods = view.method_rows();

    classify(methods)
        .into_iter()
        .map(|found| {
            let method = &methods[found.index];
            let record = FindingRecord {
                source_path: source_path.to_string(),
                qualified_name: qualified_name(&view, method)?,
                kind: found.kind,
            };
            trace!("{} {}: {}", method.token, record.kind, record.qualified_name);

            Ok(record)
        })
        .collect()
}

/// Opens and analyzes the image at `path`.
///
/// # Errors
/// - [`crate::Error::FileError`] if the file cannot be opened
/// - [`crate::Error::NoMetadataDirectory`] for native images
/// - [`crate::Error::InvalidContainer`] or [`crate::Error::TruncatedMetadata`] for malformed
///   images
pub fn analyze_file(path: &Path) -> Result<Vec<FindingRecord>> {
    let image = Image::from_file(path)?;
    analyze_image(&path.display().to_string(), &image)
}

/// Analyzes an in-memory image, reporting findings under `source_path`.
///
/// # Errors
/// Same as [`analyze_file`], except for I/O errors.
pub fn analyze_mem(source_path: &str, data: Vec<u8>) -> Result<Vec<FindingRecord>> {
    let image = Image::from_mem(data)?;
    analyze_image(source_path, &image)
}
