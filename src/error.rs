use thiserror::Error;

/// Builds an [`Error::InvalidContainer`] that records where the problem was detected.
macro_rules! invalid_container {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidContainer {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidContainer {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// Builds an [`Error::TruncatedMetadata`].
macro_rules! out_of_bounds {
    () => {
        crate::Error::TruncatedMetadata
    };
}

/// The error type for every fallible operation of this crate.
///
/// Failures are classified the way a per-file scan reports them:
///
/// - [`Error::InvalidContainer`] - the bytes are not a well-formed managed image (bad PE
///   headers, unknown metadata signature, missing streams, cyclic type nesting, ...)
/// - [`Error::NoMetadataDirectory`] - a valid PE that carries no CLI metadata, e.g. a plain
///   native DLL
/// - [`Error::TruncatedMetadata`] - a read inside the metadata would cross its bounds
/// - [`Error::FileError`] - the file could not be opened or mapped
///
/// None of these abort a batch scan; see [`crate::analysis::scan`].
///
/// # Examples
///
/// ```rust,no_run
/// use nativescope::{Error, Image};
/// use std::path::Path;
///
/// match Image::from_file(Path::new("native.dll")) {
///     Ok(image) => println!("metadata at {:#x}", image.region().offset),
///     Err(Error::NoMetadataDirectory) => println!("not a managed image"),
///     Err(Error::InvalidContainer { message, .. }) => println!("malformed: {message}"),
///     Err(e) => println!("{e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The container or its metadata is malformed.
    ///
    /// Carries the source location where the malformation was detected, which makes
    /// corrupt samples much easier to triage.
    #[error("Invalid container - {file}:{line}: {message}")]
    InvalidContainer {
        /// What was wrong with the image
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The image is a valid PE file without a CLI header or metadata directory.
    #[error("The image has no CLI metadata directory")]
    NoMetadataDirectory,

    /// A read would have crossed the end of the metadata (or of a stream inside it).
    #[error("Out of bound read in the metadata")]
    TruncatedMetadata,

    /// File I/O error.
    ///
    /// Wraps errors from opening or memory-mapping an input file.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this failure describes the image itself rather than the
    /// environment (I/O).
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Error::FileError(_))
    }
}
