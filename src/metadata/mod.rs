//! Metadata parsing for managed PE images.
//!
//! This module decodes just enough of the ECMA-335 metadata to enumerate methods together
//! with the types that declare them.
//!
//! # Key Components
//!
//! - [`image::Image`] - a PE image plus the location of its metadata region
//! - [`view::MetadataView`] - decoded type and method rows with the `#Strings` heap
//! - [`cor20header`] - the CLI header that points at the metadata
//! - [`root`] - the metadata root and stream directory
//! - [`streams`] - the `#Strings` heap and the table stream
//! - [`tables`] - row layouts of the decoded tables
//! - [`method`] - method attribute flags
//! - [`token`] - metadata tokens
//!
//! # Examples
//!
//! ```rust,no_run
//! use nativescope::Image;
//! use std::path::Path;
//!
//! let image = Image::from_file(Path::new("Library.dll"))?;
//! let view = image.metadata()?;
//! println!(
//!     "{} types, {} methods",
//!     view.type_rows().len(),
//!     view.method_rows().len()
//! );
//! # Ok::<(), nativescope::Error>(())
//! ```

pub mod cor20header;
pub mod image;
pub mod method;
pub mod root;
pub mod streams;
pub mod tables;
pub mod token;
pub mod view;
