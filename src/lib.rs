// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![warn(missing_docs)]

//! # nativescope
//!
//! Finds the native-interop boundary of .NET PE images: every P/Invoke import and every
//! unmanaged export, reported under its fully qualified name. Images are never loaded or
//! executed; `nativescope` decodes the PE container and the ECMA-335 metadata directly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nativescope::prelude::*;
//! use std::path::Path;
//!
//! for finding in analyze_file(Path::new("Library.dll"))? {
//!     println!("{finding}");
//! }
//! # Ok::<(), nativescope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`Image`] - opens a PE file (memory-mapped) or buffer and locates its metadata
//! - [`metadata`] - the metadata root, the `#Strings` heap and the table stream, decoded into a
//!   [`MetadataView`] of type and method rows
//! - [`interop`] - selects P/Invoke and unmanaged-export methods and names them
//! - [`analysis`] - per-file analysis and batch scanning, sequential or parallel
//! - [`Error`] and [`Result`] - error handling
//!
//! Only the tables needed to name methods are interpreted (`TypeDef`, `MethodDef`,
//! `MethodPtr` and `NestedClass`). Every other table is located by its row size and skipped.
//!
//! ## Batch Scanning
//!
//! ```rust,no_run
//! use nativescope::analysis::{scan, ScanOptions};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("bin/App.exe"), PathBuf::from("bin/Native.dll")];
//! let report = scan(&paths, &ScanOptions { parallel: true }, |_| {});
//! for failed in report.failures() {
//!     println!("skipped {}", failed.path.display());
//! }
//! println!("{} native-interop methods", report.finding_count());
//! ```
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! use nativescope::{analysis::analyze_file, Error};
//! use std::path::Path;
//!
//! match analyze_file(Path::new("kernel32.dll")) {
//!     Ok(findings) => println!("{} findings", findings.len()),
//!     Err(Error::NoMetadataDirectory) => println!("not a managed image"),
//!     Err(Error::InvalidContainer { message, .. }) => println!("malformed: {message}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
//!
//! ## Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run image --release
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use nativescope::prelude::*;
///
/// let image = Image::from_file("Library.dll".as_ref())?;
/// let view = image.metadata()?;
/// println!("{} interop methods", classify(view.method_rows()).len());
/// # Ok::<(), nativescope::Error>(())
/// ```
pub mod prelude;

/// ECMA-335 metadata decoding.
///
/// See [`metadata::image::Image`] for the entry point and [`metadata::view::MetadataView`]
/// for the decoded rows.
pub mod metadata;

/// Detection and naming of native-interop methods.
pub mod interop;

/// Per-file analysis and batch scanning.
pub mod analysis;

/// `nativescope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// # Example
///
/// ```rust,no_run
/// use nativescope::{Image, Result};
///
/// fn region_size(path: &str) -> Result<usize> {
///     let image = Image::from_file(std::path::Path::new(path))?;
///     Ok(image.region().len)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `nativescope` Error type
///
/// Every failure of a per-file analysis is one of its variants. See [`Error`] for the
/// classification.
pub use error::Error;

/// A managed PE image with its located metadata region.
///
/// # Example
///
/// ```rust,no_run
/// use nativescope::Image;
/// let image = Image::from_file(std::path::Path::new("Library.dll"))?;
/// println!("metadata at {:#x}", image.region().offset);
/// # Ok::<(), nativescope::Error>(())
/// ```
pub use metadata::image::{Image, MetadataRegion};

/// Decoded type and method rows of one metadata region.
pub use metadata::view::{MetadataView, MethodRow, TypeRow};

/// Metadata streams for direct access to the decoded structures.
pub use metadata::streams::{StreamHeader, Strings, TablesHeader};

/// Provides access to low-level file and memory parsing utilities.
///
/// # Example
///
/// ```rust
/// use nativescope::Parser;
/// let data = [0x42, 0x53, 0x4A, 0x42];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_le::<u32>()?, 0x424A_5342);
/// # Ok::<(), nativescope::Error>(())
/// ```
pub use file::{parser::Parser, File};
