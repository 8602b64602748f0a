//! Per-file analysis and batch scanning.
//!
//! [`analyze_file`] is the per-file boundary: it opens an image, decodes its metadata and
//! returns one [`FindingRecord`] per native-interop method, or the error that stopped it.
//! [`scan`] runs that boundary over a list of paths, sequentially or on the `rayon` pool,
//! and never aborts on a failing file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nativescope::analysis::{scan, ScanOptions};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.dll"), PathBuf::from("b.exe")];
//! let report = scan(&paths, &ScanOptions::default(), |file| {
//!     println!("Analyzing {}...", file.path.display());
//! });
//!
//! for finding in report.findings() {
//!     println!("{finding}");
//! }
//! ```

mod report;
mod scan;

pub use report::{analyze_file, analyze_image, analyze_mem, FindingRecord};
pub use scan::{scan, FileReport, ScanOptions, ScanReport};
