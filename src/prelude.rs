//! # nativescope Prelude
//!
//! The most commonly used types and functions of the library, for glob imports.

/// The main error type for all nativescope operations
pub use crate::Error;

/// The result type used throughout nativescope
pub use crate::Result;

/// Image loading and metadata decoding
pub use crate::{Image, MetadataRegion, MetadataView, MethodRow, TypeRow};

/// Low-level file parsing utilities
pub use crate::{File, Parser};

/// Method attribute flags and metadata tokens
pub use crate::metadata::{method::MethodAttributes, token::Token};

/// Native-interop detection
pub use crate::interop::{classify, qualified_name, InteropMethod, NativeInteropFlag};

/// Per-file analysis and batch scanning
pub use crate::analysis::{
    analyze_file, analyze_mem, scan, FileReport, FindingRecord, ScanOptions, ScanReport,
};
