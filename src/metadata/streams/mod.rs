//! Metadata streams.
//!
//! The metadata root is followed by a directory of named streams. The analyzer reads two of
//! them: the `#Strings` heap for identifiers and the table stream (`#~`, or `#-` for
//! unoptimized metadata) for the rows. `#Blob`, `#GUID`, `#US` and any vendor specific
//! streams are located but never decoded.

/// The header of a stream, indicates location + size + name
mod streamheader;
pub use streamheader::StreamHeader;

/// The '#Strings' heap implementation
mod strings;
pub use strings::Strings;

/// The '#~' / '#-' header and table layout
mod tablesheader;
pub use tablesheader::TablesHeader;

/// Name of the string heap stream
pub const STRINGS_STREAM: &str = "#Strings";
/// Name of the compressed table stream
pub const TABLES_STREAM: &str = "#~";
/// Name of the uncompressed table stream, which may use `*Ptr` indirection tables
pub const TABLES_STREAM_UNOPTIMIZED: &str = "#-";
