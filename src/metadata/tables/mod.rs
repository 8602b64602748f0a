//! Metadata tables (ECMA-335 II.22).
//!
//! Only the tables that describe types, methods and their nesting are decoded into row
//! types. Every other table is still sized precisely through [`TableInfo::row_size`], so the
//! layout can step over it.
//!
//! # Key Components
//!
//! - [`TypeDefRaw`] - type definitions with their name, namespace and method run
//! - [`MethodDefRaw`] - method definitions with their name and attribute flags
//! - [`MethodPtrRaw`] - method indirection used by unoptimized table streams
//! - [`NestedClassRaw`] - nesting relation between type definitions
//! - [`MetadataTable`] - typed view over the rows of one table

mod methoddef;
mod methodptr;
mod nestedclass;
mod typedef;
mod types;

pub use methoddef::MethodDefRaw;
pub use methodptr::MethodPtrRaw;
pub use nestedclass::NestedClassRaw;
pub use typedef::TypeDefRaw;
pub use types::*;
