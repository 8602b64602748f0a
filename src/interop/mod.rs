//! Native-interop detection on top of the decoded metadata.
//!
//! [`classify`] picks the methods that cross into native code: P/Invoke imports
//! (`PinvokeImpl`) and unmanaged exports. [`qualified_name`] turns such a method into the
//! dotted name it is reported under.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nativescope::{interop, Image};
//! use std::path::Path;
//!
//! let image = Image::from_file(Path::new("Library.dll"))?;
//! let view = image.metadata()?;
//! for found in interop::classify(view.method_rows()) {
//!     let method = &view.method_rows()[found.index];
//!     println!("{} {}", found.kind, interop::qualified_name(&view, method)?);
//! }
//! # Ok::<(), nativescope::Error>(())
//! ```

mod classifier;
mod names;

pub use classifier::{classify, InteropMethod, NativeInteropFlag};
pub use names::qualified_name;
