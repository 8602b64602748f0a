use strum::{Display, EnumIter, IntoStaticStr};

use crate::metadata::{method::MethodAttributes, view::MethodRow};

/// The kind of native boundary a method declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum NativeInteropFlag {
    /// `PinvokeImpl`: the body is a native function imported through P/Invoke
    PInvokeImplemented,
    /// `UnmanagedExport`: the method is exported to native callers
    UnmanagedExport,
}

impl NativeInteropFlag {
    /// Classifies a set of method attributes.
    ///
    /// A method carrying both bits is a P/Invoke import.
    #[must_use]
    pub fn from_attributes(flags: MethodAttributes) -> Option<Self> {
        if flags.contains(MethodAttributes::PINVOKE_IMPL) {
            Some(NativeInteropFlag::PInvokeImplemented)
        } else if flags.contains(MethodAttributes::UNMANAGED_EXPORT) {
            Some(NativeInteropFlag::UnmanagedExport)
        } else {
            None
        }
    }
}

/// A method that crosses the native boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteropMethod {
    /// Index into [`crate::MetadataView::method_rows`]
    pub index: usize,
    /// Which boundary it crosses
    pub kind: NativeInteropFlag,
}

/// Returns the native-interop methods of `methods`, in row order.
#[must_use]
pub fn classify(methods: &[MethodRow]) -> Vec<InteropMethod> {
    methods
        .iter()
        .enumerate()
        .filter_map(|(index, method)| {
            NativeInteropFlag::from_attributes(method.flags)
                .map(|kind| InteropMethod { index, kind })
        })
        .collect()
}
