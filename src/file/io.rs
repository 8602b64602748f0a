//! Bounds-checked little-endian reads.
//!
//! Everything in a PE image and in ECMA-335 metadata is little-endian. The helpers here are
//! the only place the crate turns raw bytes into integers, and each of them checks the
//! requested range before touching the buffer, so malformed input surfaces as
//! [`crate::Error::TruncatedMetadata`] instead of a panic.
//!
//! # Key Components
//!
//! - [`CilIO`] - integer types that can be decoded from a fixed number of bytes
//! - [`read_le`] - read a value from the start of a buffer
//! - [`read_le_at`] - read a value at an offset and advance the offset
//! - [`read_le_at_dyn`] - read a 2- or 4-byte index, widened to `u32`

use crate::Result;

/// Integer types with a fixed little-endian byte representation.
pub trait CilIO: Sized {
    /// The byte array this type is decoded from
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decode from little-endian bytes
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty),*) => {$(
        impl CilIO for $ty {
            type Bytes = [u8; std::mem::size_of::<$ty>()];

            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                <$ty>::from_le_bytes(bytes)
            }
        }
    )*};
}

impl_cil_io!(u8, u16, u32, u64);

/// Reads a `T` from the beginning of `data`.
///
/// # Errors
/// Returns [`crate::Error::TruncatedMetadata`] if `data` is shorter than `T`.
///
/// # Examples
///
/// ```rust,ignore
/// let data = [0x01, 0x00, 0x00, 0x00];
/// let value: u32 = read_le(&data)?;
/// assert_eq!(value, 1);
/// ```
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a `T` at `*offset` and advances `offset` past it.
///
/// On failure `offset` is left untouched.
///
/// # Errors
/// Returns [`crate::Error::TruncatedMetadata`] if the read would cross the end of `data`.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds!());
    };
    if end > data.len() {
        return Err(out_of_bounds!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds!());
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Reads either a 2-byte or a 4-byte value, depending on `is_large`, and widens it to `u32`.
///
/// Metadata heap and table indexes use this encoding: their width depends on the size of the
/// heap or table they point into.
///
/// # Errors
/// Returns [`crate::Error::TruncatedMetadata`] if the read would cross the end of `data`.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}
