use crate::{
    file::parser::Parser,
    metadata::streams::StreamHeader,
    Result,
};

/// Magic value at the start of the metadata root, "BSJB".
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The metadata root (ECMA-335 II.24.2.1) and its stream directory.
///
/// Every stream header is checked to lie inside the metadata region, so callers can slice
/// streams out of the region without further checks.
pub struct Root {
    /// Magic signature, always [`CIL_HEADER_MAGIC`]
    pub signature: u32,
    /// Major version, 1
    pub major_version: u16,
    /// Minor version, 1
    pub minor_version: u16,
    /// Reserved, 0
    pub reserved: u32,
    /// Length of the version string as stored, including padding
    pub length: u32,
    /// Runtime version string, e.g. `v4.0.30319`
    pub version: String,
    /// Reserved, 0
    pub flags: u16,
    /// Number of streams
    pub stream_number: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Reads the metadata root from the start of the metadata region `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContainer`] if the signature does not match, or
    /// [`crate::Error::TruncatedMetadata`] if the root or any stream lies outside `data`.
    pub fn read(data: &[u8]) -> Result<Root> {
        let mut parser = Parser::new(data);

        let signature = parser.read_le::<u32>()?;
        if signature != CIL_HEADER_MAGIC {
            return Err(invalid_container!(
                "CIL_HEADER_MAGIC does not match - {:#x}",
                signature
            ));
        }

        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let reserved = parser.read_le::<u32>()?;
        let length = parser.read_le::<u32>()?;

        let version_bytes = parser.read_bytes(length as usize)?;
        let version_len = version_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(version_bytes.len());
        let version = String::from_utf8_lossy(&version_bytes[..version_len]).into_owned();
        parser.align(4)?;

        let flags = parser.read_le::<u16>()?;
        let stream_number = parser.read_le::<u16>()?;

        let mut stream_headers = Vec::with_capacity(usize::from(stream_number).min(16));
        for _ in 0..stream_number {
            let stream = StreamHeader::from(&data[parser.pos()..])?;
            parser.advance_by(stream.encoded_len())?;

            let Some(end) = stream.offset.checked_add(stream.size) else {
                return Err(out_of_bounds!());
            };
            if end as usize > data.len() {
                return Err(out_of_bounds!());
            }

            stream_headers.push(stream);
        }

        Ok(Root {
            signature,
            major_version,
            minor_version,
            reserved,
            length,
            version,
            flags,
            stream_number,
            stream_headers,
        })
    }

    /// The first stream named `name`.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers.iter().find(|stream| stream.name == name)
    }
}
