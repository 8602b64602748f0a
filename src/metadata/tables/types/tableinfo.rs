use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::read_le_at,
    metadata::tables::types::{CodedIndexType, TableId},
    Result,
};

/// Heap-size flag: `#Strings` indexes are 4 bytes wide.
pub const HEAP_LARGE_STRINGS: u8 = 0x01;
/// Heap-size flag: `#GUID` indexes are 4 bytes wide.
pub const HEAP_LARGE_GUID: u8 = 0x02;
/// Heap-size flag: `#Blob` indexes are 4 bytes wide.
pub const HEAP_LARGE_BLOB: u8 = 0x04;
/// Heap-size flag: an extra u32 follows the row counts.
pub const HEAP_EXTRA_DATA: u8 = 0x40;

/// Row count of one table and the index width it implies.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// Number of rows
    pub rows: u32,
    /// Bits needed to address every row
    pub bits: u8,
    /// `true` if indexes into this table are 4 bytes wide
    pub is_large: bool,
}

impl TableRowInfo {
    /// Derives the index width for a table with `rows` rows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            // 32 - leading_zeros is at most 32
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Row counts of every table plus the heap and coded index widths derived from them.
///
/// All widths are computed up front from the complete row count vector, since a row of one
/// table can index into any table laid out after it.
#[derive(Clone, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Shared handle to a [`TableInfo`].
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Reads the row counts that follow the table stream header.
    ///
    /// `data` is the whole table stream. One u32 is read per set bit of `valid_bitvec`,
    /// including bits of tables this crate has no schema for.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the row counts are cut off.
    pub fn new(data: &[u8], valid_bitvec: u64, heap_size_flags: u8) -> Result<Self> {
        let mut rows = vec![TableRowInfo::default(); 64];
        let mut next_row_offset = 24;

        for (bit, row_info) in rows.iter_mut().enumerate() {
            if (valid_bitvec & (1 << bit)) == 0 {
                continue;
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            *row_info = TableRowInfo::new(row_count);
        }

        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & HEAP_LARGE_STRINGS != 0,
            is_large_index_guid: heap_size_flags & HEAP_LARGE_GUID != 0,
            is_large_index_blob: heap_size_flags & HEAP_LARGE_BLOB != 0,
        };

        table_info.calculate_coded_index_bits();

        Ok(table_info)
    }

    /// Builds a [`TableInfo`] from explicit row counts.
    #[cfg(test)]
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); 64],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for valid_table in valid_tables {
            table_info.rows[valid_table.0 as usize] = TableRowInfo::new(valid_table.1);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Row count of the table at bit position `bit` of the `valid` vector.
    #[must_use]
    pub fn rows_at(&self, bit: usize) -> u32 {
        self.rows.get(bit).map_or(0, |info| info.rows)
    }

    /// Returns `true` if indexes into `id` are 4 bytes wide.
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Returns `true` if `#Strings` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Returns `true` if `#Blob` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Returns `true` if coded indexes of kind `coded_index_type` are 4 bytes wide.
    #[must_use]
    pub fn is_large_coded(&self, coded_index_type: CodedIndexType) -> bool {
        self.coded_indexes[coded_index_type as usize] > 16
    }

    /// Width of a `#Strings` index.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Width of a `#GUID` index.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Width of a `#Blob` index.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Row count and index width of `table`.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Width of a simple index into `table_id`.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Width of a coded index of kind `coded_index_type`.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.is_large_coded(coded_index_type) {
            4
        } else {
            2
        }
    }

    /// Size in bytes of one row of `table_id`.
    ///
    /// Known for every table of ECMA-335 II.22, which lets the layout step skip tables it
    /// does not otherwise interpret.
    #[must_use]
    #[rustfmt::skip]
    pub fn row_size(&self, table_id: TableId) -> u32 {
        let s = self.str_bytes();
        let g = self.guid_bytes();
        let b = self.blob_bytes();
        let idx = |id: TableId| self.table_index_bytes(id);
        let ci = |kind: CodedIndexType| self.coded_index_bytes(kind);

        u32::from(match table_id {
            TableId::Module                 => 2 + s + g + g + g,
            TableId::TypeRef                => ci(CodedIndexType::ResolutionScope) + s + s,
            TableId::TypeDef                => 4 + s + s + ci(CodedIndexType::TypeDefOrRef) + idx(TableId::Field) + idx(TableId::MethodDef),
            TableId::FieldPtr               => idx(TableId::Field),
            TableId::Field                  => 2 + s + b,
            TableId::MethodPtr              => idx(TableId::MethodDef),
            TableId::MethodDef              => 4 + 2 + 2 + s + b + idx(TableId::Param),
            TableId::ParamPtr               => idx(TableId::Param),
            TableId::Param                  => 2 + 2 + s,
            TableId::InterfaceImpl          => idx(TableId::TypeDef) + ci(CodedIndexType::TypeDefOrRef),
            TableId::MemberRef              => ci(CodedIndexType::MemberRefParent) + s + b,
            TableId::Constant               => 2 + ci(CodedIndexType::HasConstant) + b,
            TableId::CustomAttribute        => ci(CodedIndexType::HasCustomAttribute) + ci(CodedIndexType::CustomAttributeType) + b,
            TableId::FieldMarshal           => ci(CodedIndexType::HasFieldMarshal) + b,
            TableId::DeclSecurity           => 2 + ci(CodedIndexType::HasDeclSecurity) + b,
            TableId::ClassLayout            => 2 + 4 + idx(TableId::TypeDef),
            TableId::FieldLayout            => 4 + idx(TableId::Field),
            TableId::StandAloneSig          => b,
            TableId::EventMap               => idx(TableId::TypeDef) + idx(TableId::Event),
            TableId::EventPtr               => idx(TableId::Event),
            TableId::Event                  => 2 + s + ci(CodedIndexType::TypeDefOrRef),
            TableId::PropertyMap            => idx(TableId::TypeDef) + idx(TableId::Property),
            TableId::PropertyPtr            => idx(TableId::Property),
            TableId::Property               => 2 + s + b,
            TableId::MethodSemantics        => 2 + idx(TableId::MethodDef) + ci(CodedIndexType::HasSemantics),
            TableId::MethodImpl             => idx(TableId::TypeDef) + ci(CodedIndexType::MethodDefOrRef) + ci(CodedIndexType::MethodDefOrRef),
            TableId::ModuleRef              => s,
            TableId::TypeSpec               => b,
            TableId::ImplMap                => 2 + ci(CodedIndexType::MemberForwarded) + s + idx(TableId::ModuleRef),
            TableId::FieldRVA               => 4 + idx(TableId::Field),
            TableId::EncLog                 => 4 + 4,
            TableId::EncMap                 => 4,
            TableId::Assembly               => 4 + 8 + 4 + b + s + s,
            TableId::AssemblyProcessor      => 4,
            TableId::AssemblyOS             => 4 + 4 + 4,
            TableId::AssemblyRef            => 8 + 4 + b + s + s + b,
            TableId::AssemblyRefProcessor   => 4 + idx(TableId::AssemblyRef),
            TableId::AssemblyRefOS          => 4 + 4 + 4 + idx(TableId::AssemblyRef),
            TableId::File                   => 4 + s + b,
            TableId::ExportedType           => 4 + 4 + s + s + ci(CodedIndexType::Implementation),
            TableId::ManifestResource       => 4 + 4 + s + ci(CodedIndexType::Implementation),
            TableId::NestedClass            => idx(TableId::TypeDef) + idx(TableId::TypeDef),
            TableId::GenericParam           => 2 + 2 + ci(CodedIndexType::TypeOrMethodDef) + s,
            TableId::MethodSpec             => ci(CodedIndexType::MethodDefOrRef) + b,
            TableId::GenericParamConstraint => idx(TableId::GenericParam) + ci(CodedIndexType::TypeDefOrRef),
        })
    }

    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_bits = coded_index_type
            .tables()
            .iter()
            .map(|table| self.rows[*table as usize].bits)
            .max()
            .unwrap_or(1);

        max_bits + coded_index_type.tag_bits()
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_info_widths() {
        assert_eq!(TableRowInfo::new(0).bits, 1);
        assert_eq!(TableRowInfo::new(1).bits, 1);
        assert_eq!(TableRowInfo::new(0xFFFF).bits, 16);
        assert!(!TableRowInfo::new(0xFFFF).is_large);
        assert_eq!(TableRowInfo::new(0x1_0000).bits, 17);
        assert!(TableRowInfo::new(0x1_0000).is_large);
    }

    #[test]
    fn small_row_sizes() {
        let info = TableInfo::new_test(&[(TableId::TypeDef, 3), (TableId::MethodDef, 5)], false, false, false);

        assert_eq!(info.row_size(TableId::Module), 10);
        assert_eq!(info.row_size(TableId::TypeDef), 14);
        assert_eq!(info.row_size(TableId::MethodDef), 14);
        assert_eq!(info.row_size(TableId::NestedClass), 4);
        assert_eq!(info.row_size(TableId::CustomAttribute), 6);
        assert_eq!(info.row_size(TableId::Assembly), 22);
        assert_eq!(info.row_size(TableId::AssemblyRef), 20);
        assert_eq!(info.row_size(TableId::EncLog), 8);
    }

    #[test]
    fn wide_heaps() {
        let info = TableInfo::new_test(&[(TableId::TypeDef, 3)], true, true, true);

        assert_eq!(info.row_size(TableId::Module), 2 + 4 * 4);
        assert_eq!(info.row_size(TableId::TypeDef), 4 + 4 + 4 + 2 + 2 + 2);
        assert_eq!(info.row_size(TableId::MethodDef), 8 + 4 + 4 + 2);
    }

    #[test]
    fn coded_index_thresholds() {
        // 2 tag bits: large once a target table reaches 2^14 rows
        let info = TableInfo::new_test(&[(TableId::TypeRef, 0x3FFF)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);
        let info = TableInfo::new_test(&[(TableId::TypeRef, 0x4000)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::MethodDefOrRef), 2);

        // 5 tag bits: large once a target table reaches 2^11 rows
        let info = TableInfo::new_test(&[(TableId::MethodDef, 0x800)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasCustomAttribute), 4);
        assert_eq!(info.table_index_bytes(TableId::MethodDef), 2);
    }

    #[test]
    fn read_row_counts() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00,                         // reserved
            0x02, 0x00,                                     // major, minor
            0x05,                                           // heap sizes: strings + blob
            0x01,                                           // reserved
            0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // valid: TypeDef, MethodDef, bit 56
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sorted
            0x02, 0x00, 0x00, 0x00,                         // TypeDef rows
            0x00, 0x00, 0x01, 0x00,                         // MethodDef rows
            0x07, 0x00, 0x00, 0x00,                         // rows of table 0x38
        ];

        let info = TableInfo::new(&data, 0x0100_0000_0000_0044, data[6]).unwrap();

        assert_eq!(info.get(TableId::TypeDef).rows, 2);
        assert_eq!(info.get(TableId::MethodDef).rows, 0x1_0000);
        assert!(info.is_large(TableId::MethodDef));
        assert_eq!(info.rows_at(0x38), 7);
        assert!(info.is_large_str());
        assert_eq!(info.blob_bytes(), 4);
        assert_eq!(info.guid_bytes(), 2);

        assert!(TableInfo::new(&data[..30], 0x0100_0000_0000_0044, 0).is_err());
    }
}
