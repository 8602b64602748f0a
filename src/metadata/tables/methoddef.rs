use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `MethodDef` table. `TableId` = 0x06
#[derive(Clone, Debug)]
pub struct MethodDefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// RVA of the method body, 0 for abstract, runtime and P/Invoke methods
    pub rva: u32,
    /// `MethodImplAttributes` bitmask
    pub impl_flags: u16,
    /// `MethodAttributes` bitmask
    pub flags: u16,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap
    pub signature: u32,
    /// an index into the `Param` table
    pub param_list: u32,
}

impl RowReadable for MethodDefRaw {
    const TABLE: TableId = TableId::MethodDef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */           4 +
            /* impl_flags */    2 +
            /* flags */         2 +
            /* name */          sizes.str_bytes() +
            /* signature */     sizes.blob_bytes() +
            /* param_list */    sizes.table_index_bytes(TableId::Param)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodDefRaw {
            rid,
            token: Token::from_row(TableId::MethodDef, rid),
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::metadata::tables::{MetadataTable, TableInfo};

    use super::*;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x00, 0x00, 0x00, 0x00, // rva
            0x80, 0x00, // impl_flags = PreserveSig
            0x96, 0x20, // flags = Public | Static | HideBySig | PinvokeImpl
            0x05, 0x00, // name
            0x06, 0x00, // signature
            0x01, 0x00, // param_list
            0x50, 0x20, 0x00, 0x00, // rva
            0x00, 0x00, // impl_flags
            0x06, 0x18, // flags = Public | SpecialName | RTSpecialName
            0x0A, 0x00, // name
            0x0B, 0x00, // signature
            0x02, 0x00, // param_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MethodDef, 2)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 2, sizes).unwrap();
        let rows = table.read_all().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].token.value(), 0x06000001);
        assert_eq!(rows[0].rva, 0);
        assert_eq!(rows[0].impl_flags, 0x0080);
        assert_eq!(rows[0].flags, 0x2096);
        assert_eq!(rows[0].name, 5);
        assert_eq!(rows[0].signature, 6);
        assert_eq!(rows[0].param_list, 1);

        assert_eq!(rows[1].rid, 2);
        assert_eq!(rows[1].rva, 0x2050);
        assert_eq!(rows[1].flags, 0x1806);
        assert_eq!(rows[1].name, 0x0A);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x00, 0x00, 0x00, 0x00, // rva
            0x00, 0x00, // impl_flags
            0x08, 0x00, // flags
            0x01, 0x02, 0x03, 0x04, // name
            0x05, 0x06, 0x07, 0x08, // signature
            0x01, 0x00, 0x01, 0x00, // param_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Param, u16::MAX as u32 + 2)],
            true,
            true,
            false,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 1, sizes).unwrap();
        let row = table.get(1).unwrap();

        assert_eq!(row.flags, 0x0008);
        assert_eq!(row.name, 0x04030201);
        assert_eq!(row.signature, 0x08070605);
        assert_eq!(row.param_list, 0x00010001);
    }

    #[test]
    fn truncated_table() {
        let data = vec![0u8; 20];
        let sizes = Arc::new(TableInfo::new_test(&[], false, false, false));
        assert!(MetadataTable::<MethodDefRaw>::new(&data, 2, sizes).is_err());
    }
}
