use log::{debug, trace};
use strum::EnumCount;

use crate::{
    file::io::read_le,
    metadata::tables::{
        MetadataTable, RowReadable, TableId, TableInfo, TableInfoRef, HEAP_EXTRA_DATA,
    },
    Result,
};
use std::sync::Arc;

/// The header of the `#~` / `#-` table stream and the location of every table in it.
///
/// The header is followed by one u32 row count per present table, and then by the rows of
/// all present tables, in ascending table id order. Row sizes depend on the heap-size flags
/// and on every row count, so the layout is computed once, up front.
///
/// Tables this crate has no schema for (ids `0x2D` and above, e.g. portable PDB tables) end
/// the layout: nothing after them can be located, and nothing after them is needed.
///
/// # Examples
///
/// ```rust,ignore
/// use nativescope::metadata::streams::TablesHeader;
/// use nativescope::metadata::tables::{MethodDefRaw, TableId};
///
/// let header = TablesHeader::from(tables_stream)?;
/// if let Some(methods) = header.table::<MethodDefRaw>() {
///     for method in &methods {
///         println!("{} flags {:#06x}", method.token, method.flags);
///     }
/// }
/// ```
pub struct TablesHeader<'a> {
    /// Major version of the table schema
    pub major_version: u8,
    /// Minor version of the table schema
    pub minor_version: u8,
    /// Heap-size flags
    pub heap_sizes: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and index widths
    pub info: TableInfoRef,
    tables: Vec<Option<&'a [u8]>>,
}

impl<'a> TablesHeader<'a> {
    /// Parses the header of a table stream and lays out its tables.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the header, the row counts or any table
    /// extends past the end of `data`.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(out_of_bounds!());
        }

        let heap_sizes = read_le::<u8>(&data[6..])?;
        let valid = read_le::<u64>(&data[8..])?;
        let info = Arc::new(TableInfo::new(data, valid, heap_sizes)?);

        let mut current_offset = 24 + valid.count_ones() as usize * 4;
        if heap_sizes & HEAP_EXTRA_DATA != 0 {
            current_offset += 4;
        }
        if current_offset > data.len() {
            return Err(out_of_bounds!());
        }

        let mut tables = vec![None; TableId::COUNT];
        for bit in 0..64_usize {
            if valid & (1 << bit) == 0 {
                continue;
            }

            #[allow(clippy::cast_possible_truncation)]
            let Some(table_id) = TableId::from_repr(bit as u8) else {
                debug!("Table stream: no schema for table {bit:#04x}, stopping layout");
                break;
            };

            let rows = info.rows_at(bit);
            if rows == 0 {
                continue;
            }

            let size = u64::from(info.row_size(table_id)) * u64::from(rows);
            let Some(end) = usize::try_from(size)
                .ok()
                .and_then(|size| current_offset.checked_add(size))
            else {
                return Err(out_of_bounds!());
            };
            if end > data.len() {
                return Err(out_of_bounds!());
            }

            trace!("Table {table_id:?}: {rows} rows at {current_offset:#x}");
            tables[table_id as usize] = Some(&data[current_offset..end]);
            current_offset = end;
        }

        debug!(
            "Table stream: {} tables, heap sizes {:#04x}",
            valid.count_ones(),
            heap_sizes
        );

        Ok(TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            heap_sizes,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            tables,
        })
    }

    /// Number of tables marked present in the `valid` vector.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Returns `true` if `table_id` is present and has at least one row.
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        matches!(self.tables.get(table_id as usize), Some(Some(_)))
    }

    /// Typed access to the rows of `T::TABLE`, `None` if the table is absent or empty.
    #[must_use]
    pub fn table<T: RowReadable>(&self) -> Option<MetadataTable<'a, T>> {
        let data = (*self.tables.get(T::TABLE as usize)?)?;
        MetadataTable::new(data, self.info.get(T::TABLE).rows, self.info.clone()).ok()
    }
}
