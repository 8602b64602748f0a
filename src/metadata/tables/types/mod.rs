//! Core infrastructure for reading metadata tables.
//!
//! - [`MetadataTable`]: typed view over the rows of one table
//! - [`RowReadable`]: how a row type is sized and decoded
//! - [`TableInfo`]: row counts plus the index widths derived from them
//! - [`CodedIndexType`]: the compact cross-table references and their target tables
//! - [`TableId`]: every table id of ECMA-335 II.22

mod codedindex;
mod tableid;
mod tableinfo;

use crate::Result;
use std::marker::PhantomData;

pub use codedindex::{CodedIndexType, CodedIndexTypeIter};
pub use tableid::{TableId, TableIdIter};
pub use tableinfo::{
    TableInfo, TableInfoRef, TableRowInfo, HEAP_EXTRA_DATA, HEAP_LARGE_BLOB, HEAP_LARGE_GUID,
    HEAP_LARGE_STRINGS,
};

/// A row type that can be decoded from a metadata table.
pub trait RowReadable: Sized + Send {
    /// The table this row type belongs to
    const TABLE: TableId;

    /// Size of one row in bytes, given the index widths in `sizes`.
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Decodes the row with id `rid` at `*offset` and advances `offset` past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if the row is cut off.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// Typed, lazily decoded view over the rows of one table.
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    sizes: TableInfoRef,
    _phantom: PhantomData<T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Creates a view over `row_count` rows stored in `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if `data` is too short for `row_count` rows.
    pub fn new(data: &'a [u8], row_count: u32, sizes: TableInfoRef) -> Result<Self> {
        let row_size = T::row_size(&sizes);
        let needed = u64::from(row_count) * u64::from(row_size);
        if needed > data.len() as u64 {
            return Err(out_of_bounds!());
        }

        Ok(MetadataTable {
            data,
            row_count,
            row_size,
            sizes,
            _phantom: PhantomData,
        })
    }

    /// Size of the table in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_size)
    }

    /// Size of one row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Decodes the row with the 1-based id `index`.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<T> {
        if index == 0 || self.row_count < index {
            return None;
        }

        T::row_read(
            self.data,
            &mut ((index as usize - 1) * self.row_size as usize),
            index,
            &self.sizes,
        )
        .ok()
    }

    /// Iterates over all rows in table order.
    #[must_use]
    pub fn iter(&'a self) -> TableIterator<'a, T> {
        TableIterator {
            table: self,
            current_row: 0,
            current_offset: 0,
        }
    }

    /// Decodes every row, failing on the first row that cannot be read.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedMetadata`] if a row is cut off.
    pub fn read_all(&self) -> Result<Vec<T>> {
        let mut rows = Vec::with_capacity(self.row_count as usize);
        let mut offset = 0;
        for rid in 1..=self.row_count {
            rows.push(T::row_read(self.data, &mut offset, rid, &self.sizes)?);
        }

        Ok(rows)
    }
}

impl<'a, T: RowReadable> IntoIterator for &'a MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
pub struct TableIterator<'a, T> {
    table: &'a MetadataTable<'a, T>,
    current_row: u32,
    current_offset: usize,
}

impl<'a, T: RowReadable> Iterator for TableIterator<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        match T::row_read(
            self.table.data,
            &mut self.current_offset,
            self.current_row + 1,
            &self.table.sizes,
        ) {
            Ok(row) => {
                self.current_row += 1;
                Some(row)
            }
            Err(_) => None,
        }
    }
}
