//! Decoded view of the metadata needed to name native-interop methods.
//!
//! [`MetadataView::decode`] turns a metadata region into two index-addressable row vectors:
//! every type definition with its nesting link, and every method definition with its flags
//! and declaring type. Names stay as `#Strings` offsets and are resolved on demand.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nativescope::Image;
//! use std::path::Path;
//!
//! let image = Image::from_file(Path::new("Library.dll"))?;
//! let view = image.metadata()?;
//! for method in view.method_rows() {
//!     let owner = &view.type_rows()[method.declaring_type];
//!     println!(
//!         "{}::{}",
//!         view.strings().resolve(owner.name)?,
//!         view.strings().resolve(method.name)?
//!     );
//! }
//! # Ok::<(), nativescope::Error>(())
//! ```

use log::debug;

use crate::{
    metadata::{
        method::MethodAttributes,
        root::Root,
        streams::{
            Strings, TablesHeader, STRINGS_STREAM, TABLES_STREAM, TABLES_STREAM_UNOPTIMIZED,
        },
        tables::{MethodDefRaw, MethodPtrRaw, NestedClassRaw, TableId, TypeDefRaw},
        token::Token,
    },
    Result,
};

/// A type definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRow {
    /// Token of the `TypeDef` row
    pub token: Token,
    /// `#Strings` offset of the type name
    pub name: u32,
    /// `#Strings` offset of the namespace, empty for nested types
    pub namespace: u32,
    /// Index of the enclosing type in [`MetadataView::type_rows`], for nested types
    pub enclosing_type: Option<usize>,
}

/// A method definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRow {
    /// Token of the `MethodDef` row
    pub token: Token,
    /// `#Strings` offset of the method name
    pub name: u32,
    /// Method attribute flags
    pub flags: MethodAttributes,
    /// Index of the declaring type in [`MetadataView::type_rows`]
    pub declaring_type: usize,
}

/// Types, methods and the string heap of one metadata region.
///
/// Borrows the region; it lives no longer than the [`crate::Image`] it was decoded from.
pub struct MetadataView<'a> {
    version: String,
    stream_names: Vec<String>,
    strings: Strings<'a>,
    types: Vec<TypeRow>,
    methods: Vec<MethodRow>,
}

impl<'a> MetadataView<'a> {
    /// Decodes the metadata region `data`.
    ///
    /// # Errors
    /// - [`crate::Error::InvalidContainer`] for a bad root signature, a missing `#Strings` or
    ///   table stream, nesting rows that name missing types, cyclic nesting, or methods that
    ///   belong to no type
    /// - [`crate::Error::TruncatedMetadata`] if any structure extends past the region
    pub fn decode(data: &'a [u8]) -> Result<MetadataView<'a>> {
        let root = Root::read(data)?;

        let Some(strings_stream) = root.stream(STRINGS_STREAM) else {
            return Err(invalid_container!("Metadata has no #Strings stream"));
        };
        let Some(tables_stream) = root
            .stream(TABLES_STREAM)
            .or_else(|| root.stream(TABLES_STREAM_UNOPTIMIZED))
        else {
            return Err(invalid_container!("Metadata has no #~ or #- stream"));
        };

        let strings = Strings::from(stream_data(data, strings_stream.offset, strings_stream.size))?;
        let tables = TablesHeader::from(stream_data(
            data,
            tables_stream.offset,
            tables_stream.size,
        ))?;

        let type_defs = match tables.table::<TypeDefRaw>() {
            Some(table) => table.read_all()?,
            None => Vec::new(),
        };
        let method_defs = match tables.table::<MethodDefRaw>() {
            Some(table) => table.read_all()?,
            None => Vec::new(),
        };
        let method_ptrs = match tables.table::<MethodPtrRaw>() {
            Some(table) => Some(
                table
                    .read_all()?
                    .into_iter()
                    .map(|row| row.method)
                    .collect::<Vec<u32>>(),
            ),
            None => None,
        };

        let mut types: Vec<TypeRow> = type_defs
            .iter()
            .map(|row| TypeRow {
                token: row.token,
                name: row.type_name,
                namespace: row.type_namespace,
                enclosing_type: None,
            })
            .collect();

        if let Some(nested_classes) = tables.table::<NestedClassRaw>() {
            for row in nested_classes.read_all()? {
                let nested = type_index(types.len(), row.nested_class, row.token)?;
                let enclosing = type_index(types.len(), row.enclosing_class, row.token)?;
                types[nested].enclosing_type = Some(enclosing);
            }
        }
        check_nesting(&types)?;

        let declaring_types =
            assign_declaring_types(&type_defs, method_defs.len(), method_ptrs.as_deref())?;
        let methods = method_defs
            .iter()
            .zip(declaring_types)
            .map(|(row, declaring_type)| MethodRow {
                token: row.token,
                name: row.name,
                flags: MethodAttributes::from_bits_retain(row.flags),
                declaring_type,
            })
            .collect::<Vec<MethodRow>>();

        let stream_names: Vec<String> = root
            .stream_headers
            .iter()
            .map(|stream| stream.name.clone())
            .collect();

        debug!(
            "Metadata {}: {} types, {} methods, streams {:?}{}",
            root.version,
            types.len(),
            methods.len(),
            stream_names,
            if method_ptrs.is_some() {
                ", MethodPtr indirection"
            } else {
                ""
            }
        );

        Ok(MetadataView {
            version: root.version,
            stream_names,
            strings,
            types,
            methods,
        })
    }

    /// All type definitions, in `TypeDef` table order.
    #[must_use]
    pub fn type_rows(&self) -> &[TypeRow] {
        &self.types
    }

    /// All method definitions, in `MethodDef` table order.
    #[must_use]
    pub fn method_rows(&self) -> &[MethodRow] {
        &self.methods
    }

    /// The type definition at `index`.
    #[must_use]
    pub fn type_row(&self, index: usize) -> Option<&TypeRow> {
        self.types.get(index)
    }

    /// The `#Strings` heap.
    #[must_use]
    pub fn strings(&self) -> &Strings<'a> {
        &self.strings
    }

    /// Names of all streams in the stream directory, in directory order.
    #[must_use]
    pub fn stream_names(&self) -> &[String] {
        &self.stream_names
    }

    /// Runtime version string from the metadata root.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Root::read guarantees every stream lies inside the region.
fn stream_data(data: &[u8], offset: u32, size: u32) -> &[u8] {
    let start = offset as usize;
    &data[start..start + size as usize]
}

fn type_index(type_count: usize, rid: u32, token: Token) -> Result<usize> {
    if rid == 0 || rid as usize > type_count {
        return Err(invalid_container!(
            "NestedClass {} refers to missing TypeDef row {}",
            token,
            rid
        ));
    }

    Ok(rid as usize - 1)
}

/// Every nesting chain must end at a top-level type.
fn check_nesting(types: &[TypeRow]) -> Result<()> {
    // 0 = not visited yet, otherwise the (1-based) walk that first reached the type
    let mut visited = vec![0_usize; types.len()];

    for start in 0..types.len() {
        if visited[start] != 0 {
            continue;
        }

        let walk = start + 1;
        let mut current = start;
        loop {
            if visited[current] == walk {
                return Err(invalid_container!(
                    "Cyclic nesting involving type {}",
                    types[current].token
                ));
            }
            if visited[current] != 0 {
                break;
            }

            visited[current] = walk;
            match types[current].enclosing_type {
                Some(enclosing) => current = enclosing,
                None => break,
            }
        }
    }

    Ok(())
}

/// Assigns every method to the type whose method run contains it.
///
/// `TypeDef.method_list` is the first position of each type's run; a position belongs to the
/// last type whose run starts at or before it. Positions are `MethodDef` rows, or `MethodPtr`
/// rows when that table is present.
fn assign_declaring_types(
    types: &[TypeDefRaw],
    method_count: usize,
    method_ptrs: Option<&[u32]>,
) -> Result<Vec<usize>> {
    // suffix minimum of run starts, non-decreasing
    let mut run_floor = vec![0_u32; types.len()];
    let mut min = u32::MAX;
    for (index, row) in types.iter().enumerate().rev() {
        min = min.min(row.method_list);
        run_floor[index] = min;
    }

    let owner_of = |position: u32| -> Option<usize> {
        run_floor
            .partition_point(|&start| start <= position)
            .checked_sub(1)
    };

    let mut owners: Vec<Option<usize>> = vec![None; method_count];
    let positions = method_ptrs.map_or(method_count, <[u32]>::len);
    for position in 1..=positions {
        let method = match method_ptrs {
            Some(ptrs) => ptrs[position - 1] as usize,
            None => position,
        };
        if method == 0 || method > method_count {
            return Err(invalid_container!(
                "MethodPtr row {} refers to missing MethodDef row {}",
                position,
                method
            ));
        }

        if let Some(owner) = owner_of(position as u32) {
            owners[method - 1] = Some(owner);
        }
    }

    owners
        .into_iter()
        .enumerate()
        .map(|(index, owner)| {
            owner.ok_or_else(|| {
                invalid_container!(
                    "Method {} is not owned by any type",
                    Token::from_row(TableId::MethodDef, index as u32 + 1)
                )
            })
        })
        .collect()
}
