//! Synthesizes PE images for tests.
//!
//! [`ImageBuilder`] writes a minimal PE32 DLL with a single `.text` section. Managed images
//! carry a CLI header at RVA `0x2000` followed by metadata produced by [`MetadataBuilder`].
//! This file only depends on `std`, so integration tests and benches include it by path.
#![allow(dead_code)]

use std::collections::HashMap;

const METHOD_PUBLIC_STATIC: u16 = 0x0006 | 0x0010 | 0x0080;
const METHOD_UNMANAGED_EXPORT: u16 = 0x0008;
const METHOD_PINVOKE_IMPL: u16 = 0x2000;

const TYPE_PUBLIC: u32 = 0x0000_0001;
const TYPE_NESTED_PUBLIC: u32 = 0x0000_0002;

const SECTION_RVA: u32 = 0x2000;
const SECTION_OFFSET: usize = 0x200;
const FILE_ALIGNMENT: usize = 0x200;
const CLI_HEADER_SIZE: u32 = 72;
const METADATA_RVA: u32 = SECTION_RVA + CLI_HEADER_SIZE;

const TABLE_MODULE: u32 = 0x00;
const TABLE_TYPEDEF: u32 = 0x02;
const TABLE_METHODPTR: u32 = 0x05;
const TABLE_METHODDEF: u32 = 0x06;
const TABLE_CUSTOMATTRIBUTE: u32 = 0x0C;
const TABLE_NESTEDCLASS: u32 = 0x29;

/// A method row to emit.
#[derive(Clone, Debug)]
pub struct TestMethod {
    name: Vec<u8>,
    flags: u16,
}

impl TestMethod {
    pub fn new(name: &str, flags: u16) -> Self {
        Self::raw(name.as_bytes(), flags)
    }

    /// Name bytes are written as given, they do not have to be UTF-8.
    pub fn raw(name: &[u8], flags: u16) -> Self {
        TestMethod {
            name: name.to_vec(),
            flags,
        }
    }

    pub fn pinvoke(name: &str) -> Self {
        Self::new(name, METHOD_PUBLIC_STATIC | METHOD_PINVOKE_IMPL)
    }

    pub fn export(name: &str) -> Self {
        Self::new(name, METHOD_PUBLIC_STATIC | METHOD_UNMANAGED_EXPORT)
    }

    pub fn managed(name: &str) -> Self {
        Self::new(name, METHOD_PUBLIC_STATIC)
    }
}

/// A type definition with its methods.
#[derive(Clone, Debug)]
pub struct TestType {
    namespace: Vec<u8>,
    name: Vec<u8>,
    enclosing: Option<usize>,
    methods: Vec<TestMethod>,
}

impl TestType {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self::raw(namespace.as_bytes(), name.as_bytes())
    }

    pub fn raw(namespace: &[u8], name: &[u8]) -> Self {
        TestType {
            namespace: namespace.to_vec(),
            name: name.to_vec(),
            enclosing: None,
            methods: Vec::new(),
        }
    }

    /// A nested type. `enclosing` is the index of the enclosing type in the `TypeDef` table,
    /// where index 0 is `<Module>` and added types follow in order.
    pub fn nested(name: &str, enclosing: usize) -> Self {
        TestType {
            enclosing: Some(enclosing),
            ..Self::new("", name)
        }
    }

    pub fn with_method(mut self, method: TestMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// Writes an ECMA-335 metadata region.
///
/// The region contains the streams `#~`, `#Strings`, `#US`, `#GUID` and `#Blob`, in that
/// order. `TypeDef` row 1 is always `<Module>`.
#[derive(Clone, Debug)]
pub struct MetadataBuilder {
    version: String,
    types: Vec<TestType>,
    module_methods: Vec<TestMethod>,
    custom_attributes: u32,
    large_strings: bool,
    method_ptr: bool,
    strings: bool,
    tables: bool,
    extra_streams: Vec<(String, Vec<u8>)>,
}

impl Default for MetadataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataBuilder {
    pub fn new() -> Self {
        MetadataBuilder {
            version: "v4.0.30319".to_string(),
            types: Vec::new(),
            module_methods: Vec::new(),
            custom_attributes: 0,
            large_strings: false,
            method_ptr: false,
            strings: true,
            tables: true,
            extra_streams: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_type(mut self, test_type: TestType) -> Self {
        self.types.push(test_type);
        self
    }

    /// Adds a global method, owned by `<Module>`.
    pub fn with_module_method(mut self, method: TestMethod) -> Self {
        self.module_methods.push(method);
        self
    }

    /// Adds `count` `CustomAttribute` rows, laid out between `MethodDef` and `NestedClass`.
    pub fn with_custom_attributes(mut self, count: u32) -> Self {
        self.custom_attributes = count;
        self
    }

    /// Sets the large `#Strings` heap flag and places every name above offset `0xFFFF`.
    pub fn with_large_strings(mut self) -> Self {
        self.large_strings = true;
        self
    }

    /// Writes an uncompressed `#-` stream whose `MethodDef` rows are stored in reverse and
    /// reached through a `MethodPtr` table.
    pub fn with_method_ptr(mut self) -> Self {
        self.method_ptr = true;
        self
    }

    pub fn with_stream(mut self, name: &str, data: Vec<u8>) -> Self {
        self.extra_streams.push((name.to_string(), data));
        self
    }

    pub fn without_strings(mut self) -> Self {
        self.strings = false;
        self
    }

    pub fn without_tables(mut self) -> Self {
        self.tables = false;
        self
    }

    /// Number of `MethodDef` rows the region will contain.
    pub fn method_count(&self) -> usize {
        self.module_methods.len() + self.types.iter().map(|t| t.methods.len()).sum::<usize>()
    }

    pub fn build_metadata(&self) -> Vec<u8> {
        let mut strings = StringHeap::new(self.large_strings);
        let tables = self.build_tables(&mut strings);

        let mut streams: Vec<(String, Vec<u8>)> = Vec::new();
        if self.tables {
            let name = if self.method_ptr { "#-" } else { "#~" };
            streams.push((name.to_string(), tables));
        }
        if self.strings {
            streams.push(("#Strings".to_string(), strings.finish()));
        }
        streams.push(("#US".to_string(), vec![0, 0, 0, 0]));
        streams.push(("#GUID".to_string(), (1..=16).collect()));
        streams.push(("#Blob".to_string(), vec![0, 0, 0, 0]));
        streams.extend(self.extra_streams.iter().cloned());

        let mut version = self.version.as_bytes().to_vec();
        version.push(0);
        pad_to(&mut version, 4);

        let header_len = 16
            + version.len()
            + 4
            + streams
                .iter()
                .map(|(name, _)| 8 + align(name.len() + 1, 4))
                .sum::<usize>();

        let mut out = Vec::new();
        out.extend_from_slice(b"BSJB");
        put_u16(&mut out, 1);
        put_u16(&mut out, 1);
        put_u32(&mut out, 0);
        put_u32(&mut out, version.len() as u32);
        out.extend_from_slice(&version);
        put_u16(&mut out, 0);
        put_u16(&mut out, streams.len() as u16);

        let mut offset = header_len;
        for (name, data) in &streams {
            put_u32(&mut out, offset as u32);
            put_u32(&mut out, data.len() as u32);
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            pad_to(&mut out, 4);
            offset += data.len();
        }

        for (_, data) in &streams {
            out.extend_from_slice(data);
        }

        out
    }

    fn build_tables(&self, strings: &mut StringHeap) -> Vec<u8> {
        let method_count = self.method_count() as u32;
        let type_count = self.types.len() as u32 + 1;
        let nested: Vec<(u32, u32)> = self
            .types
            .iter()
            .enumerate()
            .filter_map(|(index, t)| t.enclosing.map(|e| (index as u32 + 2, e as u32 + 1)))
            .collect();

        let str_width = if self.large_strings { 4 } else { 2 };
        let method_width = index_width(method_count);
        let type_width = index_width(type_count);
        let extends_width = coded_width(type_count, 2);
        let parent_width = coded_width(type_count.max(method_count), 5);
        let attribute_type_width = coded_width(method_count, 3);

        let mut rows: Vec<(u32, u32)> = vec![(TABLE_MODULE, 1), (TABLE_TYPEDEF, type_count)];
        if self.method_ptr && method_count > 0 {
            rows.push((TABLE_METHODPTR, method_count));
        }
        if method_count > 0 {
            rows.push((TABLE_METHODDEF, method_count));
        }
        if self.custom_attributes > 0 {
            rows.push((TABLE_CUSTOMATTRIBUTE, self.custom_attributes));
        }
        if !nested.is_empty() {
            rows.push((TABLE_NESTEDCLASS, nested.len() as u32));
        }

        let mut out = Vec::new();
        put_u32(&mut out, 0);
        out.push(2);
        out.push(0);
        out.push(u8::from(self.large_strings));
        out.push(1);
        let valid = rows.iter().fold(0_u64, |valid, (id, _)| valid | 1 << id);
        put_u64(&mut out, valid);
        put_u64(&mut out, 1 << TABLE_CUSTOMATTRIBUTE | 1 << TABLE_NESTEDCLASS);
        for (_, count) in &rows {
            put_u32(&mut out, *count);
        }

        // Module
        put_u16(&mut out, 0);
        put_index(&mut out, strings.intern(b"Test.dll"), str_width);
        put_u16(&mut out, 1);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);

        // TypeDef, methods are numbered in logical (run) order
        let mut methods: Vec<&TestMethod> = self.module_methods.iter().collect();
        put_u32(&mut out, 0);
        put_index(&mut out, strings.intern(b"<Module>"), str_width);
        put_index(&mut out, 0, str_width);
        put_index(&mut out, 0, extends_width);
        put_index(&mut out, 1, 2);
        put_index(&mut out, 1, method_width);
        for test_type in &self.types {
            let flags = if test_type.enclosing.is_some() {
                TYPE_NESTED_PUBLIC
            } else {
                TYPE_PUBLIC
            };
            put_u32(&mut out, flags);
            put_index(&mut out, strings.intern(&test_type.name), str_width);
            put_index(&mut out, strings.intern(&test_type.namespace), str_width);
            put_index(&mut out, 0, extends_width);
            put_index(&mut out, 1, 2);
            put_index(&mut out, methods.len() as u32 + 1, method_width);
            methods.extend(test_type.methods.iter());
        }

        // MethodPtr + MethodDef
        let physical: Vec<&TestMethod> = if self.method_ptr {
            for position in 1..=method_count {
                put_index(&mut out, method_count - position + 1, method_width);
            }
            methods.iter().rev().copied().collect()
        } else {
            methods
        };
        for method in physical {
            put_u32(&mut out, 0);
            put_u16(&mut out, 0);
            put_u16(&mut out, method.flags);
            put_index(&mut out, strings.intern(&method.name), str_width);
            put_index(&mut out, 0, 2);
            put_index(&mut out, 1, 2);
        }

        // CustomAttribute, parent = TypeDef 1, type = MethodDef 1
        for _ in 0..self.custom_attributes {
            put_index(&mut out, 1 << 5 | 3, parent_width);
            put_index(&mut out, 1 << 3 | 2, attribute_type_width);
            put_index(&mut out, 0, 2);
        }

        // NestedClass
        for (nested_class, enclosing_class) in nested {
            put_index(&mut out, nested_class, type_width);
            put_index(&mut out, enclosing_class, type_width);
        }

        pad_to(&mut out, 4);
        out
    }
}

struct StringHeap {
    data: Vec<u8>,
    offsets: HashMap<Vec<u8>, u32>,
}

impl StringHeap {
    fn new(large: bool) -> Self {
        let size = if large { 0x1_0000 } else { 1 };
        StringHeap {
            data: vec![0; size],
            offsets: HashMap::new(),
        }
    }

    fn intern(&mut self, value: &[u8]) -> u32 {
        if value.is_empty() {
            return 0;
        }
        if let Some(offset) = self.offsets.get(value) {
            return *offset;
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(value);
        self.data.push(0);
        self.offsets.insert(value.to_vec(), offset);
        offset
    }

    fn finish(mut self) -> Vec<u8> {
        pad_to(&mut self.data, 4);
        self.data
    }
}

/// Writes a PE32 DLL with one `.text` section at RVA `0x2000`.
#[derive(Clone, Debug)]
pub struct ImageBuilder {
    metadata: Option<MetadataBuilder>,
    metadata_directory: Option<(u32, u32)>,
    cli_header_size: u32,
    raw_data_pointer: u32,
}

impl ImageBuilder {
    /// A managed image; without further types it only defines `<Module>`.
    pub fn new() -> Self {
        ImageBuilder {
            metadata: Some(MetadataBuilder::new()),
            metadata_directory: None,
            cli_header_size: CLI_HEADER_SIZE,
            raw_data_pointer: SECTION_OFFSET as u32,
        }
    }

    /// A native image, its CLR runtime header directory is empty.
    pub fn native() -> Self {
        ImageBuilder {
            metadata: None,
            ..Self::new()
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataBuilder) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_type(mut self, test_type: TestType) -> Self {
        self.metadata = Some(self.metadata.unwrap_or_default().with_type(test_type));
        self
    }

    /// Overrides the metadata directory of the CLI header.
    pub fn with_metadata_directory(mut self, rva: u32, size: u32) -> Self {
        self.metadata_directory = Some((rva, size));
        self
    }

    /// Overrides the `cb` field of the CLI header.
    pub fn with_cli_header_size(mut self, size: u32) -> Self {
        self.cli_header_size = size;
        self
    }

    /// Overrides `PointerToRawData` of the `.text` section header.
    pub fn with_raw_data_pointer(mut self, pointer: u32) -> Self {
        self.raw_data_pointer = pointer;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut section = Vec::new();
        let clr_directory = match &self.metadata {
            Some(metadata) => {
                let metadata = metadata.build_metadata();
                let (rva, size) = self
                    .metadata_directory
                    .unwrap_or((METADATA_RVA, metadata.len() as u32));

                put_u32(&mut section, self.cli_header_size);
                put_u16(&mut section, 2);
                put_u16(&mut section, 5);
                put_u32(&mut section, rva);
                put_u32(&mut section, size);
                put_u32(&mut section, 0x0000_0001);
                put_u32(&mut section, 0);
                section.resize(CLI_HEADER_SIZE as usize, 0);
                section.extend_from_slice(&metadata);

                (SECTION_RVA, CLI_HEADER_SIZE)
            }
            None => {
                // xor eax, eax; ret
                section.extend_from_slice(&[0x31, 0xC0, 0xC3]);
                (0, 0)
            }
        };

        let virtual_size = section.len() as u32;
        let raw_size = align(section.len(), FILE_ALIGNMENT);
        section.resize(raw_size, 0);
        write_pe(&section, virtual_size, clr_directory, self.raw_data_pointer)
    }
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_pe(
    section: &[u8],
    virtual_size: u32,
    clr_directory: (u32, u32),
    raw_data_pointer: u32,
) -> Vec<u8> {
    let mut out = vec![0_u8; 0x80];
    out[0] = b'M';
    out[1] = b'Z';
    out[0x3C..0x40].copy_from_slice(&0x80_u32.to_le_bytes());

    out.extend_from_slice(b"PE\0\0");

    // COFF header
    put_u16(&mut out, 0x014C);
    put_u16(&mut out, 1);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    put_u16(&mut out, 224);
    put_u16(&mut out, 0x2102);

    // PE32 optional header, standard fields
    put_u16(&mut out, 0x010B);
    out.push(8);
    out.push(0);
    put_u32(&mut out, section.len() as u32);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    put_u32(&mut out, SECTION_RVA);
    put_u32(&mut out, 0);

    // Windows fields
    put_u32(&mut out, 0x1000_0000);
    put_u32(&mut out, 0x2000);
    put_u32(&mut out, FILE_ALIGNMENT as u32);
    put_u16(&mut out, 4);
    put_u16(&mut out, 0);
    put_u16(&mut out, 0);
    put_u16(&mut out, 0);
    put_u16(&mut out, 4);
    put_u16(&mut out, 0);
    put_u32(&mut out, 0);
    put_u32(&mut out, SECTION_RVA + align(section.len(), 0x2000) as u32);
    put_u32(&mut out, SECTION_OFFSET as u32);
    put_u32(&mut out, 0);
    put_u16(&mut out, 3);
    put_u16(&mut out, 0x8540);
    put_u32(&mut out, 0x0010_0000);
    put_u32(&mut out, 0x1000);
    put_u32(&mut out, 0x0010_0000);
    put_u32(&mut out, 0x1000);
    put_u32(&mut out, 0);
    put_u32(&mut out, 16);

    // Data directories, index 14 is the CLR runtime header
    for index in 0..16 {
        let (rva, size) = if index == 14 { clr_directory } else { (0, 0) };
        put_u32(&mut out, rva);
        put_u32(&mut out, size);
    }

    // .text
    out.extend_from_slice(b".text\0\0\0");
    put_u32(&mut out, virtual_size);
    put_u32(&mut out, SECTION_RVA);
    put_u32(&mut out, section.len() as u32);
    put_u32(&mut out, raw_data_pointer);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    put_u16(&mut out, 0);
    put_u16(&mut out, 0);
    put_u32(&mut out, 0x6000_0020);

    out.resize(SECTION_OFFSET, 0);
    out.extend_from_slice(section);
    out
}

fn index_width(rows: u32) -> usize {
    if rows > u32::from(u16::MAX) {
        4
    } else {
        2
    }
}

fn coded_width(max_rows: u32, tag_bits: u32) -> usize {
    if max_rows >= 1 << (16 - tag_bits) {
        4
    } else {
        2
    }
}

fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

fn pad_to(out: &mut Vec<u8>, alignment: usize) {
    out.resize(align(out.len(), alignment), 0);
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_index(out: &mut Vec<u8>, value: u32, width: usize) {
    if width == 4 {
        put_u32(out, value);
    } else {
        put_u16(out, value as u16);
    }
}
