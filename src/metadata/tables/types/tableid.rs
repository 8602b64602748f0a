use strum::{EnumCount, EnumIter, FromRepr};

/// Identifiers of the ECMA-335 metadata tables (II.22).
///
/// The discriminant is the table's bit position in the `valid` vector of the table stream
/// header, and tables are laid out in ascending order of it.
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, FromRepr, Eq, Hash)]
#[repr(u8)]
pub enum TableId {
    /// The current module
    Module = 0x00,
    /// References to types in other modules or assemblies
    TypeRef = 0x01,
    /// Types defined in this module
    TypeDef = 0x02,
    /// Indirection into `Field`, only in unoptimized (`#-`) streams
    FieldPtr = 0x03,
    /// Field definitions
    Field = 0x04,
    /// Indirection into `MethodDef`, only in unoptimized (`#-`) streams
    MethodPtr = 0x05,
    /// Method definitions
    MethodDef = 0x06,
    /// Indirection into `Param`, only in unoptimized (`#-`) streams
    ParamPtr = 0x07,
    /// Parameter definitions
    Param = 0x08,
    /// Interfaces implemented by types
    InterfaceImpl = 0x09,
    /// References to fields and methods of other types
    MemberRef = 0x0A,
    /// Constant values of fields, parameters and properties
    Constant = 0x0B,
    /// Custom attribute instances
    CustomAttribute = 0x0C,
    /// Marshalling descriptors
    FieldMarshal = 0x0D,
    /// Declarative security
    DeclSecurity = 0x0E,
    /// Explicit layout of types
    ClassLayout = 0x0F,
    /// Explicit field offsets
    FieldLayout = 0x10,
    /// Stand-alone signatures
    StandAloneSig = 0x11,
    /// Maps types to their events
    EventMap = 0x12,
    /// Indirection into `Event`, only in unoptimized (`#-`) streams
    EventPtr = 0x13,
    /// Event definitions
    Event = 0x14,
    /// Maps types to their properties
    PropertyMap = 0x15,
    /// Indirection into `Property`, only in unoptimized (`#-`) streams
    PropertyPtr = 0x16,
    /// Property definitions
    Property = 0x17,
    /// Associates methods with events and properties
    MethodSemantics = 0x18,
    /// Explicit method overrides
    MethodImpl = 0x19,
    /// References to other modules
    ModuleRef = 0x1A,
    /// Type specifications
    TypeSpec = 0x1B,
    /// P/Invoke mappings
    ImplMap = 0x1C,
    /// Initial data of fields
    FieldRVA = 0x1D,
    /// Edit-and-continue log
    EncLog = 0x1E,
    /// Edit-and-continue token map
    EncMap = 0x1F,
    /// The current assembly
    Assembly = 0x20,
    /// Unused
    AssemblyProcessor = 0x21,
    /// Unused
    AssemblyOS = 0x22,
    /// References to other assemblies
    AssemblyRef = 0x23,
    /// Unused
    AssemblyRefProcessor = 0x24,
    /// Unused
    AssemblyRefOS = 0x25,
    /// Files of a multi-file assembly
    File = 0x26,
    /// Types exported from other modules
    ExportedType = 0x27,
    /// Manifest resources
    ManifestResource = 0x28,
    /// Nesting relation between types
    NestedClass = 0x29,
    /// Generic parameters
    GenericParam = 0x2A,
    /// Generic method instantiations
    MethodSpec = 0x2B,
    /// Constraints of generic parameters
    GenericParamConstraint = 0x2C,
}
