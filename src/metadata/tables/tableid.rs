//! Identifiers for the physical metadata tables.
//!
//! Each table kind has a fixed ordinal assigned by ECMA-335; the ordinal addresses the
//! presence bitmask in the table stream header and forms the high byte of metadata tokens.
//!
//! # Reference
//! - [ECMA-335 II.22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use strum::{EnumCount, EnumIter};

/// Identifies one of the physical metadata tables defined by ECMA-335 II.22.
///
/// The discriminant is the table's physical ordinal (0x00..=0x2C). This range covers the
/// runtime tables including the `*Ptr` indirection tables and the edit-and-continue log
/// tables; the Portable-PDB debug tables (0x30+) are not decoded by this library.
#[derive(Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TableId {
    /// Current module descriptor (exactly one row). `TableId` = 0x00
    Module = 0x00,
    /// References to types defined in other modules. `TableId` = 0x01
    TypeRef = 0x01,
    /// Types defined in the current module. `TableId` = 0x02
    TypeDef = 0x02,
    /// Field indirection table (uncompressed streams only). `TableId` = 0x03
    FieldPtr = 0x03,
    /// Fields of types. `TableId` = 0x04
    Field = 0x04,
    /// Method indirection table (uncompressed streams only). `TableId` = 0x05
    MethodPtr = 0x05,
    /// Methods defined in the current module. `TableId` = 0x06
    MethodDef = 0x06,
    /// Parameter indirection table (uncompressed streams only). `TableId` = 0x07
    ParamPtr = 0x07,
    /// Parameters of methods. `TableId` = 0x08
    Param = 0x08,
    /// Interfaces implemented by types. `TableId` = 0x09
    InterfaceImpl = 0x09,
    /// References to members of other modules. `TableId` = 0x0A
    MemberRef = 0x0A,
    /// Compile-time constants for fields, params and properties. `TableId` = 0x0B
    Constant = 0x0B,
    /// Custom attribute attachments. `TableId` = 0x0C
    CustomAttribute = 0x0C,
    /// Marshalling descriptors for fields and params. `TableId` = 0x0D
    FieldMarshal = 0x0D,
    /// Declarative security attachments. `TableId` = 0x0E
    DeclSecurity = 0x0E,
    /// Explicit class layout information. `TableId` = 0x0F
    ClassLayout = 0x0F,
    /// Explicit field offsets. `TableId` = 0x10
    FieldLayout = 0x10,
    /// Standalone signatures. `TableId` = 0x11
    StandAloneSig = 0x11,
    /// Maps types to their events. `TableId` = 0x12
    EventMap = 0x12,
    /// Event indirection table (uncompressed streams only). `TableId` = 0x13
    EventPtr = 0x13,
    /// Events of types. `TableId` = 0x14
    Event = 0x14,
    /// Maps types to their properties. `TableId` = 0x15
    PropertyMap = 0x15,
    /// Property indirection table (uncompressed streams only). `TableId` = 0x16
    PropertyPtr = 0x16,
    /// Properties of types. `TableId` = 0x17
    Property = 0x17,
    /// Associates getters/setters/adders with events and properties. `TableId` = 0x18
    MethodSemantics = 0x18,
    /// Explicit method overrides. `TableId` = 0x19
    MethodImpl = 0x19,
    /// References to other modules of this assembly. `TableId` = 0x1A
    ModuleRef = 0x1A,
    /// Type specifications (generic instantiations etc.). `TableId` = 0x1B
    TypeSpec = 0x1B,
    /// P/Invoke mappings. `TableId` = 0x1C
    ImplMap = 0x1C,
    /// Initial field data locations. `TableId` = 0x1D
    FieldRVA = 0x1D,
    /// Edit-and-continue log. `TableId` = 0x1E
    EncLog = 0x1E,
    /// Edit-and-continue token map. `TableId` = 0x1F
    EncMap = 0x1F,
    /// Current assembly descriptor. `TableId` = 0x20
    Assembly = 0x20,
    /// Deprecated processor table for the current assembly. `TableId` = 0x21
    AssemblyProcessor = 0x21,
    /// Deprecated OS table for the current assembly. `TableId` = 0x22
    AssemblyOS = 0x22,
    /// References to other assemblies. `TableId` = 0x23
    AssemblyRef = 0x23,
    /// Deprecated processor table for assembly references. `TableId` = 0x24
    AssemblyRefProcessor = 0x24,
    /// Deprecated OS table for assembly references. `TableId` = 0x25
    AssemblyRefOS = 0x25,
    /// Files of a multi-file assembly. `TableId` = 0x26
    File = 0x26,
    /// Types exported from other modules of this assembly. `TableId` = 0x27
    ExportedType = 0x27,
    /// Manifest resources. `TableId` = 0x28
    ManifestResource = 0x28,
    /// Nesting relationships between types. `TableId` = 0x29
    NestedClass = 0x29,
    /// Generic parameters of types and methods. `TableId` = 0x2A
    GenericParam = 0x2A,
    /// Instantiated generic methods. `TableId` = 0x2B
    MethodSpec = 0x2B,
    /// Constraints on generic parameters. `TableId` = 0x2C
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Map a physical table ordinal to its `TableId`.
    ///
    /// Returns `None` for ordinals outside the decoded range (e.g. the Portable-PDB
    /// debug tables at 0x30 and above).
    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<TableId> {
        use strum::IntoEnumIterator;

        TableId::iter().find(|id| *id as u8 == ordinal)
    }
}
