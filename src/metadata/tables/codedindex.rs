//! Coded index families and the coded token codec.
//!
//! Coded indices are a space-efficient encoding used by the metadata tables to reference
//! rows in any of several tables with a single integer: the low bits carry a tag selecting
//! the target table out of an ordered family, the remaining bits carry the row index.
//! The number of tag bits is `ceil(log2(family length))`.
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// The coded index families defined by ECMA-335 II.24.2.6.
///
/// Each family is an ordered list of tables; the position of a table in the list is its
/// tag value. Family order is load-bearing: changing it silently re-targets every coded
/// reference.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// References `TypeDef`, `TypeRef`, or `TypeSpec` tables.
    TypeDefOrRef,

    /// References `Field`, `Param`, or `Property` tables.
    HasConstant,

    /// References any entity that can carry custom attributes (22 tables).
    HasCustomAttribute,

    /// References `Field` or `Param` tables.
    HasFieldMarshal,

    /// References `TypeDef`, `MethodDef`, or `Assembly` tables.
    HasDeclSecurity,

    /// References `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, or `TypeSpec` tables.
    MemberRefParent,

    /// References `Event` or `Property` tables.
    HasSemantics,

    /// References `MethodDef` or `MemberRef` tables.
    MethodDefOrRef,

    /// References `Field` or `MethodDef` tables.
    MemberForwarded,

    /// References `File`, `AssemblyRef`, or `ExportedType` tables.
    Implementation,

    /// References the constructor of a custom attribute.
    ///
    /// Tags 0, 1 and 4 are "not used" per the standard (tag 0 historically selected a
    /// string); the unused slots are mapped to placeholder tables so the 3-bit tag of
    /// the physical format is preserved.
    CustomAttributeType,

    /// References `Module`, `ModuleRef`, `AssemblyRef`, or `TypeRef` tables.
    ResolutionScope,

    /// References `TypeDef` or `MethodDef` tables.
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// Returns the ordered table family encoded by this coded index type.
    ///
    /// The position of a table in the returned slice is its tag value.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity, // The standard PDF labels this slot 'Permission' (no such table exists)
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Returns the number of tag bits this family occupies (`ceil(log2(len))`).
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        let len = self.tables().len() as u32;
        // len >= 2 for every family
        (u32::BITS - (len - 1).leading_zeros()) as u8
    }
}

/// A decoded coded index: the target table and the wire-level row id.
///
/// The row id follows the physical format's 1-based convention, with 0 acting as the
/// null reference. Cell materialization normalizes non-null ids to 0-based ordinals;
/// this type stays at the wire level so that [`CodedIndex::encode`] round-trips every
/// decodable raw value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodedIndex {
    /// The table this index refers to
    pub table: TableId,
    /// The 1-based row id within that table (0 = null)
    pub row: u32,
}

impl CodedIndex {
    /// Decode a raw coded index value against a family.
    ///
    /// # Arguments
    /// * `raw` - The encoded value as read from a table column
    /// * `family` - The coded index family the column belongs to
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag selects no family member.
    pub fn decode(raw: u32, family: CodedIndexType) -> Result<CodedIndex> {
        let tables = family.tables();
        let tag_bits = family.tag_bits();
        let tag = (raw & ((1 << tag_bits) - 1)) as usize;

        let Some(table) = tables.get(tag).copied() else {
            return Err(malformed_error!(
                "Coded index tag {} has no member in {:?}",
                tag,
                family
            ));
        };

        Ok(CodedIndex {
            table,
            row: raw >> tag_bits,
        })
    }

    /// Encode this index back into its raw wire value for a family.
    ///
    /// Inverse of [`CodedIndex::decode`]. The tag is the position of `self.table` in the
    /// family; for families with duplicate placeholder entries the first position wins.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `self.table` is not a member of the family.
    pub fn encode(&self, family: CodedIndexType) -> Result<u32> {
        let tables = family.tables();

        let Some(tag) = tables.iter().position(|table| *table == self.table) else {
            return Err(malformed_error!(
                "{:?} is not a member of {:?}",
                self.table,
                family
            ));
        };

        Ok((self.row << family.tag_bits()) | tag as u32)
    }

    /// Reads and decodes a coded index from a table row buffer.
    ///
    /// The column is 2 or 4 bytes wide depending on the family's size context; the
    /// offset is advanced accordingly.
    ///
    /// # Arguments
    /// * `data` - The table data to read from
    /// * `offset` - Mutable reference to the current read position
    /// * `info` - Size context for width resolution and decoding
    /// * `family` - The coded index family of the column
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on a truncated buffer or
    /// [`crate::Error::Malformed`] if the tag selects no family member.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        info: &TableInfoRef,
        family: CodedIndexType,
    ) -> Result<CodedIndex> {
        let raw = if info.coded_index_bytes(family) == 4 {
            read_le_at::<u32>(data, offset)?
        } else {
            u32::from(read_le_at::<u16>(data, offset)?)
        };

        CodedIndex::decode(raw, family)
    }

    /// The metadata token equivalent of this index (table byte | 1-based row id).
    #[must_use]
    pub fn token(&self) -> Token {
        Token::new((u32::from(self.table as u8) << 24) | self.row)
    }
}
