//! Static column schemas for the metadata tables.
//!
//! Row layout is driven entirely by these schemas: each table kind maps to a fixed,
//! ordered column list reproducing ECMA-335 II.22. The byte width of a column is not part
//! of the schema - fixed columns aside, widths depend on the heap-size flags and on other
//! tables' row counts and are resolved by [`crate::metadata::tables::TableInfo`].
//!
//! # Reference
//! - [ECMA-335 II.22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::metadata::tables::{CodedIndexType, TableId};

/// The shape of one table column.
///
/// Together with the size context in [`crate::metadata::tables::TableInfo`], a
/// `ColumnKind` fully determines how many bytes the column occupies and how its raw
/// value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Fixed 2-byte little-endian value
    Fixed16,
    /// Fixed 4-byte little-endian value
    Fixed32,
    /// Index into the `#Strings` heap (2 or 4 bytes per the heap-size flags)
    StringIdx,
    /// Index into the `#GUID` heap (2 or 4 bytes per the heap-size flags)
    GuidIdx,
    /// Index into the `#Blob` heap (2 or 4 bytes per the heap-size flags)
    BlobIdx,
    /// 1-based row index into a single fixed target table (2 bytes, or 4 if the
    /// target has 2^16 rows or more)
    SimpleRef(TableId),
    /// Coded index multiplexing a row reference across the tables of one
    /// [`CodedIndexType`] family
    CodedRef(CodedIndexType),
}

/// One named column of a table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// The column name as printed in ECMA-335 II.22
    pub name: &'static str,
    /// The column shape
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

/// Returns the ordered column list for a table kind.
///
/// The lists reproduce ECMA-335 II.22 verbatim; columns are decoded left-to-right with
/// no inter-column padding.
#[must_use]
pub fn columns(id: TableId) -> &'static [Column] {
    use ColumnKind::{BlobIdx, CodedRef, Fixed16, Fixed32, GuidIdx, SimpleRef, StringIdx};

    match id {
        TableId::Module => const { &[
            col("Generation", Fixed16),
            col("Name", StringIdx),
            col("Mvid", GuidIdx),
            col("EncId", GuidIdx),
            col("EncBaseId", GuidIdx),
        ] },
        TableId::TypeRef => const { &[
            col("ResolutionScope", CodedRef(CodedIndexType::ResolutionScope)),
            col("TypeName", StringIdx),
            col("TypeNamespace", StringIdx),
        ] },
        TableId::TypeDef => const { &[
            col("Flags", Fixed32),
            col("TypeName", StringIdx),
            col("TypeNamespace", StringIdx),
            col("Extends", CodedRef(CodedIndexType::TypeDefOrRef)),
            col("FieldList", SimpleRef(TableId::Field)),
            col("MethodList", SimpleRef(TableId::MethodDef)),
        ] },
        TableId::FieldPtr => const { &[col("Field", SimpleRef(TableId::Field))] },
        TableId::Field => const { &[
            col("Flags", Fixed16),
            col("Name", StringIdx),
            col("Signature", BlobIdx),
        ] },
        TableId::MethodPtr => const { &[col("Method", SimpleRef(TableId::MethodDef))] },
        TableId::MethodDef => const { &[
            col("RVA", Fixed32),
            col("ImplFlags", Fixed16),
            col("Flags", Fixed16),
            col("Name", StringIdx),
            col("Signature", BlobIdx),
            col("ParamList", SimpleRef(TableId::Param)),
        ] },
        TableId::ParamPtr => const { &[col("Param", SimpleRef(TableId::Param))] },
        TableId::Param => const { &[
            col("Flags", Fixed16),
            col("Sequence", Fixed16),
            col("Name", StringIdx),
        ] },
        TableId::InterfaceImpl => const { &[
            col("Class", SimpleRef(TableId::TypeDef)),
            col("Interface", CodedRef(CodedIndexType::TypeDefOrRef)),
        ] },
        TableId::MemberRef => const { &[
            col("Class", CodedRef(CodedIndexType::MemberRefParent)),
            col("Name", StringIdx),
            col("Signature", BlobIdx),
        ] },
        TableId::Constant => const { &[
            // One byte of element type plus one byte of padding, decoded as a unit
            col("Type", Fixed16),
            col("Parent", CodedRef(CodedIndexType::HasConstant)),
            col("Value", BlobIdx),
        ] },
        TableId::CustomAttribute => const { &[
            col("Parent", CodedRef(CodedIndexType::HasCustomAttribute)),
            col("Type", CodedRef(CodedIndexType::CustomAttributeType)),
            col("Value", BlobIdx),
        ] },
        TableId::FieldMarshal => const { &[
            col("Parent", CodedRef(CodedIndexType::HasFieldMarshal)),
            col("NativeType", BlobIdx),
        ] },
        TableId::DeclSecurity => const { &[
            col("Action", Fixed16),
            col("Parent", CodedRef(CodedIndexType::HasDeclSecurity)),
            col("PermissionSet", BlobIdx),
        ] },
        TableId::ClassLayout => const { &[
            col("PackingSize", Fixed16),
            col("ClassSize", Fixed32),
            col("Parent", SimpleRef(TableId::TypeDef)),
        ] },
        TableId::FieldLayout => const { &[
            col("Offset", Fixed32),
            col("Field", SimpleRef(TableId::Field)),
        ] },
        TableId::StandAloneSig => const { &[col("Signature", BlobIdx)] },
        TableId::EventMap => const { &[
            col("Parent", SimpleRef(TableId::TypeDef)),
            col("EventList", SimpleRef(TableId::Event)),
        ] },
        TableId::EventPtr => const { &[col("Event", SimpleRef(TableId::Event))] },
        TableId::Event => const { &[
            col("EventFlags", Fixed16),
            col("Name", StringIdx),
            col("EventType", CodedRef(CodedIndexType::TypeDefOrRef)),
        ] },
        TableId::PropertyMap => const { &[
            col("Parent", SimpleRef(TableId::TypeDef)),
            col("PropertyList", SimpleRef(TableId::Property)),
        ] },
        TableId::PropertyPtr => const { &[col("Property", SimpleRef(TableId::Property))] },
        TableId::Property => const { &[
            col("Flags", Fixed16),
            col("Name", StringIdx),
            col("Type", BlobIdx),
        ] },
        TableId::MethodSemantics => const { &[
            col("Semantics", Fixed16),
            col("Method", SimpleRef(TableId::MethodDef)),
            col("Association", CodedRef(CodedIndexType::HasSemantics)),
        ] },
        TableId::MethodImpl => const { &[
            col("Class", SimpleRef(TableId::TypeDef)),
            col("MethodBody", CodedRef(CodedIndexType::MethodDefOrRef)),
            col("MethodDeclaration", CodedRef(CodedIndexType::MethodDefOrRef)),
        ] },
        TableId::ModuleRef => const { &[col("Name", StringIdx)] },
        TableId::TypeSpec => const { &[col("Signature", BlobIdx)] },
        TableId::ImplMap => const { &[
            col("MappingFlags", Fixed16),
            col("MemberForwarded", CodedRef(CodedIndexType::MemberForwarded)),
            col("ImportName", StringIdx),
            col("ImportScope", SimpleRef(TableId::ModuleRef)),
        ] },
        TableId::FieldRVA => const { &[
            col("RVA", Fixed32),
            col("Field", SimpleRef(TableId::Field)),
        ] },
        TableId::EncLog => const { &[col("Token", Fixed32), col("FuncCode", Fixed32)] },
        TableId::EncMap => const { &[col("Token", Fixed32)] },
        TableId::Assembly => const { &[
            col("HashAlgId", Fixed32),
            col("MajorVersion", Fixed16),
            col("MinorVersion", Fixed16),
            col("BuildNumber", Fixed16),
            col("RevisionNumber", Fixed16),
            col("Flags", Fixed32),
            col("PublicKey", BlobIdx),
            col("Name", StringIdx),
            col("Culture", StringIdx),
        ] },
        TableId::AssemblyProcessor => const { &[col("Processor", Fixed32)] },
        TableId::AssemblyOS => const { &[
            col("OSPlatformID", Fixed32),
            col("OSMajorVersion", Fixed32),
            col("OSMinorVersion", Fixed32),
        ] },
        TableId::AssemblyRef => const { &[
            col("MajorVersion", Fixed16),
            col("MinorVersion", Fixed16),
            col("BuildNumber", Fixed16),
            col("RevisionNumber", Fixed16),
            col("Flags", Fixed32),
            col("PublicKeyOrToken", BlobIdx),
            col("Name", StringIdx),
            col("Culture", StringIdx),
            col("HashValue", BlobIdx),
        ] },
        TableId::AssemblyRefProcessor => const { &[
            col("Processor", Fixed32),
            col("AssemblyRef", SimpleRef(TableId::AssemblyRef)),
        ] },
        TableId::AssemblyRefOS => const { &[
            col("OSPlatformID", Fixed32),
            col("OSMajorVersion", Fixed32),
            col("OSMinorVersion", Fixed32),
            col("AssemblyRef", SimpleRef(TableId::AssemblyRef)),
        ] },
        TableId::File => const { &[
            col("Flags", Fixed32),
            col("Name", StringIdx),
            col("HashValue", BlobIdx),
        ] },
        TableId::ExportedType => const { &[
            col("Flags", Fixed32),
            col("TypeDefId", Fixed32),
            col("TypeName", StringIdx),
            col("TypeNamespace", StringIdx),
            col("Implementation", CodedRef(CodedIndexType::Implementation)),
        ] },
        TableId::ManifestResource => const { &[
            col("Offset", Fixed32),
            col("Flags", Fixed32),
            col("Name", StringIdx),
            col("Implementation", CodedRef(CodedIndexType::Implementation)),
        ] },
        TableId::NestedClass => const { &[
            col("NestedClass", SimpleRef(TableId::TypeDef)),
            col("EnclosingClass", SimpleRef(TableId::TypeDef)),
        ] },
        TableId::GenericParam => const { &[
            col("Number", Fixed16),
            col("Flags", Fixed16),
            col("Owner", CodedRef(CodedIndexType::TypeOrMethodDef)),
            col("Name", StringIdx),
        ] },
        TableId::MethodSpec => const { &[
            col("Method", CodedRef(CodedIndexType::MethodDefOrRef)),
            col("Instantiation", BlobIdx),
        ] },
        TableId::GenericParamConstraint => const { &[
            col("Owner", SimpleRef(TableId::GenericParam)),
            col("Constraint", CodedRef(CodedIndexType::TypeDefOrRef)),
        ] },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_table_has_columns() {
        for id in TableId::iter() {
            assert!(!columns(id).is_empty(), "no schema for {:?}", id);
        }
    }

    #[test]
    fn typedef_layout() {
        let cols = columns(TableId::TypeDef);
        assert_eq!(cols.len(), 6);
        assert_eq!(cols[0].name, "Flags");
        assert_eq!(cols[0].kind, ColumnKind::Fixed32);
        assert_eq!(cols[3].name, "Extends");
        assert_eq!(
            cols[3].kind,
            ColumnKind::CodedRef(CodedIndexType::TypeDefOrRef)
        );
        assert_eq!(cols[5].kind, ColumnKind::SimpleRef(TableId::MethodDef));
    }

    #[test]
    fn lookup_by_name() {
        let cols = columns(TableId::MethodDef);
        let rva = cols.iter().find(|c| c.name == "RVA").unwrap();
        assert_eq!(rva.kind, ColumnKind::Fixed32);
    }
}
