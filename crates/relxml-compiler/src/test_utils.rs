//! Test fixtures: small schemas covering the foreign-key shapes naming cares about.

use std::sync::Arc;

use relxml_core::{
    CaseSensitivity, Field, ForeignKey, RelationId, RelationMetadata, SchemaMetadata,
};

use crate::naming::{ChildCollectionsStyle, DefaultElementNamer};
use crate::spec::OutputSpecFactory;

pub fn rel(name: &str) -> RelationId {
    RelationId::unqualified(name)
}

/// `drug(id, name)` <- `drug_link(drug_id, compound_id)` via `drug_link.drug_id`.
pub fn drug_schema() -> SchemaMetadata {
    SchemaMetadata::builder(CaseSensitivity::Lower)
        .relation(RelationMetadata::table(
            rel("drug"),
            vec![
                Field::new("id").db_type("integer").primary_key_part(1),
                Field::new("name").db_type("varchar(100)"),
            ],
        ))
        .relation(RelationMetadata::table(
            rel("drug_link"),
            vec![
                Field::new("drug_id").db_type("integer").nullable(false),
                Field::new("compound_id").db_type("integer").nullable(false),
            ],
        ))
        .foreign_key(ForeignKey::new(
            rel("drug_link"),
            rel("drug"),
            [("drug_id", "id")],
        ))
        .build()
        .unwrap()
}

/// [`drug_schema`] plus `compound(id, display_name)` referenced by `drug_link.compound_id`.
pub fn drug_compound_schema() -> SchemaMetadata {
    SchemaMetadata::builder(CaseSensitivity::Lower)
        .table(rel("drug"), &["id", "name"])
        .table(rel("drug_link"), &["drug_id", "compound_id"])
        .table(rel("compound"), &["id", "display_name"])
        .foreign_key(ForeignKey::new(
            rel("drug_link"),
            rel("drug"),
            [("drug_id", "id")],
        ))
        .foreign_key(ForeignKey::new(
            rel("drug_link"),
            rel("compound"),
            [("compound_id", "id")],
        ))
        .build()
        .unwrap()
}

/// `c(id, a, b)` referencing `p(id)` twice, through `a` and through `b`.
pub fn two_fk_schema() -> SchemaMetadata {
    SchemaMetadata::builder(CaseSensitivity::Lower)
        .table(rel("p"), &["id"])
        .table(rel("c"), &["id", "a", "b"])
        .foreign_key(ForeignKey::new(rel("c"), rel("p"), [("a", "id")]))
        .foreign_key(ForeignKey::new(rel("c"), rel("p"), [("b", "id")]))
        .build()
        .unwrap()
}

/// `c(id, p_id)` and `p(id, c_id)` referencing each other once.
pub fn mutual_schema() -> SchemaMetadata {
    SchemaMetadata::builder(CaseSensitivity::Lower)
        .table(rel("p"), &["id", "c_id"])
        .table(rel("c"), &["id", "p_id"])
        .foreign_key(ForeignKey::new(rel("c"), rel("p"), [("p_id", "id")]))
        .foreign_key(ForeignKey::new(rel("p"), rel("c"), [("c_id", "id")]))
        .build()
        .unwrap()
}

/// `employee(id, name, manager_id)` referencing itself.
pub fn self_ref_schema() -> SchemaMetadata {
    SchemaMetadata::builder(CaseSensitivity::Lower)
        .table(rel("employee"), &["id", "name", "manager_id"])
        .foreign_key(ForeignKey::new(
            rel("employee"),
            rel("employee"),
            [("manager_id", "id")],
        ))
        .build()
        .unwrap()
}

/// Two `item` relations in different schemas, plus an unrelated `order_line`.
pub fn shared_name_schema() -> SchemaMetadata {
    SchemaMetadata::builder(CaseSensitivity::Lower)
        .table(RelationId::new(Some("sales"), "item"), &["id"])
        .table(RelationId::new(Some("stock"), "item"), &["id"])
        .table(RelationId::new(Some("sales"), "order_line"), &["id", "item_id"])
        .foreign_key(ForeignKey::new(
            RelationId::new(Some("sales"), "order_line"),
            RelationId::new(Some("sales"), "item"),
            [("item_id", "id")],
        ))
        .build()
        .unwrap()
}

pub fn factory(schema: &SchemaMetadata, style: ChildCollectionsStyle) -> OutputSpecFactory<'_> {
    OutputSpecFactory::builder()
        .schema(schema)
        .namer(Arc::new(DefaultElementNamer))
        .style(style)
        .build()
        .unwrap()
}
