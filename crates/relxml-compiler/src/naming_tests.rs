use relxml_core::{FieldSet, RelationId};

use crate::Error;
use crate::naming::{
    ChildCollectionsStyle, DefaultElementNamer, ElementNamer, NamingContext, TypeNamer,
};
use crate::test_utils::{
    drug_schema, mutual_schema, rel, self_ref_schema, shared_name_schema, two_fk_schema,
};

const WRAPPED: ChildCollectionsStyle = ChildCollectionsStyle::Wrapped;
const INLINE: ChildCollectionsStyle = ChildCollectionsStyle::Inline;

#[test]
fn default_names_are_case_folded() {
    let namer = DefaultElementNamer;
    assert_eq!(namer.default_row_element_name(&rel("DRUG")), "drug");
    assert_eq!(
        namer.default_row_element_name(&RelationId::new(Some("X"), "Drug")),
        "drug"
    );
    assert_eq!(
        namer.default_row_collection_element_name(&rel("DRUG_LINK")),
        "drug_link-listing"
    );
}

#[test]
fn single_edge_collection_name() {
    let schema = drug_schema();
    let (child, parent) = (rel("drug_link"), rel("drug"));
    let ctx = NamingContext::new(&schema, &child, &parent, None, WRAPPED);
    let name = DefaultElementNamer.child_collection_element_name(&ctx).unwrap();
    assert_eq!(name, "drug_link-listing");
}

#[test]
fn two_edges_collection_name_by_field_set() {
    let schema = two_fk_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let a = FieldSet::of(["a"]);
    let b = FieldSet::of(["B"]);

    let ctx = NamingContext::new(&schema, &child, &parent, Some(&a), WRAPPED);
    assert_eq!(
        DefaultElementNamer.child_collection_element_name(&ctx).unwrap(),
        "c-listing-from-a"
    );

    let ctx = NamingContext::new(&schema, &child, &parent, Some(&b), WRAPPED);
    assert_eq!(
        DefaultElementNamer.child_collection_element_name(&ctx).unwrap(),
        "c-listing-from-b"
    );
}

#[test]
fn two_edges_collection_name_without_fields_is_ambiguous() {
    let schema = two_fk_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let ctx = NamingContext::new(&schema, &child, &parent, None, WRAPPED);
    let err = DefaultElementNamer
        .child_collection_element_name(&ctx)
        .unwrap_err();
    assert!(matches!(err, Error::AmbiguousForeignKey { .. }));
}

#[test]
fn two_edges_collection_name_with_unknown_fields() {
    let schema = two_fk_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let fields = FieldSet::of(["id"]);
    let ctx = NamingContext::new(&schema, &child, &parent, Some(&fields), WRAPPED);
    let err = DefaultElementNamer
        .child_collection_element_name(&ctx)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no foreign key from c to p with source fields {id}"
    );
}

#[test]
fn mutual_reference_child_row_name_depends_on_style() {
    let schema = mutual_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let fields = FieldSet::of(["p_id"]);

    let inline = NamingContext::new(&schema, &child, &parent, Some(&fields), INLINE);
    assert_eq!(
        DefaultElementNamer.child_row_element_name(&inline).unwrap(),
        "child-c"
    );

    let wrapped = NamingContext::new(&schema, &child, &parent, Some(&fields), WRAPPED);
    assert_eq!(
        DefaultElementNamer.child_row_element_name(&wrapped).unwrap(),
        "c"
    );
}

#[test]
fn mutual_reference_inline_without_fields_fails() {
    let schema = mutual_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let ctx = NamingContext::new(&schema, &child, &parent, None, INLINE);
    assert!(matches!(
        DefaultElementNamer.child_row_element_name(&ctx),
        Err(Error::AmbiguousForeignKey { .. })
    ));
}

#[test]
fn mutual_reference_parent_row_name_depends_on_style() {
    let schema = mutual_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let fields = FieldSet::of(["p_id"]);

    let inline = NamingContext::new(&schema, &child, &parent, Some(&fields), INLINE);
    assert_eq!(
        DefaultElementNamer.parent_row_element_name(&inline).unwrap(),
        "parent-p"
    );

    let wrapped = NamingContext::new(&schema, &child, &parent, None, WRAPPED);
    assert_eq!(
        DefaultElementNamer.parent_row_element_name(&wrapped).unwrap(),
        "p"
    );
}

#[test]
fn multiple_edges_inline_child_row_name() {
    let schema = two_fk_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let fields = FieldSet::of(["b"]);
    let ctx = NamingContext::new(&schema, &child, &parent, Some(&fields), INLINE);
    assert_eq!(
        DefaultElementNamer.child_row_element_name(&ctx).unwrap(),
        "c-child-referencing-via-b"
    );
}

#[test]
fn multiple_edges_parent_row_name_in_any_style() {
    let schema = two_fk_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let fields = FieldSet::of(["a"]);
    for style in [WRAPPED, INLINE] {
        let ctx = NamingContext::new(&schema, &child, &parent, Some(&fields), style);
        assert_eq!(
            DefaultElementNamer.parent_row_element_name(&ctx).unwrap(),
            "p-parent-referenced-via-a"
        );
    }
}

#[test]
fn plain_edge_names_are_unqualified() {
    let schema = drug_schema();
    let (child, parent) = (rel("drug_link"), rel("drug"));
    let ctx = NamingContext::new(&schema, &child, &parent, None, INLINE);
    assert_eq!(
        DefaultElementNamer.child_row_element_name(&ctx).unwrap(),
        "drug_link"
    );
    assert_eq!(
        DefaultElementNamer.parent_row_element_name(&ctx).unwrap(),
        "drug"
    );
}

#[test]
fn self_reference_inline() {
    let schema = self_ref_schema();
    let employee = rel("employee");
    let fields = FieldSet::of(["manager_id"]);
    let ctx = NamingContext::new(&schema, &employee, &employee, Some(&fields), INLINE);
    assert_eq!(
        DefaultElementNamer.child_row_element_name(&ctx).unwrap(),
        "child-employee"
    );
    assert_eq!(
        DefaultElementNamer.parent_row_element_name(&ctx).unwrap(),
        "parent-employee"
    );
}

#[test]
fn naming_is_history_independent() {
    let schema = two_fk_schema();
    let (child, parent) = (rel("c"), rel("p"));
    let a = FieldSet::of(["a"]);
    let ctx = NamingContext::new(&schema, &child, &parent, Some(&a), INLINE);
    let first = DefaultElementNamer.child_row_element_name(&ctx).unwrap();
    let _ = DefaultElementNamer.parent_row_element_name(&ctx);
    let second = DefaultElementNamer.child_row_element_name(&ctx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn type_names_qualify_shared_bare_names() {
    let schema = shared_name_schema();
    let namer = TypeNamer::new(&schema);
    assert_eq!(
        namer.row_type_name(&RelationId::new(Some("sales"), "item")),
        "sales.item"
    );
    assert_eq!(
        namer.row_type_name(&RelationId::new(Some("STOCK"), "ITEM")),
        "stock.item"
    );
    assert_eq!(
        namer.row_type_name(&RelationId::new(Some("sales"), "order_line")),
        "order_line"
    );
    assert_eq!(
        namer.collection_type_name(&RelationId::new(Some("sales"), "item")),
        "sales.item-listing"
    );
}
