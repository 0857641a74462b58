use std::sync::Arc;

use relxml_core::{CaseSensitivity, ForeignKey, SchemaMetadata};

use super::{CompilerConfig, FieldOutput, QueryCompiler, RowOutput, XmlOutputType};
use crate::Error;
use crate::naming::ChildCollectionsStyle;
use crate::render::{Model, RenderError, TemplateKind, Templates, Value};
use crate::spec::{Direction, OutputSpec, OutputSpecFactory, RowOrdering, SpecFactory};
use crate::test_utils::{drug_schema, factory, mutual_schema, rel, self_ref_schema};

fn compiler(schema: &SchemaMetadata) -> QueryCompiler<'_> {
    QueryCompiler::builder().schema(schema).build().unwrap()
}

fn drug_with_links(schema: &SchemaMetadata) -> OutputSpec {
    let factory = factory(schema, ChildCollectionsStyle::Wrapped);
    factory
        .table(&rel("drug"))
        .unwrap()
        .with_all_child_tables(&factory)
        .unwrap()
}

fn included() -> RowOutput {
    RowOutput::new(FieldOutput::Included, XmlOutputType::Xml)
}

#[test]
fn drug_with_child_collection() {
    let schema = drug_schema();
    let drug = drug_with_links(&schema);
    let sql = compiler(&schema)
        .row_elements_query(&drug, Some("d"), None, included(), None)
        .unwrap();
    insta::assert_snapshot!(sql, @r#"
    select
      d.id,
      d.name,
      xmlelement(name "drug",
        xmlforest(d.id as "id", d.name as "name"),
        (
          select
            xmlelement(name "drug_link-listing",
              xmlagg(dl.ROW_XML)
            ) as ROWCOLL_XML
          from (
            select
              dl1.drug_id,
              dl1.compound_id,
              xmlelement(name "drug_link",
                xmlforest(dl1.drug_id as "drug_id", dl1.compound_id as "compound_id")
              ) as ROW_XML
            from drug_link dl1
          ) dl
          where dl.drug_id = d.id
        )
      ) as ROW_XML
    from drug d
    "#);
}

#[test]
fn ordering_and_filter_on_standalone_query() {
    let schema = drug_schema();
    let factory = factory(&schema, ChildCollectionsStyle::Wrapped);
    let drug = drug_with_links(&schema)
        .with_ordering(&factory, RowOrdering::by("id", Direction::Desc))
        .unwrap();
    let compiler = compiler(&schema);

    let model = compiler
        .row_elements_model(&drug, Some("d"), Some("d.id in (1, 2, 3, 4, 5)"), included(), None)
        .unwrap();
    assert_eq!(model.list("orderBy").unwrap(), ["d.id desc"]);
    assert_eq!(model.opt_str("filter"), Ok(Some("d.id in (1, 2, 3, 4, 5)")));

    let sql = compiler
        .row_elements_query(&drug, Some("d"), Some("d.id in (1, 2, 3, 4, 5)"), included(), None)
        .unwrap();
    assert!(sql.ends_with("from drug d\nwhere d.id in (1, 2, 3, 4, 5)\norder by d.id desc"));
}

#[test]
fn namespace_declared_only_when_ambient_differs() {
    let schema = drug_schema();
    let drug = drug_with_links(&schema).with_namespace("ns1");
    let compiler = compiler(&schema);
    let model =
        |ambient: Option<&str>| compiler.row_elements_model(&drug, Some("d"), None, included(), ambient);

    assert!(!model(Some("ns1")).unwrap().contains_key("namespace"));
    assert_eq!(
        model(Some("ns2")).unwrap().get("namespace"),
        Some(&Value::Str("ns1".to_string()))
    );
    assert_eq!(model(None).unwrap().opt_str("namespace"), Ok(Some("ns1")));
}

#[test]
fn embedded_fragments_inherit_namespace() {
    let schema = drug_schema();
    let factory = OutputSpecFactory::builder()
        .schema(&schema)
        .namespace("urn:drugs")
        .build()
        .unwrap();
    let drug = factory
        .table(&rel("drug"))
        .unwrap()
        .with_all_child_tables(&factory)
        .unwrap();
    let sql = compiler(&schema)
        .row_elements_query(&drug, None, None, included(), None)
        .unwrap();
    assert_eq!(sql.matches("xmlnamespaces").count(), 1);
    assert!(sql.contains("xmlelement(name \"drug\",\n    xmlnamespaces(default 'urn:drugs'),"));
}

#[test]
fn embedded_fragment_with_own_namespace() {
    let schema = drug_schema();
    let factory = factory(&schema, ChildCollectionsStyle::Wrapped);
    let link = factory
        .table(&rel("drug_link"))
        .unwrap()
        .with_row_collection_element_name("links")
        .with_namespace("urn:links");
    let drug = factory
        .table(&rel("drug"))
        .unwrap()
        .with_child(&factory, &rel("drug_link"), None, Some(link))
        .unwrap();
    let sql = compiler(&schema)
        .row_elements_query(&drug, Some("d"), None, RowOutput::xml_only(), None)
        .unwrap();
    assert_eq!(sql.matches("xmlnamespaces").count(), 1);
    assert!(sql.contains(
        "xmlelement(name \"links\",\n          xmlnamespaces(default 'urn:links'),"
    ));
}

#[test]
fn large_char_output() {
    let schema = drug_schema();
    let drug = factory(&schema, ChildCollectionsStyle::Wrapped)
        .table(&rel("drug"))
        .unwrap();
    let compiler = compiler(&schema);

    let sql = compiler
        .row_elements_query(
            &drug,
            Some("d"),
            None,
            RowOutput::new(FieldOutput::None, XmlOutputType::LargeChar),
            None,
        )
        .unwrap();
    assert!(sql.starts_with("select\n  xmlserialize(content xmlelement(name \"drug\",\n"));
    assert!(sql.ends_with("  ) as clob) as ROW_XML\nfrom drug d"));

    let model = compiler
        .row_collection_model(&drug, None, None, XmlOutputType::LargeChar, None)
        .unwrap();
    assert_eq!(model.bool("largeCharOutput"), Ok(true));
    let forest = compiler.row_forest_model(&drug, None, None, None).unwrap();
    assert_eq!(forest.bool("largeCharOutput"), Ok(false));
}

#[test]
fn parent_fragment_is_xml_only_and_unordered() {
    let schema = drug_schema();
    let factory = factory(&schema, ChildCollectionsStyle::Wrapped);
    let drug = factory
        .table(&rel("drug"))
        .unwrap()
        .with_ordering(&factory, RowOrdering::by("name", Direction::Asc))
        .unwrap();
    let link = factory
        .table(&rel("drug_link"))
        .unwrap()
        .with_parent(&factory, &rel("drug"), None, Some(drug))
        .unwrap();
    let sql = compiler(&schema)
        .row_elements_query(&link, None, None, RowOutput::xml_only(), None)
        .unwrap();
    insta::assert_snapshot!(sql, @r#"
    select
      xmlelement(name "drug_link",
        xmlforest(dl.drug_id as "drug_id", dl.compound_id as "compound_id"),
        (
          select
            xmlelement(name "drug",
              xmlforest(d.id as "id", d.name as "name")
            ) as ROW_XML
          from drug d
          where dl.drug_id = d.id
        )
      ) as ROW_XML
    from drug_link dl
    "#);
}

#[test]
fn inline_children_become_forests() {
    let schema = mutual_schema();
    let factory = factory(&schema, ChildCollectionsStyle::Inline);
    let p = factory
        .table(&rel("p"))
        .unwrap()
        .with_all_child_tables(&factory)
        .unwrap();
    let sql = compiler(&schema)
        .row_elements_query(&p, None, None, RowOutput::xml_only(), None)
        .unwrap();
    assert!(sql.contains("xmlagg(c.ROW_XML) as ROWCOLL_XML"));
    assert!(sql.contains("xmlelement(name \"child-c\","));
    assert!(sql.contains("where c.p_id = p.id"));
    assert!(!sql.contains("c-listing"));
}

#[test]
fn nested_aliases_do_not_shadow() {
    let schema = self_ref_schema();
    let factory = factory(&schema, ChildCollectionsStyle::Inline);
    let employee = factory
        .table(&rel("employee"))
        .unwrap()
        .with_all_child_tables(&factory)
        .unwrap();
    let sql = compiler(&schema)
        .row_elements_query(&employee, Some("e"), None, RowOutput::xml_only(), None)
        .unwrap();
    assert!(sql.contains("from employee e2\n"));
    assert!(sql.contains(") e1\n"));
    assert!(sql.contains("where e1.manager_id = e.id"));
    assert!(sql.ends_with("from employee e"));
}

#[test]
fn keyword_initials_are_skipped() {
    let schema = SchemaMetadata::builder(CaseSensitivity::Lower)
        .table(rel("audit_session"), &["id"])
        .table(rel("order_row"), &["id", "session_id"])
        .foreign_key(ForeignKey::new(
            rel("order_row"),
            rel("audit_session"),
            [("session_id", "id")],
        ))
        .build()
        .unwrap();
    let factory = factory(&schema, ChildCollectionsStyle::Wrapped);
    let session = factory
        .table(&rel("audit_session"))
        .unwrap()
        .with_all_child_tables(&factory)
        .unwrap();
    let sql = compiler(&schema)
        .row_elements_query(&session, None, None, RowOutput::xml_only(), None)
        .unwrap();
    assert!(sql.ends_with("from audit_session as1"));
    assert!(sql.contains("from order_row or2
"));
    assert!(sql.contains("where or1.session_id = as1.id"));
    assert!(!sql.contains(" as\n"));
    assert!(!sql.contains(" or\n"));
}

#[test]
fn composite_keys_and_condition_side() {
    let schema = SchemaMetadata::builder(CaseSensitivity::Lower)
        .table(rel("orders"), &["id", "region"])
        .table(rel("shipment"), &["order_id", "order_region"])
        .foreign_key(ForeignKey::new(
            rel("shipment"),
            rel("orders"),
            [("order_id", "id"), ("order_region", "region")],
        ))
        .build()
        .unwrap();
    let factory = factory(&schema, ChildCollectionsStyle::Wrapped);
    let orders = factory
        .table(&rel("orders"))
        .unwrap()
        .with_all_child_tables(&factory)
        .unwrap();

    let sql = compiler(&schema).compile(&orders).unwrap();
    assert!(sql.contains("where s.order_id = o.id and s.order_region = o.region"));

    let flipped = QueryCompiler::builder()
        .schema(&schema)
        .config(CompilerConfig::new().child_side_on_left(false))
        .build()
        .unwrap()
        .compile(&orders)
        .unwrap();
    assert!(flipped.contains("where o.id = s.order_id and o.region = s.order_region"));
}

#[test]
fn collection_and_forest_models() {
    let schema = drug_schema();
    let factory = factory(&schema, ChildCollectionsStyle::Wrapped);
    let drug = drug_with_links(&schema)
        .with_namespace("urn:drugs")
        .with_ordering(&factory, RowOrdering::by("id", Direction::Desc))
        .unwrap();
    let compiler = compiler(&schema);

    let collection = compiler
        .row_collection_model(&drug, Some("d"), Some("d.name like 'a%'"), XmlOutputType::Xml, None)
        .unwrap();
    let keys: Vec<&str> = collection.keys().collect();
    assert_eq!(
        keys,
        [
            "collectionElementName",
            "namespace",
            "rowsQuery",
            "alias",
            "filter",
            "orderBy",
            "largeCharOutput",
            "resultColumn",
        ]
    );
    assert_eq!(collection.str("collectionElementName"), Ok("drug-listing"));
    assert_eq!(collection.list("orderBy").unwrap(), ["d.id desc"]);
    assert_eq!(collection.str("resultColumn"), Ok("ROWCOLL_XML"));
    let rows = collection.str("rowsQuery").unwrap();
    assert!(rows.starts_with("select\n  d1.id,\n  d1.name,\n"));
    assert!(!rows.contains("xmlnamespaces"));
    assert!(!rows.contains("order by"));

    let forest = compiler
        .row_forest_model(&drug, Some("d"), None, None)
        .unwrap();
    assert!(!forest.contains_key("collectionElementName"));
    assert!(!forest.contains_key("namespace"));
    assert!(
        forest
            .str("rowsQuery")
            .unwrap()
            .contains("xmlnamespaces(default 'urn:drugs')")
    );
}

#[test]
fn all_fields_need_relation_metadata() {
    let schema = drug_schema();
    let drug = drug_with_links(&schema);
    let other = mutual_schema();
    let err = compiler(&other)
        .row_elements_query(
            &drug,
            None,
            None,
            RowOutput::new(FieldOutput::All, XmlOutputType::Xml),
            None,
        )
        .unwrap_err();
    assert_eq!(err, Error::UnknownRelation(rel("drug")));
}

#[test]
fn compile_uses_configured_output() {
    let schema = drug_schema();
    let drug = drug_with_links(&schema);
    let sql = QueryCompiler::builder()
        .schema(&schema)
        .config(CompilerConfig::new().field_output(FieldOutput::None))
        .build()
        .unwrap()
        .compile(&drug)
        .unwrap();
    assert!(sql.starts_with("select\n  xmlelement(name \"drug\","));
}

#[test]
fn builder_requires_schema() {
    let err = QueryCompiler::builder().build().err();
    assert!(matches!(err, Some(Error::Configuration(_))));
}

struct BrokenTemplates;

impl Templates for BrokenTemplates {
    fn render(&self, _: TemplateKind, _: &Model) -> Result<String, RenderError> {
        Err(RenderError::Backend("template store unavailable".to_string()))
    }
}

#[test]
fn backend_failures_become_rendering_errors() {
    let schema = drug_schema();
    let drug = drug_with_links(&schema);
    let compiler = QueryCompiler::builder()
        .schema(&schema)
        .templates(Arc::new(BrokenTemplates))
        .build()
        .unwrap();

    assert_eq!(
        compiler.compile(&drug),
        Err(Error::Rendering("template store unavailable".to_string()))
    );
    // fragments are rendered while the model is resolved
    assert!(
        compiler
            .row_elements_model(&drug, None, None, included(), None)
            .is_err()
    );
    let leaf = factory(&schema, ChildCollectionsStyle::Wrapped)
        .table(&rel("drug"))
        .unwrap();
    assert!(
        compiler
            .row_elements_model(&leaf, None, None, included(), None)
            .is_ok()
    );
}
