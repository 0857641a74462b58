//! XML Schema emission for output specifications.

use std::collections::{BTreeSet, HashMap};

use relxml_core::{Field, SchemaGraph};

use super::XsdConfig;
use crate::naming::{ChildCollectionsStyle, TypeNamer};
use crate::spec::OutputSpec;
use crate::{Error, Result};

const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Generates an XML Schema describing documents produced for an output
/// specification.
pub struct XsdGenerator<'s> {
    schema: &'s dyn SchemaGraph,
    config: XsdConfig,
}

impl<'s> XsdGenerator<'s> {
    pub fn new(schema: &'s dyn SchemaGraph, config: XsdConfig) -> Self {
        Self { schema, config }
    }

    /// One `xs:schema` document with a global element for the root row.
    pub fn generate(&self, spec: &OutputSpec) -> Result<String> {
        Emitter::new(self.schema, &self.config).emit(spec)
    }
}

struct Emitter<'a> {
    schema: &'a dyn SchemaGraph,
    config: &'a XsdConfig,
    /// Row node -> assigned type name
    row_types: HashMap<OutputSpec, String>,
    /// Row type name -> collection type name
    collection_types: HashMap<String, String>,
    /// Names already used (for collision avoidance)
    used_names: BTreeSet<String>,
    /// Type definitions in emission order
    types: Vec<String>,
    indent: String,
}

impl<'a> Emitter<'a> {
    fn new(schema: &'a dyn SchemaGraph, config: &'a XsdConfig) -> Self {
        Self {
            schema,
            config,
            row_types: HashMap::new(),
            collection_types: HashMap::new(),
            used_names: BTreeSet::new(),
            types: Vec::new(),
            indent: " ".repeat(config.indent),
        }
    }

    fn emit(mut self, spec: &OutputSpec) -> Result<String> {
        let root_type = self.row_type(spec)?;
        let root_collection = self
            .config
            .include_collection_root
            .then(|| self.collection_type(spec, &root_type));

        let i = &self.indent;
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!("<xs:schema xmlns:xs=\"{XS_NAMESPACE}\""));
        if let Some(ns) = spec.namespace() {
            let ns = attr(ns);
            out.push_str(&format!(" targetNamespace=\"{ns}\" xmlns=\"{ns}\""));
        }
        out.push_str(" elementFormDefault=\"qualified\">\n");
        out.push_str(&format!(
            "{i}{}\n",
            element(spec.row_element_name(), &root_type, false, false)
        ));
        if let Some(collection) = root_collection {
            out.push_str(&format!(
                "{i}{}\n",
                element(spec.row_collection_element_name(), &collection, false, false)
            ));
        }
        for definition in &self.types {
            out.push_str(definition);
        }
        out.push_str("</xs:schema>\n");

        tracing::debug!(
            relation = %spec.relation(),
            types = self.types.len(),
            "generated xml schema"
        );
        Ok(out)
    }

    fn row_type(&mut self, spec: &OutputSpec) -> Result<String> {
        if let Some(name) = self.row_types.get(spec) {
            return Ok(name.clone());
        }
        let schema = self.schema;
        let name = self.unique_name(TypeNamer::new(schema).row_type_name(spec.relation()));
        self.row_types.insert(spec.clone(), name.clone());
        // Reserve the slot so a type precedes the types it references.
        let slot = self.types.len();
        self.types.push(String::new());

        let fields = schema
            .fields(spec.relation())
            .ok_or_else(|| Error::UnknownRelation(spec.relation().clone()))?;
        let mut elements = Vec::new();

        for field_name in spec.fields() {
            let field = find_field(fields, field_name).ok_or_else(|| Error::NoSuchField {
                relation: spec.relation().clone(),
                field: field_name.clone(),
            })?;
            elements.push(element(
                &field_name.to_lowercase(),
                xs_type(field.db_type.as_deref()),
                field.nullable,
                false,
            ));
        }

        for parent in spec.parents() {
            let parent_type = self.row_type(&parent.spec)?;
            let nullable_key = parent
                .foreign_key
                .source_field_names()
                .any(|f| find_field(fields, f).is_none_or(|field| field.nullable));
            elements.push(element(
                parent.spec.row_element_name(),
                &parent_type,
                self.config.parent_elements_optional || nullable_key,
                false,
            ));
        }

        for child in spec.children() {
            let child_type = self.row_type(&child.spec)?;
            match spec.collection_style() {
                ChildCollectionsStyle::Wrapped => {
                    let collection = self.collection_type(&child.spec, &child_type);
                    elements.push(element(
                        child.spec.row_collection_element_name(),
                        &collection,
                        self.config.child_collections_optional,
                        false,
                    ));
                }
                ChildCollectionsStyle::Inline => {
                    elements.push(element(child.spec.row_element_name(), &child_type, true, true));
                }
            }
        }

        self.types[slot] = self.complex_type(&name, &elements);
        Ok(name)
    }

    fn collection_type(&mut self, spec: &OutputSpec, row_type: &str) -> String {
        if let Some(name) = self.collection_types.get(row_type) {
            return name.clone();
        }
        let name =
            self.unique_name(TypeNamer::new(self.schema).collection_type_name(spec.relation()));
        self.collection_types
            .insert(row_type.to_string(), name.clone());
        let rows = element(spec.row_element_name(), row_type, true, true);
        let definition = self.complex_type(&name, &[rows]);
        self.types.push(definition);
        name
    }

    fn complex_type(&self, name: &str, elements: &[String]) -> String {
        let i = &self.indent;
        let mut out = format!("{i}<xs:complexType name=\"{}\">\n", attr(name));
        if elements.is_empty() {
            out.push_str(&format!("{i}{i}<xs:sequence/>\n"));
        } else {
            out.push_str(&format!("{i}{i}<xs:sequence>\n"));
            for element in elements {
                out.push_str(&format!("{i}{i}{i}{element}\n"));
            }
            out.push_str(&format!("{i}{i}</xs:sequence>\n"));
        }
        out.push_str(&format!("{i}</xs:complexType>\n"));
        out
    }

    fn unique_name(&mut self, base: String) -> String {
        if self.used_names.insert(base.clone()) {
            return base;
        }

        let mut counter = 2;
        loop {
            let name = format!("{base}{counter}");
            if self.used_names.insert(name.clone()) {
                return name;
            }
            counter += 1;
        }
    }
}

fn find_field<'f>(fields: &'f [Field], name: &str) -> Option<&'f Field> {
    fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

fn element(name: &str, type_name: &str, optional: bool, unbounded: bool) -> String {
    let mut decl = format!(
        "<xs:element name=\"{}\" type=\"{}\"",
        attr(name),
        attr(type_name)
    );
    if optional {
        decl.push_str(" minOccurs=\"0\"");
    }
    if unbounded {
        decl.push_str(" maxOccurs=\"unbounded\"");
    }
    decl.push_str("/>");
    decl
}

/// XML Schema built-in type for a database type name; unknown types are strings.
pub(crate) fn xs_type(db_type: Option<&str>) -> &'static str {
    let Some(db_type) = db_type else {
        return "xs:string";
    };
    let base = db_type
        .split('(')
        .next()
        .unwrap_or(db_type)
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "integer" | "int" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "tinyint"
        | "serial" | "bigserial" => "xs:integer",
        "numeric" | "decimal" | "number" | "money" => "xs:decimal",
        "real" | "float" | "float4" | "float8" | "double" | "double precision" => "xs:double",
        "boolean" | "bool" | "bit" => "xs:boolean",
        "date" => "xs:date",
        "datetime" => "xs:dateTime",
        t if t.starts_with("timestamp") => "xs:dateTime",
        t if t.starts_with("time") => "xs:time",
        "bytea" | "blob" | "binary" | "varbinary" | "raw" => "xs:base64Binary",
        _ => "xs:string",
    }
}

fn attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
