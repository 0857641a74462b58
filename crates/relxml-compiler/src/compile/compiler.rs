//! Compiler state and the three query shapes.

use std::sync::Arc;

use relxml_core::{ForeignKey, SchemaGraph};

use super::alias::AliasScope;
use super::config::{CompilerConfig, FieldOutput, RowOutput, XmlOutputType};
use crate::naming::ChildCollectionsStyle;
use crate::render::keys::*;
use crate::render::{
    Model, ROW_COLLECTION_XML_COLUMN, ROW_XML_COLUMN, SqlXmlTemplates, TemplateKind, Templates,
};
use crate::spec::OutputSpec;
use crate::{Error, Result};

/// Compiles output specifications into nested SQL/XML queries.
///
/// Every query shape first resolves a [`Model`] and then renders it with the
/// configured [`Templates`] backend. Embedded fragments are rendered bottom-up
/// and passed to their parent model as text.
pub struct QueryCompiler<'s> {
    schema: &'s dyn SchemaGraph,
    templates: Arc<dyn Templates>,
    config: CompilerConfig,
}

/// Builder for [`QueryCompiler`]. The schema graph is required.
#[derive(Default)]
pub struct QueryCompilerBuilder<'s> {
    schema: Option<&'s dyn SchemaGraph>,
    templates: Option<Arc<dyn Templates>>,
    config: CompilerConfig,
}

impl<'s> QueryCompilerBuilder<'s> {
    pub fn schema(mut self, schema: &'s dyn SchemaGraph) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Defaults to [`SqlXmlTemplates`] indented per the config.
    pub fn templates(mut self, templates: Arc<dyn Templates>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<QueryCompiler<'s>> {
        let schema = self.schema.ok_or_else(|| {
            Error::Configuration("query compiler requires a schema graph".to_string())
        })?;
        let templates = self
            .templates
            .unwrap_or_else(|| Arc::new(SqlXmlTemplates::new(self.config.indent)));
        Ok(QueryCompiler {
            schema,
            templates,
            config: self.config,
        })
    }
}

impl<'s> QueryCompiler<'s> {
    pub fn builder() -> QueryCompilerBuilder<'s> {
        QueryCompilerBuilder::default()
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Row-elements query for `spec` using the configured top-level output.
    pub fn compile(&self, spec: &OutputSpec) -> Result<String> {
        self.row_elements_query(spec, None, None, self.config.row_output(), None)
    }

    /// One result row per row of the relation, holding the selected field
    /// columns and a `ROW_XML` column with the row element.
    ///
    /// `ambient_namespace` is the default namespace already in effect where
    /// the result will be placed; the row element declares its own namespace
    /// only when it differs.
    pub fn row_elements_query(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        output: RowOutput,
        ambient_namespace: Option<&str>,
    ) -> Result<String> {
        let model = self.row_elements_model(spec, alias, filter, output, ambient_namespace)?;
        self.render(TemplateKind::RowElements, &model)
    }

    pub fn row_elements_model(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        output: RowOutput,
        ambient_namespace: Option<&str>,
    ) -> Result<Model> {
        let mut scope = AliasScope::new();
        self.row_elements_in(
            spec,
            alias,
            filter,
            output,
            ambient_namespace,
            &mut scope,
            true,
        )
    }

    /// A single `ROWCOLL_XML` value: the collection element wrapping every
    /// matching row element. `filter` may reference any field through `alias`.
    pub fn row_collection_query(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        xml_type: XmlOutputType,
        ambient_namespace: Option<&str>,
    ) -> Result<String> {
        let model =
            self.row_collection_model(spec, alias, filter, xml_type, ambient_namespace)?;
        self.render(TemplateKind::RowCollection, &model)
    }

    pub fn row_collection_model(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        xml_type: XmlOutputType,
        ambient_namespace: Option<&str>,
    ) -> Result<Model> {
        let mut scope = AliasScope::new();
        self.row_collection_in(
            spec,
            alias,
            filter,
            xml_type,
            ambient_namespace,
            &mut scope,
            true,
        )
    }

    /// Like [`QueryCompiler::row_collection_query`] without the wrapper
    /// element. Always native XML.
    pub fn row_forest_query(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        ambient_namespace: Option<&str>,
    ) -> Result<String> {
        let model = self.row_forest_model(spec, alias, filter, ambient_namespace)?;
        self.render(TemplateKind::RowForest, &model)
    }

    pub fn row_forest_model(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        ambient_namespace: Option<&str>,
    ) -> Result<Model> {
        let mut scope = AliasScope::new();
        self.row_collection_in(
            spec,
            alias,
            filter,
            XmlOutputType::Xml,
            ambient_namespace,
            &mut scope,
            false,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn row_elements_in(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        output: RowOutput,
        ambient: Option<&str>,
        scope: &mut AliasScope,
        ordered: bool,
    ) -> Result<Model> {
        let alias = scope.claim(alias, spec.relation());
        let select_fields = match output.fields {
            FieldOutput::None => Vec::new(),
            FieldOutput::Included => spec.fields().to_vec(),
            FieldOutput::All => self.all_fields(spec)?,
        };
        let inner_ambient = spec.namespace().or(ambient);

        let mut parent_fragments = Vec::with_capacity(spec.parents().len());
        for parent in spec.parents() {
            let mut nested = scope.clone();
            let parent_alias = nested.allocate(parent.spec.relation());
            let condition = self.join_condition(&parent.foreign_key, &alias, &parent_alias);
            let model = self.row_elements_in(
                &parent.spec,
                Some(&parent_alias),
                Some(&condition),
                RowOutput::xml_only(),
                inner_ambient,
                &mut nested,
                false,
            )?;
            parent_fragments.push(self.render(TemplateKind::RowElements, &model)?);
        }

        let mut child_fragments = Vec::with_capacity(spec.children().len());
        for child in spec.children() {
            let mut nested = scope.clone();
            let child_alias = nested.allocate(child.spec.relation());
            let condition = self.join_condition(&child.foreign_key, &child_alias, &alias);
            let (kind, wrapped) = match spec.collection_style() {
                ChildCollectionsStyle::Wrapped => (TemplateKind::RowCollection, true),
                ChildCollectionsStyle::Inline => (TemplateKind::RowForest, false),
            };
            let model = self.row_collection_in(
                &child.spec,
                Some(&child_alias),
                Some(&condition),
                XmlOutputType::Xml,
                inner_ambient,
                &mut nested,
                wrapped,
            )?;
            child_fragments.push(self.render(kind, &model)?);
        }

        let order_by = match spec.ordering() {
            Some(ordering) if ordered => ordering.sql_terms(&alias),
            _ => Vec::new(),
        };

        tracing::debug!(
            relation = %spec.relation(),
            alias = %alias,
            parents = parent_fragments.len(),
            children = child_fragments.len(),
            "compiled row-elements query"
        );

        let mut model = Model::new();
        model.insert(RELATION, spec.relation().to_string());
        model.insert(ALIAS, alias);
        model.insert(SELECT_FIELDS, select_fields);
        model.insert(XML_FIELDS, spec.fields().to_vec());
        model.insert(ROW_ELEMENT_NAME, spec.row_element_name());
        if let Some(ns) = declared_namespace(spec, ambient) {
            model.insert(NAMESPACE, ns);
        }
        model.insert(PARENT_FRAGMENTS, parent_fragments);
        model.insert(CHILD_FRAGMENTS, child_fragments);
        if let Some(filter) = filter {
            model.insert(FILTER, filter);
        }
        model.insert(ORDER_BY, order_by);
        model.insert(
            LARGE_CHAR_OUTPUT,
            output.xml_type == XmlOutputType::LargeChar,
        );
        model.insert(RESULT_COLUMN, ROW_XML_COLUMN);
        Ok(model)
    }

    /// Collection (`wrapped`) or forest model over an all-fields rows query.
    #[allow(clippy::too_many_arguments)]
    fn row_collection_in(
        &self,
        spec: &OutputSpec,
        alias: Option<&str>,
        filter: Option<&str>,
        xml_type: XmlOutputType,
        ambient: Option<&str>,
        scope: &mut AliasScope,
        wrapped: bool,
    ) -> Result<Model> {
        let alias = scope.claim(alias, spec.relation());
        let rows_alias = scope.allocate(spec.relation());

        // The wrapper carries the declaration, so rows inherit it.
        let (declared, rows_ambient) = if wrapped {
            (declared_namespace(spec, ambient), spec.namespace().or(ambient))
        } else {
            (None, ambient)
        };
        let rows = self.row_elements_in(
            spec,
            Some(&rows_alias),
            None,
            RowOutput::new(FieldOutput::All, XmlOutputType::Xml),
            rows_ambient,
            scope,
            false,
        )?;
        let rows_query = self.render(TemplateKind::RowElements, &rows)?;
        let order_by = spec
            .ordering()
            .map(|ordering| ordering.sql_terms(&alias))
            .unwrap_or_default();

        tracing::debug!(
            relation = %spec.relation(),
            alias = %alias,
            wrapped,
            "compiled row-collection query"
        );

        let mut model = Model::new();
        if wrapped {
            model.insert(COLLECTION_ELEMENT_NAME, spec.row_collection_element_name());
        }
        if let Some(ns) = declared {
            model.insert(NAMESPACE, ns);
        }
        model.insert(ROWS_QUERY, rows_query);
        model.insert(ALIAS, alias);
        if let Some(filter) = filter {
            model.insert(FILTER, filter);
        }
        model.insert(ORDER_BY, order_by);
        model.insert(LARGE_CHAR_OUTPUT, xml_type == XmlOutputType::LargeChar);
        model.insert(RESULT_COLUMN, ROW_COLLECTION_XML_COLUMN);
        Ok(model)
    }

    /// `child.x = parent.y and ...` in the foreign key's field order.
    fn join_condition(&self, fk: &ForeignKey, child_alias: &str, parent_alias: &str) -> String {
        fk.field_pairs()
            .iter()
            .map(|(child_field, parent_field)| {
                let child = format!("{child_alias}.{child_field}");
                let parent = format!("{parent_alias}.{parent_field}");
                if self.config.child_side_on_left {
                    format!("{child} = {parent}")
                } else {
                    format!("{parent} = {child}")
                }
            })
            .collect::<Vec<_>>()
            .join(" and ")
    }

    fn all_fields(&self, spec: &OutputSpec) -> Result<Vec<String>> {
        let fields = self
            .schema
            .fields(spec.relation())
            .ok_or_else(|| Error::UnknownRelation(spec.relation().clone()))?;
        Ok(fields.iter().map(|f| f.name.clone()).collect())
    }

    fn render(&self, kind: TemplateKind, model: &Model) -> Result<String> {
        self.templates
            .render(kind, model)
            .map_err(|e| Error::Rendering(e.to_string()))
    }
}

/// The node's namespace, unless the surrounding content already uses it.
fn declared_namespace<'a>(spec: &'a OutputSpec, ambient: Option<&str>) -> Option<&'a str> {
    spec.namespace().filter(|ns| Some(*ns) != ambient)
}
