//! Factory for default output specifications.

use std::sync::Arc;

use relxml_core::{ForeignKey, RelationId, SchemaGraph};

use super::node::OutputSpec;
use crate::naming::{ChildCollectionsStyle, DefaultElementNamer, ElementNamer, NamingContext};
use crate::{Error, Result};

/// Source of default nodes for a schema graph.
///
/// Node operations that need schema access or default subtrees take a
/// `&dyn SpecFactory`, so callers can swap in their own naming or defaults.
pub trait SpecFactory {
    fn schema(&self) -> &dyn SchemaGraph;

    fn namer(&self) -> &dyn ElementNamer;

    /// Collection style given to nodes this factory creates.
    fn style(&self) -> ChildCollectionsStyle;

    /// Namespace given to nodes this factory creates.
    fn namespace(&self) -> Option<&str>;

    /// Root node for `relation`: all fields, default names, nothing embedded.
    fn table(&self, relation: &RelationId) -> Result<OutputSpec>;

    /// One-level subtree for the child side of `fk`, embedded in a parent
    /// whose children use `parent_style`.
    fn child_spec(&self, fk: &ForeignKey, parent_style: ChildCollectionsStyle)
    -> Result<OutputSpec>;

    /// One-level subtree for the parent side of `fk`, embedded in a child
    /// whose children use `child_style`.
    fn parent_spec(&self, fk: &ForeignKey, child_style: ChildCollectionsStyle)
    -> Result<OutputSpec>;
}

/// The standard factory: every field included, names from an [`ElementNamer`].
#[derive(Clone)]
pub struct OutputSpecFactory<'s> {
    schema: &'s dyn SchemaGraph,
    namer: Arc<dyn ElementNamer>,
    style: ChildCollectionsStyle,
    namespace: Option<String>,
}

impl<'s> OutputSpecFactory<'s> {
    pub fn builder() -> OutputSpecFactoryBuilder<'s> {
        OutputSpecFactoryBuilder::default()
    }

    fn all_fields(&self, relation: &RelationId) -> Result<Vec<String>> {
        let fields = self
            .schema
            .fields(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.clone()))?;
        Ok(fields.iter().map(|f| f.name.clone()).collect())
    }
}

impl SpecFactory for OutputSpecFactory<'_> {
    fn schema(&self) -> &dyn SchemaGraph {
        self.schema
    }

    fn namer(&self) -> &dyn ElementNamer {
        self.namer.as_ref()
    }

    fn style(&self) -> ChildCollectionsStyle {
        self.style
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn table(&self, relation: &RelationId) -> Result<OutputSpec> {
        let fields = self.all_fields(relation)?;
        Ok(OutputSpec::new(
            relation.clone(),
            fields,
            self.namer.default_row_element_name(relation),
            self.namer.default_row_collection_element_name(relation),
            self.style,
            self.namespace.clone(),
        ))
    }

    fn child_spec(
        &self,
        fk: &ForeignKey,
        parent_style: ChildCollectionsStyle,
    ) -> Result<OutputSpec> {
        let child = fk.source();
        let fields = self.all_fields(child)?;
        let source_fields = fk.source_field_set();
        let ctx = NamingContext::new(
            self.schema,
            child,
            fk.target(),
            Some(&source_fields),
            parent_style,
        );
        Ok(OutputSpec::new(
            child.clone(),
            fields,
            self.namer.child_row_element_name(&ctx)?,
            self.namer.child_collection_element_name(&ctx)?,
            self.style,
            self.namespace.clone(),
        ))
    }

    fn parent_spec(
        &self,
        fk: &ForeignKey,
        child_style: ChildCollectionsStyle,
    ) -> Result<OutputSpec> {
        let parent = fk.target();
        let fields = self.all_fields(parent)?;
        let source_fields = fk.source_field_set();
        let ctx = NamingContext::new(
            self.schema,
            fk.source(),
            parent,
            Some(&source_fields),
            child_style,
        );
        Ok(OutputSpec::new(
            parent.clone(),
            fields,
            self.namer.parent_row_element_name(&ctx)?,
            self.namer.default_row_collection_element_name(parent),
            self.style,
            self.namespace.clone(),
        ))
    }
}

/// Builder for [`OutputSpecFactory`]. The schema graph is required.
#[derive(Default)]
pub struct OutputSpecFactoryBuilder<'s> {
    schema: Option<&'s dyn SchemaGraph>,
    namer: Option<Arc<dyn ElementNamer>>,
    style: ChildCollectionsStyle,
    namespace: Option<String>,
}

impl<'s> OutputSpecFactoryBuilder<'s> {
    pub fn schema(mut self, schema: &'s dyn SchemaGraph) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Defaults to [`DefaultElementNamer`].
    pub fn namer(mut self, namer: Arc<dyn ElementNamer>) -> Self {
        self.namer = Some(namer);
        self
    }

    pub fn style(mut self, style: ChildCollectionsStyle) -> Self {
        self.style = style;
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn build(self) -> Result<OutputSpecFactory<'s>> {
        let schema = self.schema.ok_or_else(|| {
            Error::Configuration("output spec factory requires a schema graph".to_string())
        })?;
        Ok(OutputSpecFactory {
            schema,
            namer: self.namer.unwrap_or_else(|| Arc::new(DefaultElementNamer)),
            style: self.style,
            namespace: self.namespace,
        })
    }
}
