//! Immutable output-specification nodes.

use std::collections::HashSet;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, OnceLock};

use relxml_core::{Field, FieldSet, ForeignKey, RelationId};

use super::factory::SpecFactory;
use super::ordering::RowOrdering;
use crate::naming::{ChildCollectionsStyle, match_foreign_key};
use crate::{Error, Result};

/// A relation embedded in another node through one foreign key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmbeddedSpec {
    pub foreign_key: ForeignKey,
    pub spec: OutputSpec,
}

/// How one relation appears in the output: which fields, under which element
/// names, and which child and parent relations are embedded in each row.
///
/// Nodes never change. Every `with_*` method returns a new node that shares
/// all untouched parts (field list, child list, parent list, subtrees) with
/// the original, so cloning and deriving are cheap and earlier handles stay
/// valid.
#[derive(Clone)]
pub struct OutputSpec(Arc<Node>);

struct Node {
    relation: RelationId,
    fields: Arc<[String]>,
    row_element_name: String,
    row_collection_element_name: String,
    collection_style: ChildCollectionsStyle,
    children: Arc<[EmbeddedSpec]>,
    parents: Arc<[EmbeddedSpec]>,
    ordering: Option<RowOrdering>,
    namespace: Option<String>,
    /// Structural hash, computed on first use.
    hash: OnceLock<u64>,
}

impl Node {
    fn derived(&self) -> Node {
        Node {
            relation: self.relation.clone(),
            fields: Arc::clone(&self.fields),
            row_element_name: self.row_element_name.clone(),
            row_collection_element_name: self.row_collection_element_name.clone(),
            collection_style: self.collection_style,
            children: Arc::clone(&self.children),
            parents: Arc::clone(&self.parents),
            ordering: self.ordering.clone(),
            namespace: self.namespace.clone(),
            hash: OnceLock::new(),
        }
    }
}

impl OutputSpec {
    /// A leaf node: no children, parents, ordering.
    pub fn new(
        relation: RelationId,
        fields: Vec<String>,
        row_element_name: String,
        row_collection_element_name: String,
        collection_style: ChildCollectionsStyle,
        namespace: Option<String>,
    ) -> Self {
        Self(Arc::new(Node {
            relation,
            fields: fields.into(),
            row_element_name,
            row_collection_element_name,
            collection_style,
            children: Arc::from(Vec::new()),
            parents: Arc::from(Vec::new()),
            ordering: None,
            namespace,
            hash: OnceLock::new(),
        }))
    }

    pub fn relation(&self) -> &RelationId {
        &self.0.relation
    }

    pub fn fields(&self) -> &[String] {
        &self.0.fields
    }

    pub fn row_element_name(&self) -> &str {
        &self.0.row_element_name
    }

    pub fn row_collection_element_name(&self) -> &str {
        &self.0.row_collection_element_name
    }

    pub fn collection_style(&self) -> ChildCollectionsStyle {
        self.0.collection_style
    }

    pub fn children(&self) -> &[EmbeddedSpec] {
        &self.0.children
    }

    pub fn parents(&self) -> &[EmbeddedSpec] {
        &self.0.parents
    }

    pub fn ordering(&self) -> Option<&RowOrdering> {
        self.0.ordering.as_ref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.namespace.as_deref()
    }

    /// Whether both handles point at the very same node.
    pub fn same_node(&self, other: &OutputSpec) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn derive(&self, change: impl FnOnce(&mut Node)) -> OutputSpec {
        let mut node = self.0.derived();
        change(&mut node);
        OutputSpec(Arc::new(node))
    }

    // ------------------------------------------------------------------
    // Embedding
    // ------------------------------------------------------------------

    /// Embed rows of `child` that reference this node's relation.
    ///
    /// `fields` picks the foreign key when several join the two relations.
    /// Without `subtree`, the factory's default one-level child spec is used.
    pub fn with_child(
        &self,
        factory: &dyn SpecFactory,
        child: &RelationId,
        fields: Option<&FieldSet>,
        subtree: Option<OutputSpec>,
    ) -> Result<OutputSpec> {
        let schema = factory.schema();
        if !schema.contains(child) {
            return Err(Error::UnknownRelation(child.clone()));
        }
        let candidates = schema.foreign_keys_between(child, self.relation());
        let fk = match_foreign_key(&candidates, fields, child, self.relation())?;
        let spec = match subtree {
            Some(spec) => check_subtree(spec, child)?,
            None => factory.child_spec(fk, self.collection_style())?,
        };
        let entry = EmbeddedSpec {
            foreign_key: fk.clone(),
            spec,
        };
        let derived = self.derive(|node| node.children = appended(&node.children, entry));
        derived.check_element_names()?;
        Ok(derived)
    }

    /// Embed the row of `parent` that this node's relation references.
    pub fn with_parent(
        &self,
        factory: &dyn SpecFactory,
        parent: &RelationId,
        fields: Option<&FieldSet>,
        subtree: Option<OutputSpec>,
    ) -> Result<OutputSpec> {
        let schema = factory.schema();
        if !schema.contains(parent) {
            return Err(Error::UnknownRelation(parent.clone()));
        }
        let candidates = schema.foreign_keys_between(self.relation(), parent);
        let fk = match_foreign_key(&candidates, fields, self.relation(), parent)?;
        let spec = match subtree {
            Some(spec) => check_subtree(spec, parent)?,
            None => factory.parent_spec(fk, self.collection_style())?,
        };
        let entry = EmbeddedSpec {
            foreign_key: fk.clone(),
            spec,
        };
        let derived = self.derive(|node| node.parents = appended(&node.parents, entry));
        derived.check_element_names()?;
        Ok(derived)
    }

    /// Replace the children with one default subtree per referencing foreign key.
    ///
    /// Relations without metadata are skipped. Only one level is added; the
    /// new children have no children of their own.
    pub fn with_all_child_tables(&self, factory: &dyn SpecFactory) -> Result<OutputSpec> {
        let schema = factory.schema();
        let mut children = Vec::new();
        for fk in schema.foreign_keys_to_parent(self.relation()) {
            if !schema.contains(fk.source()) {
                continue;
            }
            children.push(EmbeddedSpec {
                foreign_key: fk.clone(),
                spec: factory.child_spec(fk, self.collection_style())?,
            });
        }
        tracing::debug!(
            relation = %self.relation(),
            children = children.len(),
            "expanded child tables"
        );
        let derived = self.derive(|node| node.children = children.into());
        derived.check_element_names()?;
        Ok(derived)
    }

    /// Replace the parents with one default subtree per outgoing foreign key.
    pub fn with_all_parent_tables(&self, factory: &dyn SpecFactory) -> Result<OutputSpec> {
        let schema = factory.schema();
        let mut parents = Vec::new();
        for fk in schema.foreign_keys_from_child(self.relation()) {
            if !schema.contains(fk.target()) {
                continue;
            }
            parents.push(EmbeddedSpec {
                foreign_key: fk.clone(),
                spec: factory.parent_spec(fk, self.collection_style())?,
            });
        }
        tracing::debug!(
            relation = %self.relation(),
            parents = parents.len(),
            "expanded parent tables"
        );
        let derived = self.derive(|node| node.parents = parents.into());
        derived.check_element_names()?;
        Ok(derived)
    }

    // ------------------------------------------------------------------
    // Plain attribute changes
    // ------------------------------------------------------------------

    /// Order rows by `ordering`; every term must name a field of the relation.
    pub fn with_ordering(
        &self,
        factory: &dyn SpecFactory,
        ordering: RowOrdering,
    ) -> Result<OutputSpec> {
        let known = self.known_fields(factory)?;
        for term in ordering.terms() {
            if !known.iter().any(|f| f.name.eq_ignore_ascii_case(&term.field)) {
                return Err(Error::NoSuchField {
                    relation: self.relation().clone(),
                    field: term.field.clone(),
                });
            }
        }
        Ok(self.derive(|node| node.ordering = Some(ordering)))
    }

    pub fn without_ordering(&self) -> OutputSpec {
        self.derive(|node| node.ordering = None)
    }

    pub fn with_namespace(&self, namespace: &str) -> OutputSpec {
        self.derive(|node| node.namespace = Some(namespace.to_string()))
    }

    pub fn without_namespace(&self) -> OutputSpec {
        self.derive(|node| node.namespace = None)
    }

    pub fn with_row_element_name(&self, name: &str) -> OutputSpec {
        self.derive(|node| node.row_element_name = name.to_string())
    }

    pub fn with_row_collection_element_name(&self, name: &str) -> OutputSpec {
        self.derive(|node| node.row_collection_element_name = name.to_string())
    }

    /// Include exactly `names`, in the given order.
    pub fn with_fields(&self, factory: &dyn SpecFactory, names: &[&str]) -> Result<OutputSpec> {
        let relation = self.relation();
        let known = self.known_fields(factory)?;
        let mut fields = Vec::with_capacity(names.len());
        for name in names {
            let field = known
                .iter()
                .find(|f| f.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| Error::NoSuchField {
                    relation: relation.clone(),
                    field: name.to_string(),
                })?;
            fields.push(field.name.clone());
        }
        let derived = self.derive(|node| node.fields = fields.into());
        derived.check_element_names()?;
        Ok(derived)
    }

    /// Drop `names` from the included fields.
    pub fn without_fields(&self, names: &[&str]) -> Result<OutputSpec> {
        for name in names {
            if !self.fields().iter().any(|f| f.eq_ignore_ascii_case(name)) {
                return Err(Error::NoSuchField {
                    relation: self.relation().clone(),
                    field: name.to_string(),
                });
            }
        }
        let kept: Vec<String> = self
            .fields()
            .iter()
            .filter(|f| !names.iter().any(|n| f.eq_ignore_ascii_case(n)))
            .cloned()
            .collect();
        Ok(self.derive(|node| node.fields = kept.into()))
    }

    fn known_fields<'f>(&self, factory: &'f dyn SpecFactory) -> Result<&'f [Field]> {
        factory
            .schema()
            .fields(self.relation())
            .ok_or_else(|| Error::UnknownRelation(self.relation().clone()))
    }

    /// Element names sharing this node's content must be distinct.
    ///
    /// Field elements, parent row elements, and child collection elements
    /// (wrapped) or child row elements (inline) all sit side by side in one
    /// row element. Collisions the naming policy cannot resolve surface here
    /// instead of producing an ambiguous document.
    fn check_element_names(&self) -> Result<()> {
        let mut seen: HashSet<String> = self.fields().iter().map(|f| f.to_lowercase()).collect();
        let parents = self
            .parents()
            .iter()
            .map(|p| (&p.foreign_key, p.spec.row_element_name()));
        let children = self.children().iter().map(|c| {
            let name = match self.collection_style() {
                ChildCollectionsStyle::Wrapped => c.spec.row_collection_element_name(),
                ChildCollectionsStyle::Inline => c.spec.row_element_name(),
            };
            (&c.foreign_key, name)
        });
        for (fk, name) in parents.chain(children) {
            if !seen.insert(name.to_lowercase()) {
                return Err(Error::AmbiguousForeignKey {
                    child: fk.source().clone(),
                    parent: fk.target().clone(),
                    reason: format!(
                        "element name '{name}' is already used inside '{}'",
                        self.row_element_name()
                    ),
                });
            }
        }
        Ok(())
    }

    fn structural_hash(&self) -> u64 {
        *self.0.hash.get_or_init(|| {
            let node = &self.0;
            let mut hasher = DefaultHasher::new();
            node.relation.hash(&mut hasher);
            node.fields.hash(&mut hasher);
            node.row_element_name.hash(&mut hasher);
            node.row_collection_element_name.hash(&mut hasher);
            node.collection_style.hash(&mut hasher);
            node.children.hash(&mut hasher);
            node.parents.hash(&mut hasher);
            node.ordering.hash(&mut hasher);
            node.namespace.hash(&mut hasher);
            hasher.finish()
        })
    }
}

fn appended(list: &Arc<[EmbeddedSpec]>, entry: EmbeddedSpec) -> Arc<[EmbeddedSpec]> {
    list.iter().cloned().chain(std::iter::once(entry)).collect()
}

fn check_subtree(spec: OutputSpec, expected: &RelationId) -> Result<OutputSpec> {
    if spec.relation() != expected {
        return Err(Error::Configuration(format!(
            "subtree for {expected} describes relation {}",
            spec.relation()
        )));
    }
    Ok(spec)
}

impl PartialEq for OutputSpec {
    fn eq(&self, other: &Self) -> bool {
        if self.same_node(other) {
            return true;
        }
        if self.structural_hash() != other.structural_hash() {
            return false;
        }
        let (a, b) = (&*self.0, &*other.0);
        a.relation == b.relation
            && a.fields == b.fields
            && a.row_element_name == b.row_element_name
            && a.row_collection_element_name == b.row_collection_element_name
            && a.collection_style == b.collection_style
            && a.children == b.children
            && a.parents == b.parents
            && a.ordering == b.ordering
            && a.namespace == b.namespace
    }
}

impl Eq for OutputSpec {}

impl Hash for OutputSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl fmt::Debug for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &*self.0;
        f.debug_struct("OutputSpec")
            .field("relation", &node.relation)
            .field("fields", &node.fields)
            .field("row_element_name", &node.row_element_name)
            .field(
                "row_collection_element_name",
                &node.row_collection_element_name,
            )
            .field("collection_style", &node.collection_style)
            .field("children", &node.children)
            .field("parents", &node.parents)
            .field("ordering", &node.ordering)
            .field("namespace", &node.namespace)
            .finish()
    }
}
