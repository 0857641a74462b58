//! Element naming policy.
//!
//! Row and collection elements are named after their relation. When several
//! foreign keys could embed the same relation under one parent, the plain
//! name would be ambiguous, so the name is qualified with the foreign key's
//! source fields. Whether qualification is needed also depends on the
//! collection style: wrapped collections get their own element, inline ones
//! share the parent's content with parent elements pointing the other way.

use relxml_core::utils::dash_join_lowercase;
use relxml_core::{FieldSet, ForeignKey, RelationId, SchemaGraph};
use serde::Deserialize;

use crate::{Error, Result};

/// How child rows are placed inside their parent row element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildCollectionsStyle {
    /// Child rows sit inside one collection element per foreign key.
    #[default]
    Wrapped,
    /// Child rows are concatenated directly into the parent element.
    Inline,
}

/// Everything a naming decision depends on for one (child, parent) pair.
#[derive(Clone, Debug)]
pub struct NamingContext<'a> {
    pub child: &'a RelationId,
    pub parent: &'a RelationId,
    /// Source fields of the foreign key in question, if the caller named one.
    pub fields: Option<&'a FieldSet>,
    pub style: ChildCollectionsStyle,
    /// Edges child -> parent.
    pub forward: Vec<&'a ForeignKey>,
    /// Edges parent -> child.
    pub reverse: Vec<&'a ForeignKey>,
}

impl<'a> NamingContext<'a> {
    pub fn new<S: SchemaGraph + ?Sized>(
        schema: &'a S,
        child: &'a RelationId,
        parent: &'a RelationId,
        fields: Option<&'a FieldSet>,
        style: ChildCollectionsStyle,
    ) -> Self {
        Self {
            child,
            parent,
            fields,
            style,
            forward: schema.foreign_keys_between(child, parent),
            reverse: schema.foreign_keys_between(parent, child),
        }
    }

    /// The forward edge selected by `fields`.
    ///
    /// Only called once qualification is known to be required, so a missing
    /// field set is an ambiguity rather than a lookup failure.
    fn selected_forward(&self) -> Result<&'a ForeignKey> {
        let Some(fields) = self.fields else {
            return Err(Error::AmbiguousForeignKey {
                child: self.child.clone(),
                parent: self.parent.clone(),
                reason: "element name needs qualification but no foreign key fields were given"
                    .to_string(),
            });
        };
        match_foreign_key(&self.forward, Some(fields), self.child, self.parent)
    }
}

/// Pick exactly one foreign key out of `candidates`.
///
/// With `fields`, candidates are narrowed to those whose source field set
/// equals it (ignoring order and case).
pub fn match_foreign_key<'a>(
    candidates: &[&'a ForeignKey],
    fields: Option<&FieldSet>,
    child: &RelationId,
    parent: &RelationId,
) -> Result<&'a ForeignKey> {
    let matching: Vec<&'a ForeignKey> = match fields {
        Some(fields) => candidates
            .iter()
            .copied()
            .filter(|fk| fk.has_source_fields(fields))
            .collect(),
        None => candidates.to_vec(),
    };

    match matching.as_slice() {
        [fk] => Ok(*fk),
        [] => Err(Error::NoSuchForeignKey {
            child: child.clone(),
            parent: parent.clone(),
            fields: fields.cloned(),
        }),
        _ => Err(Error::AmbiguousForeignKey {
            child: child.clone(),
            parent: parent.clone(),
            reason: match fields {
                Some(fields) => format!("{} foreign keys use source fields {fields}", matching.len()),
                None => format!(
                    "{} foreign keys exist, source fields are needed to choose one",
                    matching.len()
                ),
            },
        }),
    }
}

/// Decides XML element names for relations embedded in output specifications.
pub trait ElementNamer: Send + Sync {
    fn default_row_element_name(&self, relation: &RelationId) -> String;

    fn default_row_collection_element_name(&self, relation: &RelationId) -> String;

    /// Name of the wrapper element holding `ctx.child` rows inside a `ctx.parent` row.
    fn child_collection_element_name(&self, ctx: &NamingContext<'_>) -> Result<String>;

    /// Name of each `ctx.child` row element inside a `ctx.parent` row.
    fn child_row_element_name(&self, ctx: &NamingContext<'_>) -> Result<String>;

    /// Name of the `ctx.parent` row element embedded inside a `ctx.child` row.
    fn parent_row_element_name(&self, ctx: &NamingContext<'_>) -> Result<String>;
}

/// The standard naming policy: lowercase relation names, qualified only when needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultElementNamer;

impl ElementNamer for DefaultElementNamer {
    fn default_row_element_name(&self, relation: &RelationId) -> String {
        relation.name().to_lowercase()
    }

    fn default_row_collection_element_name(&self, relation: &RelationId) -> String {
        format!("{}-listing", self.default_row_element_name(relation))
    }

    fn child_collection_element_name(&self, ctx: &NamingContext<'_>) -> Result<String> {
        let base = self.default_row_collection_element_name(ctx.child);
        if ctx.forward.len() <= 1 {
            return Ok(base);
        }
        let fk = ctx.selected_forward()?;
        Ok(format!(
            "{base}-from-{}",
            dash_join_lowercase(fk.source_field_names())
        ))
    }

    fn child_row_element_name(&self, ctx: &NamingContext<'_>) -> Result<String> {
        let base = self.default_row_element_name(ctx.child);
        if ctx.style == ChildCollectionsStyle::Wrapped {
            return Ok(base);
        }

        let qualify = ctx.forward.len() > 1 || !ctx.reverse.is_empty();
        if !qualify {
            return Ok(base);
        }
        let fk = ctx.selected_forward()?;
        if ctx.forward.len() == 1 {
            Ok(format!("child-{base}"))
        } else {
            Ok(format!(
                "{base}-child-referencing-via-{}",
                dash_join_lowercase(fk.source_field_names())
            ))
        }
    }

    fn parent_row_element_name(&self, ctx: &NamingContext<'_>) -> Result<String> {
        let base = self.default_row_element_name(ctx.parent);
        let reverse_collision =
            ctx.style == ChildCollectionsStyle::Inline && !ctx.reverse.is_empty();
        let qualify = ctx.forward.len() > 1 || reverse_collision;
        if !qualify {
            return Ok(base);
        }
        let fk = ctx.selected_forward()?;
        if ctx.forward.len() == 1 {
            Ok(format!("parent-{base}"))
        } else {
            Ok(format!(
                "{base}-parent-referenced-via-{}",
                dash_join_lowercase(fk.source_field_names())
            ))
        }
    }
}

/// Type names for schema documents.
///
/// Unlike element names, type names live in one document-wide namespace, so a
/// relation whose bare name is shared with a relation in another schema uses
/// its schema-qualified name instead.
pub struct TypeNamer<'s, S: SchemaGraph + ?Sized> {
    schema: &'s S,
}

impl<'s, S: SchemaGraph + ?Sized> TypeNamer<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        Self { schema }
    }

    pub fn row_type_name(&self, relation: &RelationId) -> String {
        let shared = self
            .schema
            .relation_ids()
            .into_iter()
            .any(|other| other != relation && other.same_bare_name(relation));
        if shared {
            relation.to_string().to_lowercase()
        } else {
            relation.name().to_lowercase()
        }
    }

    pub fn collection_type_name(&self, relation: &RelationId) -> String {
        format!("{}-listing", self.row_type_name(relation))
    }
}
