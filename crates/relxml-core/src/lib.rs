#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Schema graph model for relxml.
//!
//! A schema graph is a set of relations (tables and views) with their fields,
//! joined by directed foreign-key edges from a child relation to a parent.
//! Cycles are allowed: relations may reference themselves or each other.
//!
//! Consumers only see the graph through the [`SchemaGraph`] trait, so metadata
//! can come from anywhere. [`SchemaMetadata`] is the in-memory implementation,
//! built programmatically or loaded from JSON.

mod error;
mod ids;
mod json;
mod metadata;
pub mod utils;

#[cfg(test)]
mod utils_tests;

pub use error::SchemaError;
pub use ids::{CaseSensitivity, RelationId};
pub use metadata::{
    Field, FieldSet, ForeignKey, RelationKind, RelationMetadata, SchemaMetadata,
    SchemaMetadataBuilder,
};

// ============================================================================
// SchemaGraph Trait
// ============================================================================

/// Read-only access to relation metadata and foreign-key edges.
///
/// Edge lists come back in a stable order (declaration order for
/// [`SchemaMetadata`]); naming and tree expansion depend on that for
/// deterministic output.
pub trait SchemaGraph {
    /// Every relation with registered metadata.
    fn relation_ids(&self) -> Vec<&RelationId>;

    fn contains(&self, relation: &RelationId) -> bool;

    /// Fields of a relation in declaration order, `None` if unknown.
    fn fields(&self, relation: &RelationId) -> Option<&[Field]>;

    /// Edges whose source is `child` and whose target is `parent`.
    fn foreign_keys_between(&self, child: &RelationId, parent: &RelationId) -> Vec<&ForeignKey>;

    /// Edges where `child` is the referencing side.
    fn foreign_keys_from_child(&self, child: &RelationId) -> Vec<&ForeignKey>;

    /// Edges where `parent` is the referenced side.
    fn foreign_keys_to_parent(&self, parent: &RelationId) -> Vec<&ForeignKey>;

    /// Fold an identifier the way the database stores unquoted names.
    fn normalize(&self, ident: &str) -> String;
}

impl<T: SchemaGraph + ?Sized> SchemaGraph for &T {
    fn relation_ids(&self) -> Vec<&RelationId> {
        (*self).relation_ids()
    }
    fn contains(&self, relation: &RelationId) -> bool {
        (*self).contains(relation)
    }
    fn fields(&self, relation: &RelationId) -> Option<&[Field]> {
        (*self).fields(relation)
    }
    fn foreign_keys_between(&self, child: &RelationId, parent: &RelationId) -> Vec<&ForeignKey> {
        (*self).foreign_keys_between(child, parent)
    }
    fn foreign_keys_from_child(&self, child: &RelationId) -> Vec<&ForeignKey> {
        (*self).foreign_keys_from_child(child)
    }
    fn foreign_keys_to_parent(&self, parent: &RelationId) -> Vec<&ForeignKey> {
        (*self).foreign_keys_to_parent(parent)
    }
    fn normalize(&self, ident: &str) -> String {
        (*self).normalize(ident)
    }
}
