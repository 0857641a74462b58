//! relxml compiler: element naming, output specifications, and SQL/XML query compilation.
//!
//! This crate turns a schema graph into nested XML-producing SQL:
//! - `naming` - element naming policy (collision-free, deterministic)
//! - `spec` - immutable output-specification trees and their factory
//! - `compile` - row-elements, row-collection and row-forest query compilation
//! - `render` - templating backend seam and the default SQL/XML backend
//! - `xsd` - XML Schema generation for an output specification

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compile;
pub mod naming;
pub mod render;
pub mod spec;
pub mod xsd;

#[cfg(test)]
mod naming_tests;
#[cfg(test)]
pub mod test_utils;

pub use compile::{
    CompilerConfig, FieldOutput, QueryCompiler, QueryCompilerBuilder, RowOutput, XmlOutputType,
};
pub use naming::{ChildCollectionsStyle, DefaultElementNamer, ElementNamer, TypeNamer};
pub use render::{Model, RenderError, SqlXmlTemplates, TemplateKind, Templates, Value};
pub use spec::{
    Direction, EmbeddedSpec, OutputSpec, OutputSpecFactory, RowOrdering, SpecFactory,
};
pub use xsd::{XsdConfig, XsdGenerator};

use relxml_core::{FieldSet, RelationId};

/// Errors raised while building specifications or compiling queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required construction argument was not supplied.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// More than one foreign key fits and nothing picks one of them.
    #[error("ambiguous foreign key from {child} to {parent}: {reason}")]
    AmbiguousForeignKey {
        child: RelationId,
        parent: RelationId,
        reason: String,
    },

    #[error("no foreign key from {child} to {parent}{}", describe_fields(.fields))]
    NoSuchForeignKey {
        child: RelationId,
        parent: RelationId,
        fields: Option<FieldSet>,
    },

    #[error("relation {0} not found in schema")]
    UnknownRelation(RelationId),

    #[error("relation {relation} has no field named {field}")]
    NoSuchField { relation: RelationId, field: String },

    #[error("invalid row ordering: {0}")]
    InvalidOrdering(String),

    /// The templating backend failed; only its message is kept.
    #[error("rendering failed: {0}")]
    Rendering(String),
}

fn describe_fields(fields: &Option<FieldSet>) -> String {
    match fields {
        Some(fields) => format!(" with source fields {fields}"),
        None => String::new(),
    }
}

/// Result type for specification and compilation operations.
pub type Result<T> = std::result::Result<T, Error>;
