//! Templating backends.
//!
//! The compiler resolves every query into a flat [`Model`] and hands it to a
//! [`Templates`] implementation together with the [`TemplateKind`] to stamp.
//! [`SqlXmlTemplates`] renders standard SQL/XML; other dialects plug in by
//! implementing the trait.
//!
//! Model keys are listed in [`keys`]. Embedded fragments arrive already
//! rendered, one list item per fragment.

mod model;
mod sql_xml;


pub use model::{Model, Value};
pub use sql_xml::SqlXmlTemplates;

/// Query shape a model describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    RowElements,
    RowCollection,
    RowForest,
}

/// Renders final query text from a resolved model.
pub trait Templates: Send + Sync {
    fn render(&self, template: TemplateKind, model: &Model) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("model has no '{0}' entry")]
    MissingKey(String),

    #[error("model entry '{key}' should be {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Failure reported by a backend for its own reasons.
    #[error("{0}")]
    Backend(String),
}

/// Model keys shared by the compiler and the backends.
pub mod keys {
    /// Rendered relation reference, `schema.name` or `name`.
    pub const RELATION: &str = "relation";
    pub const ALIAS: &str = "alias";
    /// Field names selected as plain columns (row-elements only).
    pub const SELECT_FIELDS: &str = "selectFields";
    /// Field names rendered as child elements (row-elements only).
    pub const XML_FIELDS: &str = "xmlFields";
    pub const ROW_ELEMENT_NAME: &str = "rowElementName";
    /// Present only when the collection shape has a wrapper element.
    pub const COLLECTION_ELEMENT_NAME: &str = "collectionElementName";
    /// Present only when a namespace declaration is needed.
    pub const NAMESPACE: &str = "namespace";
    pub const PARENT_FRAGMENTS: &str = "parentFragments";
    pub const CHILD_FRAGMENTS: &str = "childFragments";
    /// Inner row-elements query of a collection or forest.
    pub const ROWS_QUERY: &str = "rowsQuery";
    /// Optional `where` condition.
    pub const FILTER: &str = "filter";
    /// `alias.field dir` terms, possibly empty.
    pub const ORDER_BY: &str = "orderBy";
    pub const LARGE_CHAR_OUTPUT: &str = "largeCharOutput";
    pub const RESULT_COLUMN: &str = "resultColumn";
}

/// Result column of row-elements queries.
pub const ROW_XML_COLUMN: &str = "ROW_XML";

/// Result column of row-collection and row-forest queries.
pub const ROW_COLLECTION_XML_COLUMN: &str = "ROWCOLL_XML";
