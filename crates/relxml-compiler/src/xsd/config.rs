//! Configuration for XML Schema generation.

use serde::Deserialize;

/// Configuration for [`XsdGenerator`](super::XsdGenerator).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct XsdConfig {
    /// Child collection elements may be absent.
    pub(crate) child_collections_optional: bool,
    /// Parent row elements may be absent even when the foreign key is not nullable.
    pub(crate) parent_elements_optional: bool,
    /// Also declare the root relation's collection element globally.
    pub(crate) include_collection_root: bool,
    /// Spaces per nesting level.
    pub(crate) indent: usize,
}

impl Default for XsdConfig {
    fn default() -> Self {
        Self {
            child_collections_optional: true,
            parent_elements_optional: false,
            include_collection_root: false,
            indent: 2,
        }
    }
}

impl XsdConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_collections_optional(mut self, value: bool) -> Self {
        self.child_collections_optional = value;
        self
    }

    pub fn parent_elements_optional(mut self, value: bool) -> Self {
        self.parent_elements_optional = value;
        self
    }

    pub fn include_collection_root(mut self, value: bool) -> Self {
        self.include_collection_root = value;
        self
    }

    pub fn indent(mut self, value: usize) -> Self {
        self.indent = value;
        self
    }
}
