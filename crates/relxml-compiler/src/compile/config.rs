//! Compiler configuration.

use serde::Deserialize;

/// SQL type of the XML result column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XmlOutputType {
    /// Native XML.
    #[default]
    Xml,
    /// Serialized XML in a large character object.
    LargeChar,
}

/// Which plain field columns a row-elements query selects next to its XML column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOutput {
    /// Only the XML column.
    None,
    /// The fields the output specification includes.
    #[default]
    Included,
    /// Every field of the relation, so a filter may reference any of them.
    All,
}

/// Result columns of a row-elements query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RowOutput {
    pub fields: FieldOutput,
    pub xml_type: XmlOutputType,
}

impl RowOutput {
    pub fn new(fields: FieldOutput, xml_type: XmlOutputType) -> Self {
        Self { fields, xml_type }
    }

    /// Just a native XML column, as used for embedded fragments.
    pub fn xml_only() -> Self {
        Self::new(FieldOutput::None, XmlOutputType::Xml)
    }
}

/// Configuration for [`QueryCompiler`](super::QueryCompiler).
///
/// Loadable with serde; absent keys take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// XML column type for top-level queries.
    pub(crate) xml_output_type: XmlOutputType,
    /// Field columns for top-level row-elements queries.
    pub(crate) field_output: FieldOutput,
    /// Put the child side of foreign-key conditions on the left of `=`.
    pub(crate) child_side_on_left: bool,
    /// Spaces per nesting level in the default backend.
    pub(crate) indent: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            xml_output_type: XmlOutputType::default(),
            field_output: FieldOutput::default(),
            child_side_on_left: true,
            indent: 2,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn xml_output_type(mut self, value: XmlOutputType) -> Self {
        self.xml_output_type = value;
        self
    }

    pub fn field_output(mut self, value: FieldOutput) -> Self {
        self.field_output = value;
        self
    }

    pub fn child_side_on_left(mut self, value: bool) -> Self {
        self.child_side_on_left = value;
        self
    }

    pub fn indent(mut self, value: usize) -> Self {
        self.indent = value;
        self
    }

    /// Output for top-level row-elements queries.
    pub fn row_output(&self) -> RowOutput {
        RowOutput::new(self.field_output, self.xml_output_type)
    }
}
