//! SQL/XML query compilation.
//!
//! Walks an [`OutputSpec`](crate::spec::OutputSpec) tree and produces nested
//! queries in three shapes:
//! - row-elements: one row element per relation row (`ROW_XML`)
//! - row-collection: all row elements aggregated under a wrapper (`ROWCOLL_XML`)
//! - row-forest: the aggregated row elements without a wrapper (`ROWCOLL_XML`)
//!
//! Embedded parents become row-elements fragments; embedded children become
//! collection or forest fragments depending on the node's collection style.
//! Each fragment is correlated to its enclosing row by its foreign key.

mod alias;
mod compiler;
mod config;

#[cfg(test)]
mod compiler_tests;

pub use alias::AliasScope;
pub use compiler::{QueryCompiler, QueryCompilerBuilder};
pub use config::{CompilerConfig, FieldOutput, RowOutput, XmlOutputType};
