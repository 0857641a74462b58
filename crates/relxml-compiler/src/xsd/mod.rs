//! XML Schema generation.
//!
//! Describes the documents the compiled queries produce: one global element
//! for the root row element and one `xs:complexType` per distinct row node
//! and per collection. Type names come from [`TypeNamer`](crate::TypeNamer)
//! and are made unique with a numeric suffix when a relation appears in
//! several shapes.

mod config;
mod emitter;


pub use config::XsdConfig;
pub use emitter::XsdGenerator;
