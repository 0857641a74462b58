//! Output-specification trees.
//!
//! An [`OutputSpec`] describes one relation's XML rendition together with the
//! child and parent relations embedded in each of its rows. Trees are built
//! one level at a time through a [`SpecFactory`], so cyclic schema graphs
//! never produce unbounded trees.

mod factory;
mod node;
mod ordering;


pub use factory::{OutputSpecFactory, OutputSpecFactoryBuilder, SpecFactory};
pub use node::{EmbeddedSpec, OutputSpec};
pub use ordering::{Direction, OrderingTerm, RowOrdering};
