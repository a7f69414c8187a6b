//! Nested-set materialization: flat rows in, immutable tree snapshot out.

mod materializer;
mod snapshot;

pub use materializer::{StructureError, materialize};
pub use snapshot::{MaterializedStructure, StructureNode};
