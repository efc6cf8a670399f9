//! Umbrella crate for the `trakem2-adjacency` workspace.
//!
//! Re-exports the component crates and adds the per-layer measurement
//! pipeline: registry lookup, boundary qualification, bounding-box pruning,
//! sharded adjacency measurement and result-document checkpointing.

mod pipeline;
mod stats;

pub use pipeline::{LayerReport, MeasureConfig, load_registry, measure_into, measure_layer};
pub use stats::{BoundaryStats, boundary_stats};

pub use tk_adjacency::*;
pub use tk_boundary::*;
pub use tk_core::*;
pub use tk_registry::*;
pub use tk_results::*;
