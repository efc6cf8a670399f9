//! Adjacency measurement between cell boundaries of one layer.
//!
//! Two stages:
//! - [`overlapping_pairs`] narrows all boundary pairs to those whose
//!   (scaled) bounding boxes intersect. Pairs never join two boundaries of
//!   the same object, and each unordered pair appears once.
//! - [`compute_adjacency`] counts, over the gap-filled pixels of both
//!   boundaries, how many pixels of A lie within `pixel_radius` of B and vice
//!   versa, and reports the smaller count.
//!
//! [`run_sharded`] splits a candidate list into disjoint strided shards and
//! measures them on a dedicated thread pool. Pairs share no mutable state, so
//! concatenating shard results gives the same set of triples as one
//! sequential [`batch_compute_adjacency`] call.

mod engine;
mod prune;
mod shard;

pub use engine::{Adjacency, batch_compute_adjacency, compute_adjacency};
pub use prune::{CandidatePair, PruneConfig, overlapping_pairs};
pub use shard::{AdjacencyConfig, run_sharded, shard_pairs};
