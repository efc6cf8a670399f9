//! Foundational primitives for TrakEM2 boundary-adjacency measurement.
//!
//! ## Coordinate Frames
//! Raw polygon vertices are `f64` points in the layer-local frame after the
//! owning area list's translation has been applied. Gap-filled boundary paths
//! are integer [`Pixel`]s obtained by truncating toward zero.
//!
//! ## Bounding Boxes
//! Boxes are inclusive on both corners, so a single pixel has width and
//! height `1`. Overlap uses the axis-aligned separation test: two boxes
//! overlap unless one lies strictly beside or strictly above/below the other.

mod error;
mod geom;
mod image;
mod record;

pub use error::Error;
pub use geom::{BoundingBox, Offset2d, Pixel, Point2d};
pub use image::Image;
pub use record::AdjacencyRecord;
