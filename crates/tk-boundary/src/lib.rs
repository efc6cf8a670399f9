//! Boundary model for segmented objects in one TrakEM2 layer.
//!
//! A [`Boundary`] is one closed polygon of one area list in one layer. Its
//! derived properties are computed in a fixed order, tracked by
//! [`BoundaryStage`]:
//!
//! `Raw -> AreaComputed -> GapFilled -> BoxComputed -> BoxScaled`
//!
//! Each transition checks its precondition and fails with
//! [`tk_core::Error::InvalidStage`] otherwise.
//!
//! Gap filling is an axis-aligned staircase walk between consecutive
//! vertices, not a Bresenham rasterization. See [`fill_gaps`].

mod boundary;
mod gaps;
mod layer;
mod prepare;

pub use boundary::{Boundary, BoundaryStage};
pub use gaps::{distinct_pixels, fill_gaps, polygon_area};
pub use layer::LayerBoundaries;
pub use prepare::{BoundaryConfig, prepare_boundary};
