use tk_core::Error;

use crate::Boundary;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    /// Boundaries with area at or below this many px^2 are dropped.
    pub area_threshold: f64,
    pub scale_bounding_box: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            area_threshold: 200.0,
            scale_bounding_box: 1.1,
        }
    }
}

/// Runs a raw boundary through area, gap filling and bounding box stages.
///
/// Returns `Ok(None)` unless the enclosed area exceeds the threshold, which
/// also drops boundaries whose area is NaN.
pub fn prepare_boundary(
    mut boundary: Boundary,
    cfg: &BoundaryConfig,
) -> Result<Option<Boundary>, Error> {
    let area = boundary.compute_area()?;
    if !(area > cfg.area_threshold) {
        return Ok(None);
    }

    boundary.fill_gaps()?;
    boundary.compute_bounding_box()?;
    boundary.scale_bounding_box(cfg.scale_bounding_box)?;
    Ok(Some(boundary))
}
