use tk_boundary::BoundaryConfig;
use tk_core::{Error, Point2d};
use tk_registry::Registry;

/// Shape measurements of one qualifying boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryStats {
    pub layer: String,
    pub name: String,
    pub index: usize,
    /// Mean boundary pixel in the layer's patch frame.
    pub centroid: Point2d,
    pub area: f64,
    pub boundary_length: usize,
}

/// Per-boundary statistics for `layers`, grouped by layer then object name.
pub fn boundary_stats(
    registry: &Registry,
    layers: &[String],
    cfg: &BoundaryConfig,
) -> Result<Vec<BoundaryStats>, Error> {
    let mut out = Vec::new();
    for layer in layers {
        let boundaries = registry.boundaries_in_layer(layer, cfg, None)?;
        for (_, list) in boundaries.iter() {
            for b in list {
                let (Some(centroid), Some(area)) = (b.centroid(), b.area()) else {
                    continue;
                };
                out.push(BoundaryStats {
                    layer: layer.clone(),
                    name: b.name().to_owned(),
                    index: b.index(),
                    centroid,
                    area,
                    boundary_length: b.boundary_length()?,
                });
            }
        }
    }
    Ok(out)
}
