use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info};
use tk_adjacency::{Adjacency, AdjacencyConfig, PruneConfig, overlapping_pairs, run_sharded};
use tk_boundary::BoundaryConfig;
use tk_core::{AdjacencyRecord, Error};
use tk_registry::{Registry, RegistryConfig};
use tk_results::ResultDocument;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureConfig {
    pub registry: RegistryConfig,
    pub boundary: BoundaryConfig,
    pub prune: PruneConfig,
    pub adjacency: AdjacencyConfig,
}

/// Outcome of measuring one layer.
#[derive(Debug, Clone)]
pub struct LayerReport {
    pub layer: String,
    pub boundaries: usize,
    pub candidate_pairs: usize,
    pub records: Vec<AdjacencyRecord>,
    pub elapsed: Duration,
}

pub fn load_registry(path: &Path, cfg: &RegistryConfig) -> Result<Registry, Error> {
    let bytes = fs::read(path)?;
    Registry::from_bytes(&bytes, cfg)
}

/// Measures every adjacency in `layer`.
pub fn measure_layer(
    registry: &Registry,
    layer: &str,
    cfg: &MeasureConfig,
) -> Result<LayerReport, Error> {
    let started = Instant::now();

    let boundaries = registry.boundaries_in_layer(layer, &cfg.boundary, None)?;
    let pairs = overlapping_pairs(&boundaries, &cfg.prune);
    let candidate_pairs = pairs.len();
    debug!(
        "layer {layer}: {} boundaries, {candidate_pairs} overlapping pairs",
        boundaries.num_boundaries()
    );

    let records = run_sharded(pairs, &cfg.adjacency)?
        .iter()
        .map(Adjacency::record)
        .collect();

    Ok(LayerReport {
        layer: layer.to_owned(),
        boundaries: boundaries.num_boundaries(),
        candidate_pairs,
        records,
        elapsed: started.elapsed(),
    })
}

/// Measures `layers` in order and writes each into the result document at
/// `output`, saving after every layer.
///
/// Every name is checked against the registry before `output` is touched.
/// Layers already present in the document are replaced; all others are
/// kept as they were. `on_layer` receives the zero-based position of each
/// finished layer.
pub fn measure_into(
    registry: &Registry,
    layers: &[String],
    cfg: &MeasureConfig,
    output: &Path,
    mut on_layer: impl FnMut(usize, &LayerReport),
) -> Result<Vec<LayerReport>, Error> {
    if let Some(unknown) = layers.iter().find(|l| registry.layer(l).is_none()) {
        return Err(Error::UnknownLayer(unknown.clone()));
    }

    let mut doc = ResultDocument::open(output)?;
    let mut reports = Vec::with_capacity(layers.len());
    for (i, layer) in layers.iter().enumerate() {
        let report = measure_layer(registry, layer, cfg)?;
        doc.replace_layer(layer, report.records.clone());
        doc.save(output)?;
        info!(
            "layer {layer}: {} adjacencies saved to {}",
            report.records.len(),
            output.display()
        );
        on_layer(i, &report);
        reports.push(report);
    }
    Ok(reports)
}
