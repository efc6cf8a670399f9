use std::collections::BTreeSet;
use std::sync::Arc;

use tk_boundary::{Boundary, LayerBoundaries};

#[derive(Debug, Clone, PartialEq)]
pub struct PruneConfig {
    /// Objects never paired, e.g. background or marker area lists.
    pub excluded: BTreeSet<String>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            excluded: BTreeSet::from(["Pharynx".to_owned(), "Phi_Marker".to_owned()]),
        }
    }
}

/// Two boundaries of different objects with intersecting bounding boxes.
#[derive(Debug, Clone)]
pub struct CandidatePair {
    pub a: Arc<Boundary>,
    pub b: Arc<Boundary>,
}

/// All cross-object boundary pairs whose bounding boxes overlap.
///
/// Objects are enumerated in ascending name order and `a` always belongs to
/// the earlier name. Boundaries without a bounding box are never paired.
pub fn overlapping_pairs(boundaries: &LayerBoundaries, cfg: &PruneConfig) -> Vec<CandidatePair> {
    let objects: Vec<(&str, &[Arc<Boundary>])> = boundaries
        .iter()
        .filter(|(name, _)| !cfg.excluded.contains(*name))
        .collect();

    let mut pairs = Vec::new();
    for (i, (_, lhs)) in objects.iter().enumerate() {
        for (_, rhs) in &objects[i + 1..] {
            for a in lhs.iter() {
                let Some(abox) = a.bounding_box() else {
                    continue;
                };
                for b in rhs.iter() {
                    if b.bounding_box().is_some_and(|bbox| abox.overlaps(&bbox)) {
                        pairs.push(CandidatePair {
                            a: Arc::clone(a),
                            b: Arc::clone(b),
                        });
                    }
                }
            }
        }
    }
    pairs
}
