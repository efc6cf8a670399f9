use std::sync::Arc;

use log::trace;
use tk_boundary::Boundary;
use tk_core::AdjacencyRecord;

use crate::prune::CandidatePair;

/// Measured contact between two boundaries.
#[derive(Debug, Clone)]
pub struct Adjacency {
    pub a: Arc<Boundary>,
    pub b: Arc<Boundary>,
    pub length: usize,
}

impl Adjacency {
    pub fn record(&self) -> AdjacencyRecord {
        AdjacencyRecord {
            cell1: self.a.name().to_owned(),
            index1: self.a.index(),
            cell2: self.b.name().to_owned(),
            index2: self.b.index(),
            adjacency: self.length,
        }
    }
}

/// Number of boundary pixels in contact between `a` and `b`.
///
/// A pixel of `a` is in contact when some pixel of `b` lies within
/// `pixel_radius` (Euclidean, inclusive), and symmetrically for `b`. The
/// smaller of the two counts is returned, so the result does not depend on
/// argument order. Each distinct pixel counts once.
pub fn compute_adjacency(a: &Boundary, b: &Boundary, pixel_radius: f64) -> usize {
    let pa = a.distinct_pixels();
    let pb = b.distinct_pixels();
    if pa.is_empty() || pb.is_empty() {
        return 0;
    }

    let r2 = pixel_radius * pixel_radius;
    let mut near_b = vec![false; pb.len()];
    let mut near_a = 0usize;
    for &p in pa {
        let mut hit = false;
        for (j, &q) in pb.iter().enumerate() {
            if p.dist_sq(q) as f64 <= r2 {
                hit = true;
                near_b[j] = true;
            }
        }
        if hit {
            near_a += 1;
        }
    }
    let near_b = near_b.iter().filter(|&&hit| hit).count();

    trace!(
        "{}[{}] ~ {}[{}]: {near_a} / {near_b} pixels within {pixel_radius}",
        a.name(),
        a.index(),
        b.name(),
        b.index()
    );
    near_a.min(near_b)
}

/// Measures every candidate pair, keeping those with non-zero contact in
/// input order.
pub fn batch_compute_adjacency(pairs: &[CandidatePair], pixel_radius: f64) -> Vec<Adjacency> {
    pairs
        .iter()
        .filter_map(|pair| {
            let length = compute_adjacency(&pair.a, &pair.b, pixel_radius);
            (length > 0).then(|| Adjacency {
                a: Arc::clone(&pair.a),
                b: Arc::clone(&pair.b),
                length,
            })
        })
        .collect()
}
