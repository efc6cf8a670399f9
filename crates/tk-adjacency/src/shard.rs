use log::debug;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tk_core::Error;

use crate::engine::{Adjacency, batch_compute_adjacency};
use crate::prune::CandidatePair;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjacencyConfig {
    /// Contact distance in pixels, inclusive.
    pub pixel_radius: f64,
    /// Worker threads used per layer. `0` and `1` both run inline.
    pub workers: usize,
}

impl Default for AdjacencyConfig {
    fn default() -> Self {
        Self {
            pixel_radius: 10.0,
            workers: 1,
        }
    }
}

/// Splits `pairs` into `n` strided shards: shard `i` holds pairs
/// `i, i + n, i + 2n, ...`. Some shards are empty when `n > pairs.len()`.
pub fn shard_pairs(pairs: Vec<CandidatePair>, n: usize) -> Vec<Vec<CandidatePair>> {
    let n = n.max(1);
    let mut shards: Vec<Vec<CandidatePair>> = (0..n).map(|_| Vec::new()).collect();
    for (i, pair) in pairs.into_iter().enumerate() {
        shards[i % n].push(pair);
    }
    shards
}

/// Measures all `pairs` across `cfg.workers` threads.
///
/// Results are concatenated in shard order; only the set of results is
/// meaningful. A panicking worker propagates to the caller.
pub fn run_sharded(pairs: Vec<CandidatePair>, cfg: &AdjacencyConfig) -> Result<Vec<Adjacency>, Error> {
    if cfg.workers <= 1 {
        return Ok(batch_compute_adjacency(&pairs, cfg.pixel_radius));
    }

    let total = pairs.len();
    let shards = shard_pairs(pairs, cfg.workers);
    let pool = ThreadPoolBuilder::new()
        .num_threads(cfg.workers)
        .thread_name(|i| format!("adjacency-{i}"))
        .build()
        .map_err(|err| Error::WorkerPool(err.to_string()))?;

    debug!("measuring {total} pairs in {} shards", shards.len());
    let radius = cfg.pixel_radius;
    let per_shard: Vec<Vec<Adjacency>> = pool.install(|| {
        shards
            .into_par_iter()
            .map(|shard| batch_compute_adjacency(&shard, radius))
            .collect()
    });
    Ok(per_shard.into_iter().flatten().collect())
}
