use std::collections::HashSet;

use tk_core::{Pixel, Point2d};

/// Shoelace area of the implicitly closed polygon, sign discarded.
pub fn polygon_area(vertices: &[Point2d]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut acc = 0.0;
    for i in 0..n {
        let j = if i == 0 { n - 1 } else { i - 1 };
        acc += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
    }
    0.5 * acc.abs()
}

/// Densifies a sparse closed vertex path into a pixel path.
///
/// For every edge `c1 -> c2` (including the closing edge back to the first
/// vertex) the walk emits `c1`, then the vertical run at `c1.x` covering
/// `min(y)..=max(y)` when the rows differ, then the horizontal run at `c2.y`
/// covering `c2.x..=c1.x`, but only when `c2.x < c1.x`. Edges heading right
/// get no horizontal run. Runs are always emitted in ascending order, so the
/// output may repeat pixels.
pub fn fill_gaps(vertices: &[Pixel]) -> Vec<Pixel> {
    let n = vertices.len();
    if n == 0 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(n * 4);
    for i in 0..n {
        let c1 = vertices[i];
        let c2 = vertices[(i + 1) % n];
        out.push(c1);

        if c1.y != c2.y {
            let (lo, hi) = (c1.y.min(c2.y), c1.y.max(c2.y));
            out.extend((lo..=hi).map(|y| Pixel::new(c1.x, y)));
        }

        if c2.x < c1.x {
            out.extend((c2.x..=c1.x).map(|x| Pixel::new(x, c2.y)));
        }
    }
    out
}

/// Drops repeated pixels, keeping first occurrences in path order.
pub fn distinct_pixels(path: &[Pixel]) -> Vec<Pixel> {
    let mut seen = HashSet::with_capacity(path.len());
    path.iter().copied().filter(|p| seen.insert(*p)).collect()
}
