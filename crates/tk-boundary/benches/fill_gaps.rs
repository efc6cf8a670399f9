use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tk_boundary::fill_gaps;
use tk_core::Pixel;

fn synthetic_polygon(vertices: usize, radius: f64) -> Vec<Pixel> {
    (0..vertices)
        .map(|i| {
            let t = i as f64 / vertices as f64 * std::f64::consts::TAU;
            Pixel::new(
                (2000.0 + radius * t.cos()) as i64,
                (2000.0 + radius * t.sin()) as i64,
            )
        })
        .collect()
}

fn bench_fill_gaps(c: &mut Criterion) {
    let polygon = synthetic_polygon(400, 350.0);

    c.bench_function("tk_boundary_fill_gaps_400v", |b| {
        b.iter(|| {
            let path = fill_gaps(black_box(&polygon));
            black_box(path.len());
        });
    });
}

criterion_group!(benches, bench_fill_gaps);
criterion_main!(benches);
