use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dream_heatmap::{
    AxisOptions, AxisTransform, ClusterCache, ClusterOptions, Figure, FigureOptions,
    NumericMatrix, ZoomRequest,
};
use nalgebra::DMatrix;
use std::hint::black_box;

fn matrix(rows: usize, cols: usize) -> NumericMatrix {
    let mut state = 0x2545f4914f6cdd1du64;
    let values = DMatrix::from_fn(rows, cols, |r, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (r % 7) as f64 * 3.0 + (state % 1000) as f64 / 1000.0
    });
    NumericMatrix::new(
        values,
        (0..rows).map(|i| format!("r{i}").into()).collect(),
        (0..cols).map(|i| format!("c{i}").into()).collect(),
    )
    .expect("valid matrix")
}

fn options() -> FigureOptions {
    FigureOptions {
        rows: AxisOptions {
            transform: AxisTransform {
                cluster: Some(ClusterOptions::default()),
                ..AxisTransform::default()
            },
            ..AxisOptions::default()
        },
        ..FigureOptions::default()
    }
}

fn bench_figure(c: &mut Criterion) {
    let mut group = c.benchmark_group("figure");

    for rows in [200usize, 800] {
        let data = matrix(rows, 30);

        group.bench_with_input(BenchmarkId::new("build_cached", rows), &data, |b, data| {
            let mut cache = ClusterCache::default();
            b.iter(|| {
                let figure = Figure::build(data.clone(), options(), None, None, &mut cache)
                    .expect("figure ok");
                black_box(figure.layout().total_height);
            })
        });

        let mut cache = ClusterCache::default();
        let figure =
            Figure::build(data.clone(), options(), None, None, &mut cache).expect("figure ok");
        let half = rows as i64 / 2;
        group.bench_with_input(BenchmarkId::new("zoom", rows), &figure, |b, figure| {
            b.iter(|| {
                let zoomed = figure
                    .zoom(black_box(&ZoomRequest::Range {
                        row_start: 0,
                        row_end: half,
                        col_start: 0,
                        col_end: 30,
                    }))
                    .expect("zoom ok");
                black_box(zoomed.rows().size());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_figure);
criterion_main!(benches);
