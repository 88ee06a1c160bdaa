use car_price::config::ModelSettings;
use car_price::data::{load_dataset, CarQuery};
use car_price::pipeline::FittedPipeline;
use car_price::training::RandomForestRegressor;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

fn create_regression_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);
    let y = x.rows().into_iter().map(|row| row.sum() + rng.gen::<f64>() * 0.1).collect();
    (x, y)
}

fn bench_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest");
    group.sample_size(10);

    for n_rows in [500, 2000, 5000].iter() {
        let (x, y) = create_regression_data(*n_rows, 30);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let mut forest = RandomForestRegressor::new(100);
                forest.fit(black_box(x), black_box(y)).unwrap();
            })
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/car_data.csv");
    let df = load_dataset(&path).unwrap();
    let settings = ModelSettings::default();

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.bench_function("fit_bundled", |b| {
        b.iter(|| FittedPipeline::fit(black_box(&df), &settings).unwrap())
    });
    group.finish();

    let pipeline = FittedPipeline::fit(&df, &settings).unwrap();
    let query = CarQuery {
        city: "Hyderabad".into(),
        fuel_type: "Diesel".into(),
        body_type: "SUV".into(),
        transmission_type: "Automatic".into(),
        seats: 5,
        engine_displacement: 1493,
        kilometers_driven: 42000,
        year_of_manufacture: 2018,
        previous_owners: 1,
    };
    c.bench_function("predict_one", |b| b.iter(|| pipeline.predict(black_box(&query)).unwrap()));
}

criterion_group!(benches, bench_forest_fit, bench_pipeline);
criterion_main!(benches);
