use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iris_classifier::dataset::load_iris;
use iris_classifier::export::ModelMetadata;
use iris_classifier::inference::{Predictor, Sample};
use iris_classifier::training::{FittedModel, LogisticRegression, TrainEngine, TrainingConfig};

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(20);

    let data = load_iris().unwrap();
    for c_value in [0.1, 1.0, 10.0].iter() {
        group.bench_with_input(BenchmarkId::new("fit", c_value), c_value, |b, &c_value| {
            b.iter(|| {
                let config = TrainingConfig::default().with_c(c_value);
                let mut engine = TrainEngine::new(config);
                engine.fit(black_box(&data)).unwrap();
            })
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train model once
    let data = load_iris().unwrap();
    let model = FittedModel::fit(&data.features, &data.targets, LogisticRegression::new()).unwrap();
    let predictor = Predictor::new(model, ModelMetadata::default()).unwrap();
    let sample = Sample::new(5.1, 3.5, 1.4, 0.2).unwrap();

    group.bench_function("predict_single", |b| {
        b.iter(|| predictor.predict(black_box(&sample)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
