use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dms::{DmsConfig, FrameClassifier, GeometryExtractor, LandmarkSet, Point, Timestamp, LANDMARK_COUNT};

fn synthetic_face() -> LandmarkSet {
    let points = (0..LANDMARK_COUNT)
        .map(|i| {
            let angle = i as f64 * 0.37;
            Point::new(320.0 + 80.0 * angle.cos(), 240.0 + 60.0 * angle.sin())
        })
        .collect();
    LandmarkSet::new(points).expect("68 finite points")
}

fn bench_extract(c: &mut Criterion) {
    let extractor = GeometryExtractor::default();
    let face = synthetic_face();

    c.bench_function("geometry_extract", |b| {
        b.iter(|| extractor.extract(black_box(&face)))
    });
}

fn bench_classify(c: &mut Criterion) {
    let mut classifier = FrameClassifier::new(DmsConfig::default()).expect("default config");
    let faces = [synthetic_face()];
    let mut frame = 0u64;

    c.bench_function("classify_frame", |b| {
        b.iter(|| {
            frame += 1;
            classifier
                .classify(black_box(&faces), Timestamp::from_millis(frame * 66))
                .expect("in-order frame")
        })
    });
}

criterion_group!(benches, bench_extract, bench_classify);
criterion_main!(benches);
