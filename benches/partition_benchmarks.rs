use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use image_line_split::{
    classifier::RegionClassifier,
    config::{OutputFormat, PartitionConfig},
    line::Line,
    processor::PartitionProcessor,
    services::OutputFormatHandler,
    types::{Point, Region},
};

fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255])
    }))
}

fn benchmark_classification(c: &mut Criterion) {
    let (width, height) = (1920, 1080);
    let lines = [
        ("vertical", Point::new(960.0, 0.0), Point::new(960.0, 1080.0)),
        ("horizontal", Point::new(0.0, 540.0), Point::new(1920.0, 540.0)),
        ("diagonal", Point::new(0.0, 0.0), Point::new(1920.0, 1080.0)),
    ];

    let mut group = c.benchmark_group("classification_1080p");
    for (name, p1, p2) in lines {
        let line = Line::through(p1, p2).unwrap();
        for (label, classifier) in [
            ("parallel", RegionClassifier::new(true, true)),
            ("sequential", RegionClassifier::new(false, true)),
            ("no_fast_path", RegionClassifier::new(true, false)),
        ] {
            group.bench_with_input(BenchmarkId::new(label, name), &line, |b, line| {
                b.iter(|| classifier.classify(black_box(line), width, height).unwrap());
            });
        }
    }
    group.finish();
}

fn benchmark_full_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    group.sample_size(20);

    for (width, height) in [(640, 480), (1920, 1080), (3840, 2160)] {
        let image = test_image(width, height);
        let p1 = Point::new(0.0, f64::from(height) * 0.3);
        let p2 = Point::new(f64::from(width), f64::from(height) * 0.8);

        for parallel in [true, false] {
            let processor = PartitionProcessor::new(
                PartitionConfig::builder().parallel(parallel).build().unwrap(),
            )
            .unwrap();
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(
                BenchmarkId::new(label, format!("{width}x{height}")),
                &image,
                |b, image| {
                    b.iter(|| processor.process_image(black_box(image), p1, p2).unwrap());
                },
            );
        }
    }
    group.finish();
}

fn benchmark_encoding(c: &mut Criterion) {
    let image = test_image(1280, 720);
    let result = PartitionProcessor::new(PartitionConfig::default())
        .unwrap()
        .process_image(&image, Point::new(0.0, 0.0), Point::new(1280.0, 720.0))
        .unwrap();

    let mut group = c.benchmark_group("encoding_720p");
    group.sample_size(10);
    for format in [OutputFormat::Png, OutputFormat::Tiff, OutputFormat::Rgba8] {
        group.bench_function(OutputFormatHandler::get_extension(format), |b| {
            b.iter(|| result.to_bytes(Region::First, black_box(format)).unwrap());
        });
    }
    group.bench_function("base64_png", |b| {
        b.iter(|| result.to_base64(black_box(Region::Second)).unwrap());
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_classification,
    benchmark_full_partition,
    benchmark_encoding
);
criterion_main!(benches);
