use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pano_core::{FeatureConfig, Image};
use pano_fast::{CornerDetector, FastDetector, ImagePyramid, KeypointRefinement};

/// Create benchmark image with realistic corner patterns
fn create_benchmark_image(width: usize, height: usize, complexity: &str) -> Image {
    Image::from_fn_gray(width, height, |x, y| match complexity {
        "checker" => {
            if (x / 8 + y / 8) % 2 == 0 { 200 } else { 50 }
        }
        "blocks" => {
            let mut h = (x as u32 / 5).wrapping_mul(73_856_093) ^ (y as u32 / 5).wrapping_mul(19_349_663);
            h ^= h >> 13;
            h = h.wrapping_mul(0x5bd1_e995);
            h ^= h >> 15;
            (h & 0xFF) as u8
        }
        _ => {
            // Gradient with a little structured noise
            let gradient = ((x as f32 / width as f32) * 50.0) as u8;
            let noise = ((x + y) % 7) as u8;
            100 + gradient + noise
        }
    })
    .unwrap()
}

/// Benchmark full detection pipeline
fn bench_full_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_detection");
    let detector = FastDetector::new(FeatureConfig::default()).unwrap();

    for &(width, height) in &[(128, 128), (320, 240), (640, 480)] {
        for complexity in ["checker", "blocks", "gradient"] {
            let img = create_benchmark_image(width, height, complexity);
            group.bench_with_input(
                BenchmarkId::new(format!("{}x{}", width, height), complexity),
                &img,
                |b, img| b.iter(|| black_box(detector.detect(black_box(img)).unwrap())),
            );
        }
    }

    group.finish();
}

/// Benchmark individual pipeline stages on the base level
fn bench_pipeline_stages(c: &mut Criterion) {
    let img = create_benchmark_image(256, 256, "blocks");
    let levels = ImagePyramid::generate_scale_levels(256, 256, 8, 1.2, 33);
    let mut group = c.benchmark_group("pipeline_stages");

    group.bench_function("build_pyramid", |b| {
        b.iter(|| black_box(ImagePyramid::build(black_box(&img), &levels)))
    });

    let pyramid = ImagePyramid::build(&img, &levels);
    let Some(base) = pyramid.level(0) else {
        return;
    };

    group.bench_function("detect_corners", |b| {
        b.iter(|| black_box(CornerDetector::detect_corners(black_box(base), 20, 16)))
    });

    let corners = CornerDetector::detect_corners(base, 20, 16);
    group.bench_function("non_maximum_suppression", |b| {
        b.iter(|| black_box(KeypointRefinement::non_maximum_suppression(black_box(&corners), 256, 256)))
    });

    if let Some(corner) = corners.first() {
        group.bench_function("subpixel_refinement", |b| {
            b.iter(|| black_box(KeypointRefinement::refine_subpixel(base, black_box(corner.x), black_box(corner.y))))
        });
        group.bench_function("orientation", |b| {
            b.iter(|| black_box(KeypointRefinement::compute_orientation(base, black_box(corner.x), black_box(corner.y), 15)))
        });
    }

    group.finish();
}

/// Benchmark Harris corner response computation
fn bench_harris_response(c: &mut Criterion) {
    let img = create_benchmark_image(256, 256, "gradient");
    let levels = ImagePyramid::generate_scale_levels(256, 256, 1, 1.2, 33);
    let pyramid = ImagePyramid::build(&img, &levels);
    let Some(base) = pyramid.level(0) else {
        return;
    };

    let mut group = c.benchmark_group("harris_response");
    group.bench_function("single_point", |b| {
        b.iter(|| black_box(CornerDetector::compute_harris_response(base, black_box(128), black_box(128))))
    });

    let points: Vec<(usize, usize)> = (0..100).map(|i| (50 + (i % 10) * 15, 50 + (i / 10) * 15)).collect();
    group.bench_function("100_points", |b| {
        b.iter(|| {
            for &(x, y) in black_box(&points) {
                black_box(CornerDetector::compute_harris_response(base, x, y));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_full_detection, bench_pipeline_stages, bench_harris_response);
criterion_main!(benches);
