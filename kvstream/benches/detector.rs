//! Fragment detection and frame extraction benchmarks

#[path = "../tests/common/mod.rs"]
mod common;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kvstream::{ConsumerConfig, FragmentDetector, FragmentProcessor, FrameSelection, SampleRatio};

fn bench_fragment_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragment_detection");
    let (data, parts) = common::stream(32, true);
    let config = ConsumerConfig::new("bench");

    for chunk in &[64usize, 4096, 65536] {
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(format!("{}B", chunk)), chunk, |b, &chunk| {
            b.iter(|| {
                let mut detector = FragmentDetector::new(&config);
                let mut count = 0;
                for piece in data.chunks(chunk) {
                    detector.feed(piece);
                    while let Ok(Some(fragment)) = detector.poll_fragment() {
                        count += 1;
                        black_box(fragment);
                    }
                }
                while let Ok(Some(fragment)) = detector.finish() {
                    count += 1;
                    black_box(fragment);
                }
                assert_eq!(count, parts.len());
            });
        });
    }

    group.finish();
}

fn bench_frame_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_extraction");
    let bytes = common::fragment_bytes(&common::FragmentSpec::new(1).frames(512));
    let fragment = kvstream::Fragment::parse(bytes).expect("fixture parses");
    let processor = FragmentProcessor::new();

    let selections = [
        ("all", FrameSelection::all()),
        ("video", FrameSelection::all().with_tracks([1])),
        (
            "one_in_10",
            FrameSelection::all().with_sample_ratio(SampleRatio::one_in(10).expect("valid ratio")),
        ),
    ];

    for (name, selection) in &selections {
        group.throughput(Throughput::Elements(512));
        group.bench_with_input(BenchmarkId::from_parameter(name), selection, |b, selection| {
            b.iter(|| {
                let frames = processor.frames(&fragment, selection).expect("segment present");
                black_box(frames.count())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fragment_detection, bench_frame_extraction);
criterion_main!(benches);
