//! Benchmarks for schema inference and generation
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use dataset_schema_core::inference::{SampleConfig, SchemaInferrer, detect_format, looks_temporal};
use dataset_schema_core::pipeline::SchemaGenerator;

/// Generate sample events with a type drift every seventh record
fn generate_sample_events(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("550e8400-e29b-41d4-a716-{:012}", i),
                "email": format!("user{}@example.com", i),
                "age": if i % 7 == 0 {
                    json!(format!("{}", 20 + i % 60))
                } else {
                    json!(20 + i % 60)
                },
                "balance": 1000.0 + i as f64 * 10.5,
                "is_active": i % 2 == 0,
                "created_at": "2024-01-15T10:30:00Z",
                "ip_address": format!("192.168.{}.{}", i % 256, (i * 3) % 256),
                "device": {"os": if i % 3 == 0 { "linux" } else { "android" }, "build": i},
                "tags": ["a", "b"]
            })
        })
        .collect()
}

fn bench_format_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_detection");

    let test_cases = vec![
        ("email", "user@example.com"),
        ("uuid", "550e8400-e29b-41d4-a716-446655440000"),
        ("uri", "https://example.com/path"),
        ("ipv4", "192.168.1.1"),
        ("date", "2024-01-15"),
        ("datetime", "2024-01-15T10:30:00Z"),
        ("plain_string", "hello world"),
    ];

    for (name, value) in test_cases {
        group.bench_with_input(BenchmarkId::new("detect", name), &value, |b, value| {
            b.iter(|| black_box(detect_format(value)));
        });
    }

    group.bench_function("looks_temporal/slashed", |b| {
        b.iter(|| black_box(looks_temporal("15/01/2024 10:30")))
    });

    group.finish();
}

fn bench_schema_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_inference");

    for count in [10, 100, 500].iter() {
        let events = generate_sample_events(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::new("infer_samples", count), &events, |b, events| {
            let inferrer = SchemaInferrer::new();
            b.iter(|| black_box(inferrer.infer_samples(events)));
        });
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    let generator = SchemaGenerator::default();
    let config = SampleConfig::new("bench");

    for count in [10, 100, 500].iter() {
        let events = generate_sample_events(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::new("generate", count), &events, |b, events| {
            b.iter(|| black_box(generator.generate(events, &config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_format_detection, bench_schema_inference, bench_generation);
criterion_main!(benches);
