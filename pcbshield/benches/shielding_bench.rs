use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pcbshield::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn bench_generate_hash_pattern(c: &mut Criterion) {
    let request = HashPatternRequest::new(
        Rectangle::new(0.0, 0.0, 200_000_000.0, 150_000_000.0),
        200_000.0,
        1_000_000.0,
        45.0,
        49,
    )
    .with_offsets(Offsets::uniform(1_000_000.0));

    c.bench_function("generate_hash_pattern", |b| {
        let mut board = MemoryBoard::new();
        b.iter(|| generate_hash_pattern(&mut board, black_box(&request)));
    });
}

fn bench_net_report(c: &mut Criterion) {
    let board = pcbshield::load_board(&fixture_path("shield_board.kicad_pcb")).unwrap();
    let options = NetReportOptions::default();

    c.bench_function("compute_net_report", |b| {
        b.iter(|| compute_net_report(black_box(&board), black_box(&options)));
    });
}

fn bench_parse_pcb(c: &mut Criterion) {
    c.bench_function("parse_pcb", |b| {
        b.iter(|| pcbshield::load_board(black_box(&fixture_path("shield_board.kicad_pcb"))));
    });
}

criterion_group!(benches, bench_generate_hash_pattern, bench_net_report, bench_parse_pcb);
criterion_main!(benches);
