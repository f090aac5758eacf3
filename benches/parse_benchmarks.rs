//! Benchmarks for protocol decoding and message formatting.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chess_uci::uci::{tokenize, Command, InfoMessage};

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let go_line = "go wtime 300000 btime 300000 winc 2000 binc 2000 movestogo 40 depth 20";
    group.bench_function("go", |b| {
        b.iter(|| Command::decode(black_box(go_line)))
    });

    let moves: Vec<String> = (0..40).map(|_| "e2e4".to_string()).collect();
    let position_line = format!("position startpos moves {}", moves.join(" "));
    group.bench_function("position", |b| {
        b.iter(|| Command::decode(black_box(&position_line)))
    });

    let setoption_line = "setoption name Move Overhead value 50";
    group.bench_function("setoption", |b| {
        b.iter(|| Command::decode(black_box(setoption_line)))
    });

    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let line = "  go \t wtime 300000   btime 300000 winc 2000 binc 2000  ";
    c.bench_function("tokenize", |b| b.iter(|| tokenize(black_box(line))));
}

fn bench_format_info(c: &mut Criterion) {
    let info = InfoMessage {
        depth: 24,
        seldepth: 31,
        time: 12504,
        nodes: 10_252_188,
        score: "cp 35".into(),
        hashfull: 412,
        nps: 819_000,
        pv: (0..24).map(|_| "e2e4".to_string()).collect(),
        ..InfoMessage::default()
    };
    c.bench_function("format_info", |b| b.iter(|| black_box(&info).to_string()));
}

criterion_group!(benches, bench_decode, bench_tokenize, bench_format_info);
criterion_main!(benches);
