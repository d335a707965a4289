use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use deepfork::board::{Board, Evaluate, MaterialEval, SearchConfig, SearchLimits};
use deepfork::search_control::start_search_with;
use deepfork::TranspositionTable;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLEGAME: &str = "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");
    let mut start = Board::new();
    group.bench_function("startpos", |b| {
        b.iter(|| black_box(start.generate_moves().len()))
    });
    let mut kiwipete: Board = KIWIPETE.parse().unwrap();
    group.bench_function("kiwipete", |b| {
        b.iter(|| black_box(kiwipete.generate_moves().len()))
    });
    group.finish();
}

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(20);
    let mut start = Board::new();
    group.bench_function("startpos_depth4", |b| b.iter(|| black_box(start.perft(4))));
    let mut kiwipete: Board = KIWIPETE.parse().unwrap();
    group.bench_function("kiwipete_depth3", |b| {
        b.iter(|| black_box(kiwipete.perft(3)))
    });
    group.finish();
}

fn bench_make_unmake(c: &mut Criterion) {
    let mut board: Board = KIWIPETE.parse().unwrap();
    let moves = board.generate_moves();
    c.bench_function("make_unmake/kiwipete_all_moves", |b| {
        b.iter(|| {
            for &mv in moves.iter() {
                let info = board.make_move(mv);
                board.unmake_move(mv, info);
            }
            black_box(board.hash())
        })
    });
}

fn bench_eval(c: &mut Criterion) {
    let board: Board = MIDDLEGAME.parse().unwrap();
    let eval = MaterialEval;
    c.bench_function("eval/middlegame", |b| {
        b.iter(|| black_box(eval.evaluate(&board)))
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    group.bench_function("middlegame_depth5", |b| {
        b.iter(|| {
            let mut board: Board = MIDDLEGAME.parse().unwrap();
            let config = SearchConfig::default()
                .with_eval(Arc::new(MaterialEval))
                .with_tt(Arc::new(TranspositionTable::new(16)));
            black_box(start_search_with(&mut board, &SearchLimits::depth(5), &config))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_movegen,
    bench_perft,
    bench_make_unmake,
    bench_eval,
    bench_search
);
criterion_main!(benches);
