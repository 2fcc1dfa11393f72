use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_ai::test_positions::{EARLY_2, KIWIPETE, START_FEN};
use chess_ai::{perft, AIConfig, Board, Evaluator, MinimaxAI};

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(10);
    for (name, fen, depth) in [("start", START_FEN, 3), ("kiwipete", KIWIPETE, 2)] {
        let board = Board::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::new(name, depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut board = board.clone();
                black_box(perft(&mut board, depth))
            })
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for fen in [EARLY_2, KIWIPETE] {
        let board = Board::from_fen(fen).unwrap();
        let config = AIConfig {
            depth: 2,
            seed: Some(7),
            ..Default::default()
        };
        group.bench_function(BenchmarkId::new("minimax_d2", &fen[..8]), |b| {
            b.iter(|| {
                let mut ai = MinimaxAI::new(&config);
                black_box(ai.best_move(&board, board.side_to_move()))
            })
        });
    }
    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let evaluator = Evaluator::new();
    let board = Board::from_fen(KIWIPETE).unwrap();
    c.bench_function("evaluate_kiwipete", |b| {
        b.iter(|| black_box(evaluator.evaluate(black_box(&board))))
    });
}

criterion_group!(benches, bench_perft, bench_search, bench_eval);
criterion_main!(benches);
