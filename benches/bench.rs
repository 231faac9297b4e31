use criterion::{criterion_group, criterion_main, Criterion};
use nonogram_solver::nonogram::puzzle::Puzzle;
use nonogram_solver::nonogram::solver::{Backtracking, Propagated, Solver};
use std::hint::black_box;
use std::time::Duration;

const HEART: [&str; 10] = [
    ".##...##..",
    "####.####.",
    "##########",
    "##########",
    ".########.",
    ".########.",
    "..######..",
    "...####...",
    "....##....",
    "..........",
];

const SPIRAL: [&str; 8] = [
    "########",
    ".......#",
    "#####..#",
    "#...#..#",
    "#.#.#..#",
    "#.###..#",
    "#......#",
    "########",
];

fn puzzle_from(pattern: &[&str]) -> Puzzle {
    let width = pattern[0].len();
    let height = pattern.len();
    let cells: Vec<bool> = pattern
        .iter()
        .flat_map(|row| row.chars().map(|c| c == '#'))
        .collect();
    Puzzle::from_cells(width, height, &cells)
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("heart_10x10");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("bare", |b| {
        b.iter(|| {
            let mut puzzle = puzzle_from(&HEART);
            black_box(Backtracking::new().solve(&mut puzzle))
        });
    });
    group.bench_function("propagated", |b| {
        b.iter(|| {
            let mut puzzle = puzzle_from(&HEART);
            black_box(Propagated::new().solve(&mut puzzle))
        });
    });
    group.finish();

    let mut group = c.benchmark_group("spiral_8x8");
    group.bench_function("bare", |b| {
        b.iter(|| {
            let mut puzzle = puzzle_from(&SPIRAL);
            black_box(Backtracking::new().solve(&mut puzzle))
        });
    });
    group.bench_function("propagated", |b| {
        b.iter(|| {
            let mut puzzle = puzzle_from(&SPIRAL);
            black_box(Propagated::new().solve(&mut puzzle))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
