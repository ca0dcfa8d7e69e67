use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use minegrid_core::{GridConfig, MineGrid, MinefieldGenerator, RandomMinefieldGenerator};

fn generation(c: &mut Criterion) {
    let config = GridConfig::new((200, 120), 4800).unwrap();

    c.bench_function("generate_200x120_4800", |b| {
        b.iter(|| RandomMinefieldGenerator::new(black_box(42)).generate(config))
    });
}

fn flood_reveal(c: &mut Criterion) {
    let config = GridConfig::new((200, 120), 0).unwrap();
    let minefield = RandomMinefieldGenerator::new(1).generate(config);

    c.bench_function("flood_200x120_empty", |b| {
        b.iter(|| {
            let mut grid = MineGrid::new(black_box(minefield.clone()));
            grid.reveal((0, 0)).unwrap()
        })
    });
}

criterion_group!(benches, generation, flood_reveal);
criterion_main!(benches);
