//! # Frame Decode Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use pixy::{encode::FrameBuilder, Block, PixyCam, PixyConfig, SimPixy};

fn decode_benchmark(c: &mut Criterion) {
    // ---- Build a busy scene ----

    // 30 objects per frame, every other frame made of colour codes
    let normal: Vec<Block> = (0..30)
        .map(|i| Block::new(1 + i % 7, 10 * i, 5 * i, 12, 8))
        .collect();
    let codes: Vec<Block> = normal
        .iter()
        .zip(0..)
        .map(|(block, i)| block.with_angle(i * 11))
        .collect();

    let stream = (0..10)
        .fold(FrameBuilder::new(), |b, i| {
            b.frame(if i % 2 == 0 { &normal[..] } else { &codes[..] })
        })
        .into_bytes();

    let mut cam = PixyCam::new(SimPixy::new(stream), PixyConfig::default());

    // Bench a full poll through the transport
    c.bench_function("PixyCam::poll", |b| {
        b.iter(|| cam.poll(pixy::decoder::MAX_BLOCKS).unwrap())
    });
}

criterion_group!(benches, decode_benchmark);
criterion_main!(benches);
