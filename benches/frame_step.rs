//! Benchmarks for the per-frame path: integration and compositing.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use particle_text::physics;
use particle_text::prelude::*;
use particle_text::Session;
use rand::Rng;

fn settings(message: &str, glow: bool) -> Settings {
    Config {
        message: message.into(),
        width: 640.0,
        height: 240.0,
        font_size: 80.0,
        density: 4.0,
        glow,
        ..Default::default()
    }
    .resolve()
}

fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");
    let s = settings("", true);
    let mut rng = rand::thread_rng();

    for count in [1_000usize, 10_000, 50_000] {
        let origins: Vec<Vec2> = (0..count)
            .map(|_| Vec2::new(rng.gen_range(0.0..640.0), rng.gen_range(0.0..240.0)))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &origins, |b, origins| {
            let mut store = ParticleStore::from_origins(origins);
            let mut session = Session::new(s.center());
            b.iter(|| physics::integrate(black_box(&mut store), &mut session, &s))
        });
    }

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    group.sample_size(20);

    for glow in [false, true] {
        let label = if glow { "glow" } else { "plain" };
        group.bench_function(label, |b| {
            let start = Instant::now();
            let config = Config {
                message: "PARTICLES".into(),
                width: 640.0,
                height: 240.0,
                font_size: 80.0,
                glow,
                ..Default::default()
            };
            let mut engine: Engine = Engine::new();
            engine
                .init(Init::new(Surface::new(640, 240), config), start)
                .expect("init");
            engine.handle(Message::MouseEnter, start);
            engine.handle(Message::MouseMove { x: 320.0, y: 120.0 }, start);

            b.iter(|| black_box(engine.tick(start)))
        });
    }

    group.finish();
}

fn bench_mapping(c: &mut Criterion) {
    let s = settings("PARTICLES", false);
    c.bench_function("map_particles", |b| {
        let mut buffer = Surface::new(s.width, s.height);
        b.iter(|| black_box(particle_text::mapper::map_particles(&mut buffer, &s)))
    });
}

criterion_group!(benches, bench_integrate, bench_frame, bench_mapping);
criterion_main!(benches);
