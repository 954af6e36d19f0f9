use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessera_core::math::{Rect, Vec2};
use tessera_core::renderer::{
    CameraSnapshot, PassConfig, RenderCommand, RenderQueuePort, Space,
};
use tessera_render::coordinator::{build_batches, sort_commands};
use tessera_render::{LogBackend, RenderCoordinator, RenderQueue};

const MATERIALS: [&str; 4] = ["flat/red", "flat/green", "sprite/hero", "sprite/tiles"];
const LAYERS: [&str; 3] = ["bg", "actors", "fx"];

fn scene(count: usize) -> Vec<RenderCommand> {
    (0..count)
        .map(|i| {
            let x = (i % 200) as f32 * 0.5 - 50.0;
            let y = (i / 200) as f32 * 0.5 - 25.0;
            RenderCommand::rect("world", Space::World, x, y, 0.4, 0.4)
                .with_layer(LAYERS[i % LAYERS.len()])
                .with_material(MATERIALS[(i * 7) % MATERIALS.len()])
                .with_z((i % 5) as f32)
                .with_id(format!("e{i}"))
                .with_aabb(Rect::new(x, y, 0.4, 0.4))
        })
        .collect()
}

fn bench_coordinator(c: &mut Criterion) {
    let pass = PassConfig::new("world", Space::World).with_layers(LAYERS);
    let camera = CameraSnapshot {
        position: Vec2::ZERO,
        viewport: Vec2::new(1280.0, 720.0),
        ..CameraSnapshot::default()
    };
    let commands = scene(10_000);

    let mut group = c.benchmark_group("Render Coordinator");

    group.bench_function("Sort 10k commands", |b| {
        b.iter(|| {
            let mut batch = commands.clone();
            sort_commands(&pass, &mut batch);
            black_box(batch);
        });
    });

    group.bench_function("Sort + batch 10k commands", |b| {
        b.iter(|| {
            let mut sorted = commands.clone();
            sort_commands(&pass, &mut sorted);
            black_box(build_batches(sorted).len());
        });
    });

    group.bench_function("Full frame (cull, sort, batch, submit)", |b| {
        let queue = RenderQueue::new();
        let mut backend = LogBackend::new();
        let mut coordinator = RenderCoordinator::new(vec![pass.clone()]);
        b.iter(|| {
            queue.push_many(commands.clone());
            black_box(coordinator.render_frame(&queue, Some(camera), &mut backend));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_coordinator);
criterion_main!(benches);
