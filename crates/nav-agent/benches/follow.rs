use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nav_agent::{
    DirectorConfig, FollowerConfig, FrameDriver, NullVisualizer, PathDirector, PathFollower,
    SimulationContext,
};
use nav_core::{AgentId, Vec2, Vec3};
use nav_mesh::{WalkableGeometry, ZoneRegistry};

fn bench_follow(c: &mut Criterion) {
    let waypoints: Vec<Vec3> = (0..64)
        .map(|i| Vec3::new(i as f32, 0.0, if i % 2 == 0 { 0.0 } else { 1.0 }))
        .collect();

    let mut group = c.benchmark_group("nav-agent/follow");

    group.bench_function("advance_full_corridor", |b| {
        let mut follower = PathFollower::new(FollowerConfig::default());
        b.iter(|| {
            follower.set_waypoints(waypoints.iter().copied());
            let mut position = Vec3::ZERO;
            while !follower.is_empty() {
                black_box(follower.advance(&mut position, 1.0 / 60.0, 8.0));
            }
            black_box(position);
        })
    });

    group.bench_function("frame_with_watched_pairs", |b| {
        let mut ctx = SimulationContext::new(ZoneRegistry::default(), "bench", FollowerConfig::default());
        ctx.register_active_zone(&WalkableGeometry::plane(
            Vec2::new(0.0, 0.0),
            Vec2::new(32.0, 32.0),
            0.0,
            32,
        ))
        .expect("valid geometry");
        for i in 0..8u64 {
            let p = Vec3::new(2.0 + 3.5 * i as f32, 0.0, 1.0 + 3.0 * i as f32);
            ctx.spawn(AgentId(i), p, 4.0);
        }
        let mut driver = FrameDriver::new(PathDirector::new(DirectorConfig {
            replan_interval: 0.0,
            ..DirectorConfig::default()
        }));
        for i in 0..4u64 {
            driver.director_mut().watch_pair(AgentId(i), AgentId(7 - i));
        }
        let mut viz = NullVisualizer;
        b.iter(|| {
            driver.director_mut().invalidate();
            black_box(driver.tick(&mut ctx, 1.0 / 60.0, &mut viz));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_follow);
criterion_main!(benches);
