use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nav_core::{Vec2, Vec3};
use nav_mesh::{Corridor, GroupId, NavMesh, NavMeshConfig, NavMeshQuery, Navigator, WalkableGeometry};

fn bench_corridor(c: &mut Criterion) {
    let geometry = WalkableGeometry::plane(Vec2::new(0.0, 0.0), Vec2::new(64.0, 64.0), 0.0, 64);
    let mesh = NavMesh::from_geometry(&geometry, NavMeshConfig::default()).expect("mesh");
    let start = Vec3::new(0.1, 0.0, 0.1);
    let goal = Vec3::new(63.9, 0.0, 40.3);
    let group = GroupId(0);

    let mut group_bench = c.benchmark_group("nav-mesh/corridor");

    group_bench.bench_function("find_corridor_alloc", |b| {
        b.iter(|| {
            let corridor = mesh.find_corridor(start, goal, group).expect("corridor");
            black_box(corridor.points.len());
        })
    });

    let mut query = NavMeshQuery::default();
    let mut out = Corridor::new(Vec::new(), group);
    group_bench.bench_function("find_corridor_into_reuse", |b| {
        b.iter(|| {
            mesh.find_corridor_into(start, goal, group, &mut query, &mut out)
                .expect("corridor");
            black_box(out.points.len());
        })
    });

    group_bench.bench_function("resolve_and_snap", |b| {
        b.iter(|| {
            let g = mesh.resolve_group(black_box(start)).expect("group");
            black_box(mesh.nearest_point(start, g));
        })
    });

    group_bench.finish();
}

criterion_group!(benches, bench_corridor);
criterion_main!(benches);
