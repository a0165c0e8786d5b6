use nav_core::{Vec2, Vec3};
use nav_mesh::{GroupId, NavMesh, NavMeshConfig, NavMeshQuery, Navigator, WalkableGeometry};

fn soup(tris: &[[(f32, f32); 3]], height: f32) -> WalkableGeometry {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for tri in tris {
        let base = vertices.len() as u32;
        vertices.extend(tri.iter().map(|&(x, z)| Vec3::new(x, height, z)));
        indices.push([base, base + 1, base + 2]);
    }
    WalkableGeometry::new(vertices, indices)
}

/// Unit squares with their lower corner at each `(x, z)`.
fn squares(cells: &[(f32, f32)]) -> WalkableGeometry {
    let tris: Vec<[(f32, f32); 3]> = cells
        .iter()
        .flat_map(|&(x, z)| {
            [
                [(x, z), (x + 1.0, z), (x + 1.0, z + 1.0)],
                [(x, z), (x + 1.0, z + 1.0), (x, z + 1.0)],
            ]
        })
        .collect();
    soup(&tris, 0.0)
}

fn assert_legs_stay_on_mesh(mesh: &NavMesh, start: Vec3, points: &[Vec3]) {
    let mut prev = start;
    for &p in points {
        for step in 0..=20 {
            let t = step as f32 / 20.0;
            let sample = prev + (p - prev) * t;
            assert!(
                mesh.find_triangle(sample).is_some(),
                "leg leaves the mesh at {sample:?}"
            );
        }
        prev = p;
    }
}

fn l_shape_mesh() -> NavMesh {
    let geometry = soup(
        &[
            // Lower-left quad split.
            [(0.0, 0.0), (4.0, 0.0), (3.0, 1.0)],
            [(0.0, 0.0), (3.0, 1.0), (0.0, 1.0)],
            // Upper-right quad split.
            [(4.0, 0.0), (4.0, 4.0), (3.0, 4.0)],
            [(4.0, 0.0), (3.0, 4.0), (3.0, 1.0)],
        ],
        0.0,
    );
    NavMesh::from_geometry(&geometry, NavMeshConfig::default()).expect("valid geometry")
}

fn two_islands() -> NavMesh {
    let mut geometry = WalkableGeometry::plane(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), 0.0, 2);
    geometry.merge(&WalkableGeometry::plane(
        Vec2::new(10.0, 0.0),
        Vec2::new(14.0, 4.0),
        0.0,
        2,
    ));
    NavMesh::from_geometry(&geometry, NavMeshConfig::default()).expect("valid geometry")
}

#[test]
fn nav_mesh_corridor_turns_the_corner_of_an_l() {
    let mesh = l_shape_mesh();
    assert_eq!(mesh.triangle_count(), 4);
    assert_eq!(mesh.group_count(), 1);

    let start = Vec3::new(0.2, 0.0, 0.2);
    let goal = Vec3::new(3.8, 0.0, 3.8);
    let group = mesh.resolve_group(start).expect("start is on the mesh");

    let corridor = mesh.find_corridor(start, goal, group).expect("expected corridor");
    assert_eq!(corridor.points, vec![Vec3::new(3.0, 0.0, 1.0), goal]);
    assert_eq!(corridor.regions.len(), 4);
    assert_eq!(corridor.group, group);

    assert_legs_stay_on_mesh(&mesh, start, &corridor.points);
}

#[test]
fn nav_mesh_corridor_excludes_start_and_ends_at_target() {
    let mesh = NavMesh::from_geometry(
        &WalkableGeometry::plane(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0), 1.5, 8),
        NavMeshConfig::default(),
    )
    .expect("valid geometry");

    let start = Vec3::new(0.0, 1.5, 8.0);
    let goal = Vec3::new(5.0, 1.5, 0.0);
    let group = mesh.resolve_group(start).expect("group");
    let corridor = mesh.find_corridor(start, goal, group).expect("corridor");

    assert!(!corridor.points.contains(&start));
    assert_eq!(corridor.target(), Some(goal));
    assert!(corridor.length_from(start) >= start.distance(goal) - 1e-4);
}

#[test]
fn nav_mesh_convex_plane_corridors_are_straight_lines() {
    let mesh = NavMesh::from_geometry(
        &WalkableGeometry::plane(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0), 1.5, 8),
        NavMeshConfig::default(),
    )
    .expect("valid geometry");

    // Endpoints on grid lines and grid vertices sit on several triangles at once.
    for (start, goal) in [
        (Vec3::new(0.0, 1.5, 8.0), Vec3::new(5.0, 1.5, 0.0)),
        (Vec3::new(-5.0, 1.5, -5.0), Vec3::new(5.0, 1.5, 5.0)),
        (Vec3::new(-5.0, 1.5, -5.0), Vec3::new(-5.0, 1.5, 5.0)),
        (Vec3::new(2.5, 1.5, -10.0), Vec3::new(2.5, 1.5, 10.0)),
        (Vec3::new(-10.0, 1.5, -10.0), Vec3::new(10.0, 1.5, 7.5)),
        (Vec3::new(-7.3, 1.5, 4.1), Vec3::new(8.9, 1.5, -6.2)),
    ] {
        let corridor = mesh
            .find_corridor(start, goal, GroupId(0))
            .expect("corridor");
        assert_eq!(corridor.points, vec![goal], "{start:?} -> {goal:?}");
        assert!((corridor.length_from(start) - start.distance(goal)).abs() < 1e-4);
    }
}

#[test]
fn nav_mesh_ring_corridors_hug_the_hole() {
    // 9x9 unit squares around a 5x5 hole spanning (2, 2)..(7, 7).
    let cells: Vec<(f32, f32)> = (0..9)
        .flat_map(|x| (0..9).map(move |z| (x as f32, z as f32)))
        .filter(|&(x, z)| !((2.0..7.0).contains(&x) && (2.0..7.0).contains(&z)))
        .collect();
    let mesh = NavMesh::from_geometry(&squares(&cells), NavMeshConfig::default())
        .expect("valid geometry");
    assert_eq!(mesh.group_count(), 1);

    // Along one band: nothing in the way.
    let start = Vec3::new(7.5, 0.0, 7.5);
    let goal = Vec3::new(0.5, 0.0, 7.5);
    let corridor = mesh.find_corridor(start, goal, GroupId(0)).expect("corridor");
    assert_eq!(corridor.points, vec![goal]);

    // Across the hole: one turn at its corner.
    let start = Vec3::new(0.5, 0.0, 0.5);
    let goal = Vec3::new(8.5, 0.0, 8.5);
    let corridor = mesh.find_corridor(start, goal, GroupId(0)).expect("corridor");
    assert_eq!(corridor.len(), 2, "{corridor:?}");
    let corner = corridor.points[0];
    assert!(
        corner == Vec3::new(7.0, 0.0, 2.0) || corner == Vec3::new(2.0, 0.0, 7.0),
        "{corner:?}"
    );
    assert_eq!(corridor.target(), Some(goal));
    assert_legs_stay_on_mesh(&mesh, start, &corridor.points);
}

#[test]
fn nav_mesh_same_triangle_corridor_is_just_the_target() {
    let mesh = l_shape_mesh();
    let start = Vec3::new(0.2, 0.0, 0.5);
    let goal = Vec3::new(0.5, 0.0, 0.8);
    let corridor = mesh.find_corridor(start, goal, GroupId(0)).expect("corridor");
    assert_eq!(corridor.points, vec![goal]);
    assert_eq!(corridor.regions.len(), 1);
}

#[test]
fn nav_mesh_partitions_disjoint_islands_into_groups() {
    let mesh = two_islands();
    assert_eq!(mesh.group_count(), 2);
    assert_eq!(
        mesh.groups().collect::<Vec<_>>(),
        vec![(GroupId(0), 8), (GroupId(1), 8)]
    );

    let a = mesh.resolve_group(Vec3::new(2.0, 0.0, 2.0)).expect("island a");
    let b = mesh.resolve_group(Vec3::new(12.0, 0.0, 2.0)).expect("island b");
    assert_ne!(a, b);

    assert!(mesh
        .find_corridor(Vec3::new(1.0, 0.0, 1.0), Vec3::new(12.0, 0.0, 2.0), a)
        .is_none());
    assert!(mesh
        .find_corridor(Vec3::new(1.0, 0.0, 1.0), Vec3::new(3.0, 0.0, 3.0), a)
        .is_some());
}

#[test]
fn nav_mesh_nearest_point_never_crosses_groups() {
    let mesh = two_islands();
    let groups = [GroupId(0), GroupId(1)];

    for ix in 0..15 {
        for iz in 0..8 {
            for y in [0.0, 0.3, 2.0] {
                let p = Vec3::new(-2.0 + 1.3 * ix as f32, y, -2.0 + 1.1 * iz as f32);
                for group in groups {
                    let q = mesh.nearest_point(p, group).expect("group exists");
                    assert_eq!(
                        mesh.resolve_group(q),
                        Some(group),
                        "{p:?} snapped to {q:?} outside {group:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn nav_mesh_nearest_point_projects_outside_points() {
    let mesh = l_shape_mesh();
    let p = Vec3::new(2.0, 0.0, 2.0); // outside (in the missing square)
    let q = mesh.nearest_point(p, GroupId(0)).expect("expected projection");
    let d = p.distance(q);
    assert!((d - 1.0).abs() < 1e-3, "unexpected distance: {d}");
    assert!(mesh.find_triangle(q).is_some());
}

#[test]
fn nav_mesh_resolve_group_fails_far_from_the_mesh() {
    let mesh = two_islands();
    assert_eq!(mesh.resolve_group(Vec3::new(100.0, 0.0, 0.0)), None);
    // Off-mesh but within the search radius falls back to the nearest centroid.
    assert_eq!(mesh.resolve_group(Vec3::new(-1.0, 0.0, 2.0)), Some(GroupId(0)));
}

#[test]
fn nav_mesh_target_outside_group_has_no_corridor() {
    let mesh = l_shape_mesh();
    let start = Vec3::new(0.2, 0.0, 0.2);
    assert!(mesh
        .find_corridor(start, Vec3::new(2.0, 0.0, 2.0), GroupId(0))
        .is_none());
    // Too far above the surface.
    assert!(mesh
        .find_corridor(start, Vec3::new(3.5, 5.0, 3.5), GroupId(0))
        .is_none());
}

#[test]
fn nav_mesh_prefers_vertically_closest_level() {
    let mut geometry = WalkableGeometry::plane(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), 0.0, 1);
    geometry.merge(&WalkableGeometry::plane(
        Vec2::new(1.0, 0.0),
        Vec2::new(3.0, 4.0),
        3.0,
        1,
    ));
    let mesh = NavMesh::from_geometry(&geometry, NavMeshConfig::default()).expect("valid");
    assert_eq!(mesh.group_count(), 2);

    let floor = mesh.resolve_group(Vec3::new(2.0, 0.1, 2.0)).expect("floor");
    let bridge = mesh.resolve_group(Vec3::new(2.0, 2.9, 2.0)).expect("bridge");
    assert_ne!(floor, bridge);

    let q = mesh
        .nearest_point(Vec3::new(2.0, 2.0, 2.0), bridge)
        .expect("bridge projection");
    assert!((q.y - 3.0).abs() < 1e-5);
}

#[test]
fn nav_mesh_queries_are_deterministic_and_reuse_scratch() {
    let mesh = NavMesh::from_geometry(
        &WalkableGeometry::plane(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0), 0.0, 10),
        NavMeshConfig::default(),
    )
    .expect("valid geometry");

    let start = Vec3::new(0.5, 0.0, 0.5);
    let goal = Vec3::new(9.5, 0.0, 3.2);
    let a = mesh.find_corridor(start, goal, GroupId(0)).expect("corridor");
    let b = mesh.find_corridor(start, goal, GroupId(0)).expect("corridor");
    assert_eq!(a, b);

    let mut query = NavMeshQuery::default();
    let c = mesh
        .find_corridor_in(start, goal, GroupId(0), &mut query)
        .expect("corridor");
    let d = mesh
        .find_corridor_in(start, goal, GroupId(0), &mut query)
        .expect("corridor");
    assert_eq!(a, c);
    assert_eq!(c, d);
}

#[test]
fn nav_mesh_corridor_from_a_mesh_vertex_does_not_repeat_the_start() {
    let mesh = NavMesh::from_geometry(
        &WalkableGeometry::plane(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0), 0.0, 8),
        NavMeshConfig::default(),
    )
    .expect("valid geometry");

    // (-5, -5) is a grid vertex shared by six triangles.
    let start = Vec3::new(-5.0, 0.0, -5.0);
    for goal in [
        Vec3::new(5.0, 0.0, 5.0),
        Vec3::new(6.0, 0.0, 5.0),
        Vec3::new(-5.0, 0.0, 5.0),
    ] {
        let corridor = mesh
            .find_corridor(start, goal, GroupId(0))
            .expect("corridor");
        assert!(!corridor.points.contains(&start), "{corridor:?}");
        assert_eq!(corridor.target(), Some(goal));
        for pair in corridor.points.windows(2) {
            assert_ne!(pair[0], pair[1], "repeated corner in {corridor:?}");
        }
    }
}
