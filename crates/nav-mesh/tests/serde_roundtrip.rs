#![cfg(feature = "serde")]

use nav_core::{Vec2, Vec3};
use nav_mesh::{GroupId, NavMesh, NavMeshConfig, Navigator, WalkableGeometry};

#[test]
fn nav_mesh_roundtrips_via_serde() {
    let config = NavMeshConfig {
        vertical_tolerance: 0.25,
        group_search_radius: 20.0,
    };
    let mesh = NavMesh::from_geometry(
        &WalkableGeometry::plane(Vec2::new(0.0, 0.0), Vec2::new(8.0, 8.0), 0.0, 4),
        config,
    )
    .expect("valid geometry");

    let json = serde_json::to_string(&mesh).expect("serialize navmesh");
    let mesh2: NavMesh = serde_json::from_str(&json).expect("deserialize navmesh");

    assert_eq!(mesh.source(), mesh2.source());
    assert_eq!(mesh2.config(), config);

    let start = Vec3::new(0.5, 0.0, 0.5);
    let goal = Vec3::new(7.5, 0.0, 6.0);
    let c1 = mesh.find_corridor(start, goal, GroupId(0)).expect("corridor");
    let c2 = mesh2.find_corridor(start, goal, GroupId(0)).expect("corridor");
    assert_eq!(c1, c2);
}

#[test]
fn nav_mesh_deserialize_rejects_degenerate_geometry() {
    let json = r#"{"geometry":{"vertices":[],"indices":[]}}"#;
    let err = serde_json::from_str::<NavMesh>(json).unwrap_err();
    assert!(err.to_string().contains("no vertices"), "{err}");
}
