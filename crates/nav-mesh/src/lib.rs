//! Zone registry and the reference navmesh backend (groups, snapping, corridor search).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod geometry;
pub mod mesh;
pub mod navigator;
pub mod zone;

pub use geometry::WalkableGeometry;
pub use mesh::{NavMesh, NavMeshConfig, NavMeshQuery};
pub use navigator::{Corridor, GroupId, NavRegionId, Navigator, ZoneStats};
pub use zone::ZoneRegistry;
