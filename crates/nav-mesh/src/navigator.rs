use nav_core::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Connectivity component of a zone. Corridors never cross group boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupId(pub u32);

/// Backend-defined region identifier (poly/triangle).
///
/// This value is intended to be stable across replays and serialization of baked data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavRegionId(pub u32);

/// Waypoint sequence produced by a path search.
///
/// `points` runs from the first waypoint after the start up to and including the target. The
/// start itself is never part of the corridor since the agent is already there.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Corridor {
    pub points: Vec<Vec3>,
    /// Regions crossed, in order. Empty for backends that don't expose them.
    pub regions: Vec<NavRegionId>,
    pub group: GroupId,
}

impl Corridor {
    pub fn new(points: Vec<Vec3>, group: GroupId) -> Self {
        Self {
            points,
            regions: Vec::new(),
            group,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn target(&self) -> Option<Vec3> {
        self.points.last().copied()
    }

    /// Sum of segment lengths starting from `start`.
    pub fn length_from(&self, start: Vec3) -> f32 {
        let mut prev = start;
        let mut total = 0.0;
        for &p in &self.points {
            total += prev.distance(p);
            prev = p;
        }
        total
    }
}

/// Summary numbers for a registered zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneStats {
    pub triangles: usize,
    pub groups: usize,
}

/// Navigation-query backend for a single zone.
///
/// This is the whole surface the path query layer relies on: group resolution, snapping and
/// corridor search. `NavMesh` is the in-tree implementation; other backends can be registered
/// through `ZoneRegistry::register_navigator`.
pub trait Navigator {
    /// Connectivity component `position` belongs to, or `None` when it is outside all of them.
    fn resolve_group(&self, position: Vec3) -> Option<GroupId>;

    /// Closest point on the walkable surface of `group`.
    fn nearest_point(&self, position: Vec3, group: GroupId) -> Option<Vec3>;

    /// Corridor from `from` to `to` inside `group`. `None` means no path exists.
    fn find_corridor(&self, from: Vec3, to: Vec3, group: GroupId) -> Option<Corridor>;

    /// Backends that can't describe themselves may return `None`.
    fn stats(&self) -> Option<ZoneStats> {
        None
    }
}
