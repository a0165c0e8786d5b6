use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use nav_core::{GeometryError, Vec2, Vec3};

use crate::{Corridor, GroupId, NavRegionId, Navigator, WalkableGeometry, ZoneStats};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Triangles whose ground-plane footprint is smaller than this are not walkable.
const MIN_FOOTPRINT_AREA2: f32 = 1e-8;
/// Relative slack for point-in-triangle tests on shared edges.
const EDGE_EPSILON: f32 = 1e-5;
/// Horizontal slack when locating a point that sits a rounding error off its triangle.
const LOCATE_SLACK: f32 = 1e-3;
/// Surface heights closer than this count as the same level.
const HEIGHT_TIE: f32 = 1e-4;
/// Ground-plane distance under which an endpoint counts as lying on a portal.
const ON_PORTAL_EPSILON: f32 = 1e-4;
/// Parametric slack for a segment leaving a triangle through a vertex.
const WALK_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavMeshConfig {
    /// How far above or below a triangle's height span a point may be and still count as on it.
    pub vertical_tolerance: f32,
    /// Maximum distance to the nearest triangle centroid for group resolution of off-mesh points.
    pub group_search_radius: f32,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            vertical_tolerance: 0.5,
            group_search_radius: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    g: u32,
    tri: usize,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, usize, u64) {
        (self.f, self.g, self.tri, self.tie)
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable scratch buffers for `NavMesh` corridor queries.
///
/// This avoids per-query allocations when a corridor is refreshed every few frames.
#[derive(Debug, Default)]
pub struct NavMeshQuery {
    open: BinaryHeap<OpenNode>,
    g_score: Vec<u32>,
    came_from: Vec<Option<usize>>,
    poly_path: Vec<usize>,
    portals: Vec<(Vec3, Vec3)>,
    corners: Vec<Vec3>,
}

/// Triangulated walkable surface with adjacency and a partition into groups.
#[derive(Debug, Clone)]
pub struct NavMesh {
    config: NavMeshConfig,
    source: WalkableGeometry,
    vertices: Vec<Vec3>,
    tris: Vec<[usize; 3]>,
    neighbors: Vec<[Option<usize>; 3]>,
    centroids: Vec<Vec3>,
    height_spans: Vec<(f32, f32)>,
    tri_groups: Vec<GroupId>,
    groups: Vec<Vec<usize>>,
}

impl NavMesh {
    /// Build a navmesh from walkable geometry.
    ///
    /// Coincident vertices are welded, adjacency is inferred from shared edges, and triangles are
    /// flood-filled into groups. Triangles without a ground-plane footprint (walls, slivers,
    /// repeated indices) are dropped.
    pub fn from_geometry(
        geometry: &WalkableGeometry,
        config: NavMeshConfig,
    ) -> Result<Self, GeometryError> {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        struct VertexKey(u32, u32, u32);

        impl VertexKey {
            fn from_vec3(p: Vec3) -> Self {
                // `+ 0.0` folds -0.0 into 0.0 so both weld together.
                Self(
                    (p.x + 0.0).to_bits(),
                    (p.y + 0.0).to_bits(),
                    (p.z + 0.0).to_bits(),
                )
            }
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        struct EdgeKey(usize, usize);

        impl EdgeKey {
            fn new(a: usize, b: usize) -> Self {
                if a <= b {
                    Self(a, b)
                } else {
                    Self(b, a)
                }
            }
        }

        geometry.validate()?;

        let mut welded: BTreeMap<VertexKey, usize> = BTreeMap::new();
        let mut vertices = Vec::new();
        let remap: Vec<usize> = geometry
            .vertices
            .iter()
            .map(|&p| {
                *welded.entry(VertexKey::from_vec3(p)).or_insert_with(|| {
                    vertices.push(p);
                    vertices.len() - 1
                })
            })
            .collect();

        let mut tris = Vec::with_capacity(geometry.indices.len());
        let mut skipped = 0usize;
        for idx in &geometry.indices {
            let tri = [
                remap[idx[0] as usize],
                remap[idx[1] as usize],
                remap[idx[2] as usize],
            ];
            let [a, b, c] = tri.map(|i| vertices[i]);
            let repeated = tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2];
            if repeated || tri_area2(a.xz(), b.xz(), c.xz()).abs() <= MIN_FOOTPRINT_AREA2 {
                skipped += 1;
                continue;
            }
            tris.push(tri);
        }

        if skipped > 0 {
            tracing::debug!(skipped, kept = tris.len(), "Dropped non-walkable triangles");
        }
        if tris.is_empty() {
            return Err(GeometryError::NoWalkableTriangles);
        }

        let mut neighbors = vec![[None; 3]; tris.len()];
        let mut edge_map: BTreeMap<EdgeKey, (usize, usize)> = BTreeMap::new();

        for (tri_idx, tri) in tris.iter().enumerate() {
            for (edge_idx, (a, b)) in tri_edge_indices(tri).into_iter().enumerate() {
                let key = EdgeKey::new(a, b);
                if let Some((other_tri, other_edge)) = edge_map.remove(&key) {
                    neighbors[tri_idx][edge_idx] = Some(other_tri);
                    neighbors[other_tri][other_edge] = Some(tri_idx);
                } else {
                    edge_map.insert(key, (tri_idx, edge_idx));
                }
            }
        }

        let (tri_groups, groups) = flood_groups(&neighbors);

        let centroids = tris
            .iter()
            .map(|t| (vertices[t[0]] + vertices[t[1]] + vertices[t[2]]) / 3.0)
            .collect();
        let height_spans = tris
            .iter()
            .map(|&[i, j, k]| {
                let (a, b, c) = (vertices[i].y, vertices[j].y, vertices[k].y);
                (a.min(b).min(c), a.max(b).max(c))
            })
            .collect();

        Ok(Self {
            config,
            source: geometry.clone(),
            vertices,
            tris,
            neighbors,
            centroids,
            height_spans,
            tri_groups,
            groups,
        })
    }

    pub fn config(&self) -> NavMeshConfig {
        self.config
    }

    /// The geometry this mesh was built from.
    pub fn source(&self) -> &WalkableGeometry {
        &self.source
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn triangle(&self, tri: usize) -> Option<[Vec3; 3]> {
        self.tris
            .get(tri)
            .map(|&[i, j, k]| [self.vertices[i], self.vertices[j], self.vertices[k]])
    }

    pub fn group_of(&self, tri: usize) -> Option<GroupId> {
        self.tri_groups.get(tri).copied()
    }

    /// Triangle indices belonging to `group`, in ascending order.
    pub fn group_triangles(&self, group: GroupId) -> &[usize] {
        self.groups
            .get(group.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every group with its triangle count.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, usize)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, tris)| (GroupId(i as u32), tris.len()))
    }

    /// Triangle under (or over) `p`, preferring the one whose surface is vertically closest.
    pub fn find_triangle(&self, p: Vec3) -> Option<usize> {
        self.best_containing(0..self.tris.len(), p, None)
    }

    /// Like `find_triangle`, restricted to one group.
    pub fn find_triangle_in_group(&self, p: Vec3, group: GroupId) -> Option<usize> {
        self.best_containing(self.group_triangles(group).iter().copied(), p, None)
    }

    /// Height of the surface of `tri` at the ground-plane location of `p`.
    pub fn surface_height(&self, tri: usize, p: Vec3) -> Option<f32> {
        let [a, b, c] = self.triangle(tri)?;
        let q = p.xz();
        let area = tri_area2(a.xz(), b.xz(), c.xz());
        let wa = tri_area2(b.xz(), c.xz(), q) / area;
        let wb = tri_area2(c.xz(), a.xz(), q) / area;
        let wc = 1.0 - wa - wb;
        Some(a.y * wa + b.y * wb + c.y * wc)
    }

    pub fn find_corridor_in(
        &self,
        from: Vec3,
        to: Vec3,
        group: GroupId,
        query: &mut NavMeshQuery,
    ) -> Option<Corridor> {
        let mut out = Corridor::new(Vec::new(), group);
        self.find_corridor_into(from, to, group, query, &mut out)?;
        Some(out)
    }

    pub fn find_corridor_into(
        &self,
        from: Vec3,
        to: Vec3,
        group: GroupId,
        query: &mut NavMeshQuery,
        out: &mut Corridor,
    ) -> Option<()> {
        out.points.clear();
        out.regions.clear();
        out.group = group;

        let start_tri = self.locate_in_group(from, group, Some(to))?;
        let goal_tri = self.locate_in_group(to, group, Some(from))?;

        let NavMeshQuery {
            open,
            g_score,
            came_from,
            poly_path,
            portals,
            corners,
        } = query;

        // Clear line of sight: no search needed.
        if self.walk_segment(start_tri, from, to, g_score, poly_path) {
            out.regions
                .extend(poly_path.iter().map(|&i| NavRegionId(i as u32)));
            out.points.push(to);
            return Some(());
        }

        self.find_poly_path_into(start_tri, goal_tri, open, g_score, came_from, poly_path)?;

        // Portals are `(left, right)` as seen from above (+Y), which is clockwise-first in (x, z).
        portals.clear();
        portals.reserve(poly_path.len());
        for w in poly_path.windows(2) {
            let (a, b) = (w[0], w[1]);
            let (p0, p1) = self.shared_edge(a, b)?;
            let c0 = self.centroids[a].xz();
            let dir = self.centroids[b].xz() - c0;
            let s0 = dir.perp_dot(p0.xz() - c0);
            let s1 = dir.perp_dot(p1.xz() - c0);
            let (left, right) = if s0 <= s1 { (p0, p1) } else { (p1, p0) };
            portals.push((left, right));
        }

        // An endpoint lying on a portal already stands in the triangle beyond it. Keeping the
        // portal would pin the funnel to one of its ends.
        let first = portals
            .iter()
            .rposition(|&(l, r)| on_segment_xz(from, l, r))
            .map_or(0, |i| i + 1);
        let last = portals[first..]
            .iter()
            .position(|&(l, r)| on_segment_xz(to, l, r))
            .map_or(portals.len(), |i| first + i);
        out.regions
            .extend(poly_path[first..=last].iter().map(|&i| NavRegionId(i as u32)));
        if first == last {
            out.points.push(to);
            return Some(());
        }
        portals.truncate(last);
        portals.drain(..first);
        portals.push((to, to));

        string_pull_into(from, portals, corners);
        if corners.last().copied() != Some(to) {
            corners.push(to);
        }
        self.shortcut_into(group, corners, g_score, poly_path, &mut out.points);

        Some(())
    }

    /// Walk the ground-plane segment `from -> to` across shared edges, starting in `start_tri`.
    ///
    /// `crossed` receives the triangles visited. Returns false when the segment leaves the
    /// walkable surface (or its group) before reaching `to`.
    fn walk_segment(
        &self,
        start_tri: usize,
        from: Vec3,
        to: Vec3,
        marks: &mut Vec<u32>,
        crossed: &mut Vec<usize>,
    ) -> bool {
        crossed.clear();
        marks.resize(self.tris.len(), u32::MAX);
        marks.fill(u32::MAX);

        let origin = from.xz();
        let dir = to.xz() - origin;
        let mut tri = start_tri;
        loop {
            crossed.push(tri);
            marks[tri] = 0;
            if self.contains(tri, to) {
                return true;
            }
            match self.exit_neighbor(tri, origin, dir, marks) {
                Some(next) => tri = next,
                None => return false,
            }
        }
    }

    /// Unvisited neighbor across the edge where `origin + t * dir` leaves `tri`, for `t < 1`.
    fn exit_neighbor(&self, tri: usize, origin: Vec2, dir: Vec2, marks: &[u32]) -> Option<usize> {
        let corners = self.tris[tri].map(|i| self.vertices[i].xz());
        let winding = if tri_area2(corners[0], corners[1], corners[2]) > 0.0 {
            1.0
        } else {
            -1.0
        };

        let mut exit: Option<(f32, Option<usize>)> = None;
        for edge in 0..3 {
            let a = corners[edge];
            let along = corners[(edge + 1) % 3] - a;
            let rate = winding * along.perp_dot(dir);
            if rate >= 0.0 {
                continue;
            }
            let t = -winding * along.perp_dot(origin - a) / rate;
            let next = self.neighbors[tri][edge].filter(|&n| marks[n] == u32::MAX);
            exit = match exit {
                // Through a vertex the segment leaves by two edges at once; either open one will do.
                Some((best_t, best_next)) if (t - best_t).abs() <= WALK_EPSILON => {
                    Some((best_t.min(t), best_next.or(next)))
                }
                Some((best_t, _)) if t > best_t => exit,
                _ => Some((t, next)),
            };
        }

        match exit {
            Some((t, next)) if t < 1.0 => next,
            _ => None,
        }
    }

    /// Keep only the corners that block the view, jumping to the farthest visible one each time.
    fn shortcut_into(
        &self,
        group: GroupId,
        corners: &[Vec3],
        marks: &mut Vec<u32>,
        crossed: &mut Vec<usize>,
        out: &mut Vec<Vec3>,
    ) {
        let mut i = 0;
        while i + 1 < corners.len() {
            let mut j = corners.len() - 1;
            while j > i + 1 {
                let (a, b) = (corners[i], corners[j]);
                let sees = self
                    .locate_in_group(a, group, Some(b))
                    .is_some_and(|tri| self.walk_segment(tri, a, b, marks, crossed));
                if sees {
                    break;
                }
                j -= 1;
            }
            out.push(corners[j]);
            i = j;
        }
    }

    /// Containing triangle whose surface is vertically closest to `p`.
    ///
    /// A point on a shared edge or vertex is inside several triangles at the same height; the
    /// one whose centroid is nearest `toward` wins so a search starts on the side it heads to.
    fn best_containing(
        &self,
        candidates: impl Iterator<Item = usize>,
        p: Vec3,
        toward: Option<Vec3>,
    ) -> Option<usize> {
        let mut best: Option<(f32, f32, usize)> = None;
        for tri in candidates {
            if !self.contains(tri, p) {
                continue;
            }
            let dy = self
                .surface_height(tri, p)
                .map(|h| (p.y - h).abs())
                .unwrap_or(f32::INFINITY);
            let facing = toward.map_or(0.0, |t| self.centroids[tri].xz().distance(t.xz()));
            match best {
                Some((best_dy, _, _)) if dy > best_dy + HEIGHT_TIE => {}
                Some((best_dy, best_facing, _))
                    if dy >= best_dy - HEIGHT_TIE && facing >= best_facing => {}
                _ => best = Some((dy, facing, tri)),
            }
        }
        best.map(|(_, _, tri)| tri)
    }

    fn contains(&self, tri: usize, p: Vec3) -> bool {
        let (lo, hi) = self.height_spans[tri];
        let tol = self.config.vertical_tolerance;
        if p.y > hi + tol || p.y < lo - tol {
            return false;
        }
        let t = self.tris[tri];
        point_in_triangle(
            p.xz(),
            [
                self.vertices[t[0]].xz(),
                self.vertices[t[1]].xz(),
                self.vertices[t[2]].xz(),
            ],
        )
    }

    /// Containing triangle in `group`, tolerating points a rounding error outside of it.
    fn locate_in_group(&self, p: Vec3, group: GroupId, toward: Option<Vec3>) -> Option<usize> {
        if let Some(tri) =
            self.best_containing(self.group_triangles(group).iter().copied(), p, toward)
        {
            return Some(tri);
        }

        let tol = self.config.vertical_tolerance;
        let mut best: Option<(f32, usize)> = None;
        for &tri in self.group_triangles(group) {
            let [a, b, c] = self.triangle(tri)?;
            let q = closest_point_on_triangle(p, [a, b, c]);
            if (q.y - p.y).abs() > tol {
                continue;
            }
            let d = q.xz().distance(p.xz());
            if d > LOCATE_SLACK {
                continue;
            }
            match best {
                Some((best_d, _)) if d >= best_d => {}
                _ => best = Some((d, tri)),
            }
        }
        best.map(|(_, tri)| tri)
    }

    fn find_poly_path_into(
        &self,
        start_tri: usize,
        goal_tri: usize,
        open: &mut BinaryHeap<OpenNode>,
        g_score: &mut Vec<u32>,
        came_from: &mut Vec<Option<usize>>,
        out: &mut Vec<usize>,
    ) -> Option<()> {
        out.clear();

        if start_tri == goal_tri {
            out.push(start_tri);
            return Some(());
        }
        if self.tri_groups[start_tri] != self.tri_groups[goal_tri] {
            return None;
        }

        let goal = self.centroids[goal_tri];
        let quant = |d: f32| -> u32 { (d.max(0.0) * 1024.0) as u32 };
        let heuristic = |tri: usize| -> u32 { quant(self.centroids[tri].distance(goal)) };
        let edge_cost = |a: usize, b: usize| -> u32 {
            // Cost between triangle centroids.
            quant(self.centroids[a].distance(self.centroids[b])).saturating_add(1)
        };

        let n = self.tris.len();
        open.clear();
        g_score.resize(n, u32::MAX);
        g_score.fill(u32::MAX);
        came_from.resize(n, None);
        came_from.fill(None);

        g_score[start_tri] = 0;
        open.push(OpenNode {
            f: heuristic(start_tri),
            g: 0,
            tri: start_tri,
            tie: 0,
        });
        let mut tie: u64 = 1;

        while let Some(node) = open.pop() {
            if node.tri == goal_tri {
                out.push(goal_tri);
                let mut current = goal_tri;
                while let Some(prev) = came_from[current] {
                    current = prev;
                    out.push(current);
                }
                out.reverse();
                return Some(());
            }

            if node.g != g_score[node.tri] {
                continue;
            }

            for ntri in self.tri_neighbors(node.tri) {
                let tentative_g = node.g.saturating_add(edge_cost(node.tri, ntri));
                if tentative_g >= g_score[ntri] {
                    continue;
                }

                came_from[ntri] = Some(node.tri);
                g_score[ntri] = tentative_g;
                open.push(OpenNode {
                    f: tentative_g.saturating_add(heuristic(ntri)),
                    g: tentative_g,
                    tri: ntri,
                    tie,
                });
                tie += 1;
            }
        }

        None
    }

    fn tri_neighbors(&self, tri: usize) -> impl Iterator<Item = usize> + '_ {
        // Deterministic order: edge order (0,1), (1,2), (2,0).
        self.neighbors[tri].into_iter().flatten()
    }

    fn shared_edge(&self, from: usize, to: usize) -> Option<(Vec3, Vec3)> {
        let tri = self.tris[from];
        for (edge_idx, (a, b)) in tri_edge_indices(&tri).into_iter().enumerate() {
            if self.neighbors[from][edge_idx] == Some(to) {
                return Some((self.vertices[a], self.vertices[b]));
            }
        }
        None
    }
}

impl Navigator for NavMesh {
    fn resolve_group(&self, position: Vec3) -> Option<GroupId> {
        if let Some(tri) = self.find_triangle(position) {
            return Some(self.tri_groups[tri]);
        }

        let radius = self.config.group_search_radius.max(0.0);
        let radius2 = radius * radius;
        let mut best: Option<(f32, usize)> = None;
        for (tri, c) in self.centroids.iter().enumerate() {
            let d2 = c.distance_squared(position);
            if d2 >= radius2 {
                continue;
            }
            match best {
                Some((best_d2, _)) if d2 >= best_d2 => {}
                _ => best = Some((d2, tri)),
            }
        }
        best.map(|(_, tri)| self.tri_groups[tri])
    }

    fn nearest_point(&self, position: Vec3, group: GroupId) -> Option<Vec3> {
        self.group_triangles(group)
            .iter()
            .filter_map(|&tri| self.triangle(tri))
            .map(|t| closest_point_on_triangle(position, t))
            .min_by(|a, b| {
                a.distance_squared(position)
                    .total_cmp(&b.distance_squared(position))
            })
    }

    fn find_corridor(&self, from: Vec3, to: Vec3, group: GroupId) -> Option<Corridor> {
        let mut query = NavMeshQuery::default();
        self.find_corridor_in(from, to, group, &mut query)
    }

    fn stats(&self) -> Option<ZoneStats> {
        Some(ZoneStats {
            triangles: self.triangle_count(),
            groups: self.group_count(),
        })
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct NavMeshSerde {
    #[serde(default)]
    config: NavMeshConfig,
    geometry: WalkableGeometry,
}

#[cfg(feature = "serde")]
impl Serialize for NavMesh {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NavMeshSerde {
            config: self.config,
            geometry: self.source.clone(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for NavMesh {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = NavMeshSerde::deserialize(deserializer)?;
        NavMesh::from_geometry(&data.geometry, data.config).map_err(serde::de::Error::custom)
    }
}

fn flood_groups(neighbors: &[[Option<usize>; 3]]) -> (Vec<GroupId>, Vec<Vec<usize>>) {
    let n = neighbors.len();
    let mut tri_groups = vec![GroupId(0); n];
    let mut visited = vec![false; n];
    let mut groups = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        let id = GroupId(groups.len() as u32);
        let mut members = Vec::new();
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(tri) = queue.pop_front() {
            tri_groups[tri] = id;
            members.push(tri);
            for ntri in neighbors[tri].into_iter().flatten() {
                if !visited[ntri] {
                    visited[ntri] = true;
                    queue.push_back(ntri);
                }
            }
        }

        members.sort_unstable();
        groups.push(members);
    }

    (tri_groups, groups)
}

fn tri_edge_indices(tri: &[usize; 3]) -> [(usize, usize); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

fn tri_area2(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

fn area_xz(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    tri_area2(a.xz(), b.xz(), c.xz())
}

fn point_in_triangle(p: Vec2, tri: [Vec2; 3]) -> bool {
    let [a, b, c] = tri;
    let eps = EDGE_EPSILON * tri_area2(a, b, c).abs().max(1.0);
    let ab = tri_area2(a, b, p);
    let bc = tri_area2(b, c, p);
    let ca = tri_area2(c, a, p);
    let has_neg = ab < -eps || bc < -eps || ca < -eps;
    let has_pos = ab > eps || bc > eps || ca > eps;
    !(has_neg && has_pos)
}

fn closest_point_on_triangle(p: Vec3, [a, b, c]: [Vec3; 3]) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Whether `p` lies on segment `a`-`b` in the ground plane.
fn on_segment_xz(p: Vec3, a: Vec3, b: Vec3) -> bool {
    let (p, a, b) = (p.xz(), a.xz(), b.xz());
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 <= f32::EPSILON {
        return p.distance(a) <= ON_PORTAL_EPSILON;
    }
    let t = (p - a).dot(ab) / len2;
    (-1e-6..=1.0 + 1e-6).contains(&t)
        && ab.perp_dot(p - a).abs() <= ON_PORTAL_EPSILON * len2.sqrt()
}

/// Simple stupid funnel over `(left, right)` portals, evaluated on the ground plane.
fn string_pull_into(start: Vec3, portals: &[(Vec3, Vec3)], out: &mut Vec<Vec3>) {
    out.clear();
    out.push(start);
    if portals.is_empty() {
        return;
    }

    let mut apex = start;
    let mut left = portals[0].0;
    let mut right = portals[0].1;
    let mut left_index: usize = 0;
    let mut right_index: usize = 0;

    let mut i: usize = 1;
    while i < portals.len() {
        let p_left = portals[i].0;
        let p_right = portals[i].1;

        // Update right vertex.
        if area_xz(apex, right, p_right) <= 0.0 {
            if apex == right || area_xz(apex, left, p_right) > 0.0 {
                right = p_right;
                right_index = i;
            } else {
                push_corner(out, left);
                apex = left;
                let new_index = left_index;
                left = apex;
                right = apex;
                left_index = new_index;
                right_index = new_index;
                i = new_index + 1;
                continue;
            }
        }

        // Update left vertex.
        if area_xz(apex, left, p_left) >= 0.0 {
            if apex == left || area_xz(apex, right, p_left) < 0.0 {
                left = p_left;
                left_index = i;
            } else {
                push_corner(out, right);
                apex = right;
                let new_index = right_index;
                left = apex;
                right = apex;
                left_index = new_index;
                right_index = new_index;
                i = new_index + 1;
                continue;
            }
        }

        i += 1;
    }
}

/// An apex that lands on the previous corner (a start sitting on a portal vertex) is not a turn.
fn push_corner(out: &mut Vec<Vec3>, corner: Vec3) {
    if out
        .last()
        .map_or(true, |&last| last.distance_squared(corner) > 1e-12)
    {
        out.push(corner);
    }
}
