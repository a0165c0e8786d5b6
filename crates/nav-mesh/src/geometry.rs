use nav_core::{GeometryError, Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Triangulated walkable surface as handed over by an asset loader.
///
/// This is the vertex/index buffer pair of a mesh; winding is irrelevant.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WalkableGeometry {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
}

impl WalkableGeometry {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// Build from flat `[x, y, z, x, y, z, ...]` positions and `[i, j, k, ...]` indices.
    pub fn from_buffers(positions: &[f32], indices: &[u32]) -> Result<Self, GeometryError> {
        if positions.len() % 3 != 0 {
            return Err(GeometryError::MalformedBuffer {
                buffer: "position",
                len: positions.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(GeometryError::MalformedBuffer {
                buffer: "index",
                len: indices.len(),
            });
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        let indices = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
        Ok(Self { vertices, indices })
    }

    /// A flat rectangle at `height`, split into `cells x cells` quads of two triangles each.
    pub fn plane(min: Vec2, max: Vec2, height: f32, cells: u32) -> Self {
        let cells = cells.max(1);
        let step_x = (max.x - min.x) / cells as f32;
        let step_z = (max.y - min.y) / cells as f32;
        let stride = cells + 1;

        let mut vertices = Vec::with_capacity((stride * stride) as usize);
        for row in 0..stride {
            for col in 0..stride {
                vertices.push(Vec3::new(
                    min.x + col as f32 * step_x,
                    height,
                    min.y + row as f32 * step_z,
                ));
            }
        }

        let mut indices = Vec::with_capacity((cells * cells * 2) as usize);
        for row in 0..cells {
            for col in 0..cells {
                let i0 = row * stride + col;
                let i1 = i0 + 1;
                let i2 = i0 + stride + 1;
                let i3 = i0 + stride;
                indices.push([i0, i1, i2]);
                indices.push([i0, i2, i3]);
            }
        }

        Self { vertices, indices }
    }

    /// Append another surface, rebasing its indices.
    pub fn merge(&mut self, other: &WalkableGeometry) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|t| [t[0] + base, t[1] + base, t[2] + base]));
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.is_empty() {
            return Err(GeometryError::Empty);
        }

        if let Some(index) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(GeometryError::NonFiniteVertex { index });
        }

        let vertex_count = self.vertices.len();
        for (triangle, tri) in self.indices.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(GeometryError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_has_two_triangles_per_cell() {
        let g = WalkableGeometry::plane(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), 0.0, 4);
        assert_eq!(g.vertices.len(), 25);
        assert_eq!(g.indices.len(), 32);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn from_buffers_rejects_ragged_positions() {
        let err = WalkableGeometry::from_buffers(&[0.0, 1.0], &[0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::MalformedBuffer {
                buffer: "position",
                len: 2
            }
        );
    }

    #[test]
    fn validate_reports_out_of_range_index() {
        let g = WalkableGeometry::new(
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            vec![[0, 1, 3]],
        );
        assert_eq!(
            g.validate(),
            Err(GeometryError::IndexOutOfRange {
                triangle: 0,
                index: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn validate_reports_non_finite_vertex() {
        let g = WalkableGeometry::new(
            vec![Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            vec![[0, 1, 2]],
        );
        assert_eq!(g.validate(), Err(GeometryError::NonFiniteVertex { index: 1 }));
    }

    #[test]
    fn merge_rebases_indices() {
        let mut a = WalkableGeometry::plane(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0.0, 1);
        let b = WalkableGeometry::plane(Vec2::new(5.0, 0.0), Vec2::new(6.0, 1.0), 0.0, 1);
        a.merge(&b);
        assert_eq!(a.vertices.len(), 8);
        assert_eq!(a.indices.len(), 4);
        assert_eq!(a.indices[2], b.indices[0].map(|i| i + 4));
        assert_eq!(a.indices[3], b.indices[1].map(|i| i + 4));
    }
}
