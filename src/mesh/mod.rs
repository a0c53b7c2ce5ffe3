//! Triangle mesh data and isosurface extraction

pub mod extractor;
pub mod tables;

pub use extractor::extract;

use crate::core::types::Vec3;
use crate::math::Aabb;

/// Triangle mesh produced by surface extraction.
///
/// Normals are flat-shaded: each triangle's face normal is duplicated for
/// its three vertices. Vertices are not shared between triangles, so the
/// index buffer is sequential — every group of three consecutive indices
/// is one triangle.
///
/// A mesh is rebuilt in full on each extraction; there is no incremental
/// update path.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no geometry
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append one triangle, computing its face normal from the winding
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let base = self.vertices.len() as u32;
        self.vertices.extend([a, b, c]);
        self.normals.extend([normal; 3]);
        self.indices.extend([base, base + 1, base + 2]);
    }

    /// Bounding box over all vertices, or None for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let mut verts = self.vertices.iter();
        let first = verts.next()?;
        let mut bounds = Aabb::from_point(*first);
        for v in verts {
            bounds.expand(*v);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_triangle() {
        let mut mesh = Mesh::default();
        mesh.push_triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.normals.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        // Counter-clockwise in the xy plane faces +z
        assert_eq!(mesh.normals[0], Vec3::Z);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::default();
        assert!(mesh.bounds().is_none());
        mesh.push_triangle(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 1.0));
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(2.0, 3.0, 1.0));
    }
}
