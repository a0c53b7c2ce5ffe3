//! Cube-based isosurface extraction (marching cubes).
//!
//! Walks every unit cube of the density field, classifies its corners
//! against the iso level, and emits the triangles the lookup tables
//! prescribe for that configuration. Linear in grid volume, independent of
//! surface complexity.

use crate::core::types::{IVec3, Vec3};
use crate::mesh::Mesh;
use crate::mesh::tables::{CORNER_OFFSETS, EDGE_CONNECTIONS, EDGE_TABLE, TRI_TABLE};

/// Corner values closer together than this are treated as equal when
/// interpolating an edge crossing; the crossing falls on the midpoint.
const FLAT_EDGE_EPSILON: f32 = 1e-6;

/// Extract the iso-surface of a density field as a triangle mesh.
///
/// `field` is dense, addressed `x + y*w + z*w*h` over `dims`. Vertex
/// positions are emitted in index space; the caller applies any visual
/// scale. The result is a pure function of the snapshot — extraction never
/// reads the field twice at the same point and never mutates it.
pub fn extract(field: &[f32], dims: IVec3, iso_level: f32) -> Mesh {
    debug_assert_eq!(field.len(), (dims.x * dims.y * dims.z) as usize);

    let mut mesh = Mesh::default();
    // A cube spans two lattice points per axis; thinner grids hold no cube
    if dims.x < 2 || dims.y < 2 || dims.z < 2 {
        return mesh;
    }

    let idx = |x: i32, y: i32, z: i32| (x + y * dims.x + z * dims.x * dims.y) as usize;

    let mut values = [0.0f32; 8];
    let mut corners = [Vec3::ZERO; 8];
    let mut edge_points = [Vec3::ZERO; 12];

    for z in 0..dims.z - 1 {
        for y in 0..dims.y - 1 {
            for x in 0..dims.x - 1 {
                for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
                    let (cx, cy, cz) = (x + offset[0], y + offset[1], z + offset[2]);
                    values[i] = field[idx(cx, cy, cz)];
                    corners[i] = Vec3::new(cx as f32, cy as f32, cz as f32);
                }

                // Configuration index: bit i set when corner i is below the
                // iso level
                let mut config = 0usize;
                for (i, &v) in values.iter().enumerate() {
                    if v < iso_level {
                        config |= 1 << i;
                    }
                }

                // Fully inside or outside cubes cross no edges
                let crossings = EDGE_TABLE[config];
                if crossings == 0 {
                    continue;
                }

                for (i, [a, b]) in EDGE_CONNECTIONS.iter().enumerate() {
                    if crossings & (1 << i) != 0 {
                        edge_points[i] = interpolate(
                            corners[*a],
                            corners[*b],
                            values[*a],
                            values[*b],
                            iso_level,
                        );
                    }
                }

                let row = &TRI_TABLE[config];
                let mut t = 0;
                while row[t] >= 0 {
                    mesh.push_triangle(
                        edge_points[row[t] as usize],
                        edge_points[row[t + 1] as usize],
                        edge_points[row[t + 2] as usize],
                    );
                    t += 3;
                }
            }
        }
    }

    mesh
}

/// Point along an edge where the field crosses the iso level, weighted by
/// how far each endpoint sits past it
fn interpolate(p0: Vec3, p1: Vec3, v0: f32, v1: f32, iso_level: f32) -> Vec3 {
    let delta = v1 - v0;
    if delta.abs() < FLAT_EDGE_EPSILON {
        return (p0 + p1) * 0.5;
    }
    let t = ((iso_level - v0) / delta).clamp(0.0, 1.0);
    p0 + (p1 - p0) * t
}
