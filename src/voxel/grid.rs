//! Dense voxel density grid with bounded mutation and spherical sculpting.
//!
//! The grid stores one density value in [0, 1] per voxel. Values above
//! [`SOLID_THRESHOLD`] count as solid terrain; the continuous range lets
//! sculpting blend smoothly and gives the surface extractor something to
//! interpolate.

use log::{debug, info};

use crate::core::error::Error;
use crate::core::types::{IVec3, Result, Vec3};
use crate::math::Aabb;
use crate::terrain::NoiseField;
use crate::voxel::brush::{Brush, DepthGate, SculptMode};

/// Density above which a voxel counts as solid
pub const SOLID_THRESHOLD: f32 = 0.5;

/// Zero-argument change-notification callback
type ChangeCallback = Box<dyn FnMut()>;

/// A 3D grid of density values representing sculptable terrain.
///
/// Voxels are addressed `x + y*width + z*width*height`. All reads outside
/// the grid return 0.0 (air) and all writes outside are ignored; no
/// operation can fault on coordinates. The visual `scale` is purely a
/// presentation multiplier — sampling and sculpting always operate in
/// unscaled index space.
///
/// Registered change observers run synchronously, in registration order,
/// after every regenerate/resize/clear/sculpt. Mutating the grid from
/// inside an observer is not supported.
pub struct VoxelGrid {
    dims: IVec3,
    scale: f32,
    cells: Vec<f32>,
    noise: NoiseField,
    observers: Vec<ChangeCallback>,
}

impl VoxelGrid {
    /// Create a grid and fill it with terrain from the noise field.
    ///
    /// Every axis must be at least 1.
    pub fn new(dims: IVec3, scale: f32, noise: NoiseField) -> Result<Self> {
        if dims.x < 1 || dims.y < 1 || dims.z < 1 {
            return Err(Error::InvalidDimensions(dims.x, dims.y, dims.z));
        }

        let mut grid = Self {
            dims,
            scale,
            cells: vec![0.0; (dims.x * dims.y * dims.z) as usize],
            noise,
            observers: Vec::new(),
        };
        grid.fill_from_noise();
        Ok(grid)
    }

    /// Grid width (x extent in voxels)
    pub fn width(&self) -> i32 {
        self.dims.x
    }

    /// Grid height (y extent in voxels)
    pub fn height(&self) -> i32 {
        self.dims.y
    }

    /// Grid depth (z extent in voxels)
    pub fn depth(&self) -> i32 {
        self.dims.z
    }

    /// All three dimensions
    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    /// Total number of voxels
    pub fn voxel_count(&self) -> usize {
        self.cells.len()
    }

    /// Distance between voxels when positioned in world space
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Change the visual scale. Presentation only; no notification fires.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Noise field the terrain was generated from
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Density snapshot for surface extraction, addressed
    /// `x + y*width + z*width*height`
    pub fn density_field(&self) -> &[f32] {
        &self.cells
    }

    /// Index-space bounds. Voxel (x, y, z) spans half a unit around its
    /// lattice point, so the box runs from -0.5 to dims - 0.5.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(Vec3::splat(-0.5), self.dims.as_vec3() - 0.5)
    }

    /// Register a change observer. Observers run synchronously after every
    /// mutating operation, in registration order.
    pub fn on_change(&mut self, callback: impl FnMut() + 'static) {
        self.observers.push(Box::new(callback));
    }

    /// Density at `pos`, or 0.0 (air) when out of range
    pub fn get(&self, pos: IVec3) -> f32 {
        self.index(pos).map(|i| self.cells[i]).unwrap_or(0.0)
    }

    /// Whether the voxel at `pos` is solid terrain
    pub fn solid(&self, pos: IVec3) -> bool {
        self.get(pos) > SOLID_THRESHOLD
    }

    /// Write a density value, clamped to [0, 1]. Out-of-range positions are
    /// ignored. No notification fires; callers batch edits through the
    /// operations below.
    pub fn set(&mut self, pos: IVec3, value: f32) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = value.clamp(0.0, 1.0);
        }
    }

    /// Replace the noise field and rebuild the whole volume from it.
    /// Notifies once.
    pub fn regenerate(&mut self, noise: NoiseField) {
        info!(
            "Regenerating {}x{}x{} terrain (seed {})",
            self.dims.x,
            self.dims.y,
            self.dims.z,
            noise.seed()
        );
        self.noise = noise;
        self.fill_from_noise();
        self.notify();
    }

    /// Resize the grid, preserving sculpted content where the geometry
    /// overlaps.
    ///
    /// Fresh storage is regenerated from the current noise at the new
    /// dimensions, then the overlapping region of the old contents is
    /// copied back — but only when the height is unchanged. The grid cannot
    /// be stretched along y without distorting edits, so a height change
    /// drops them. Notifies once.
    pub fn resize(&mut self, new_dims: IVec3) -> Result<()> {
        if new_dims.x < 1 || new_dims.y < 1 || new_dims.z < 1 {
            return Err(Error::InvalidDimensions(new_dims.x, new_dims.y, new_dims.z));
        }
        info!(
            "Resizing terrain {}x{}x{} -> {}x{}x{}",
            self.dims.x, self.dims.y, self.dims.z, new_dims.x, new_dims.y, new_dims.z
        );

        let old_dims = self.dims;
        let old_cells = std::mem::take(&mut self.cells);

        self.dims = new_dims;
        self.cells = vec![0.0; (new_dims.x * new_dims.y * new_dims.z) as usize];
        self.fill_from_noise();

        if old_dims.y == new_dims.y {
            let overlap = old_dims.min(new_dims);
            for z in 0..overlap.z {
                for y in 0..overlap.y {
                    for x in 0..overlap.x {
                        let old_idx = (x + y * old_dims.x + z * old_dims.x * old_dims.y) as usize;
                        let new_idx = (x + y * new_dims.x + z * new_dims.x * new_dims.y) as usize;
                        self.cells[new_idx] = old_cells[old_idx];
                    }
                }
            }
        }

        self.notify();
        Ok(())
    }

    /// Reset to a flat floor: air everywhere except a solid y = 0 layer.
    /// Notifies once.
    pub fn clear(&mut self) {
        self.cells.fill(0.0);
        for z in 0..self.dims.z {
            for x in 0..self.dims.x {
                let idx = (x + z * self.dims.x * self.dims.y) as usize;
                self.cells[idx] = 1.0;
            }
        }
        self.notify();
    }

    /// Apply a spherical brush centered on a voxel.
    ///
    /// Every in-bounds voxel within `brush.radius` of the center gains
    /// (additive) or loses (destructive) `brush.strength` density, clamped
    /// to [0, 1]. When a depth gate is supplied, voxels on the wrong side
    /// of the hit point are skipped. Notifies once after the full pass and
    /// returns the number of voxels actually changed.
    pub fn sculpt(
        &mut self,
        center: IVec3,
        brush: &Brush,
        mode: SculptMode,
        gate: Option<&DepthGate>,
    ) -> usize {
        let reach = brush.radius.ceil() as i32;
        let radius_sq = brush.radius * brush.radius;
        let mut changed = 0;

        for dz in -reach..=reach {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let offset = IVec3::new(dx, dy, dz);
                    if offset.length_squared() as f32 > radius_sq {
                        continue;
                    }
                    let pos = center + offset;
                    if let Some(gate) = gate {
                        if !gate.allows(mode, pos.as_vec3()) {
                            continue;
                        }
                    }
                    let Some(idx) = self.index(pos) else {
                        continue;
                    };

                    let current = self.cells[idx];
                    let next = match mode {
                        SculptMode::Additive => (current + brush.strength).clamp(0.0, 1.0),
                        SculptMode::Destructive => (current - brush.strength).clamp(0.0, 1.0),
                    };
                    if next != current {
                        self.cells[idx] = next;
                        changed += 1;
                    }
                }
            }
        }

        debug!(
            "Sculpt {:?} at {} r={} changed {} voxels",
            mode, center, brush.radius, changed
        );
        self.notify();
        changed
    }

    fn index(&self, pos: IVec3) -> Option<usize> {
        if pos.x < 0
            || pos.y < 0
            || pos.z < 0
            || pos.x >= self.dims.x
            || pos.y >= self.dims.y
            || pos.z >= self.dims.z
        {
            return None;
        }
        Some((pos.x + pos.y * self.dims.x + pos.z * self.dims.x * self.dims.y) as usize)
    }

    /// Heightmap fill: each (x, z) column samples a height fraction from
    /// the noise, scaled by the grid height. Voxels below the surface get
    /// full density, the boundary voxel gets the fractional remainder, and
    /// everything above is air.
    fn fill_from_noise(&mut self) {
        let dims = self.dims;
        for z in 0..dims.z {
            for x in 0..dims.x {
                let surface = self.noise.sample(x, z) * dims.y as f32;
                for y in 0..dims.y {
                    let idx = (x + y * dims.x + z * dims.x * dims.y) as usize;
                    self.cells[idx] = (surface - y as f32).clamp(0.0, 1.0);
                }
            }
        }
    }

    fn notify(&mut self) {
        for callback in &mut self.observers {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn test_grid(dims: IVec3) -> VoxelGrid {
        VoxelGrid::new(dims, 1.0, NoiseField::new(0, 0.1)).unwrap()
    }

    fn fill_solid(grid: &mut VoxelGrid) {
        for z in 0..grid.depth() {
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    grid.set(IVec3::new(x, y, z), 1.0);
                }
            }
        }
    }

    #[test]
    fn test_rejects_non_positive_dims() {
        let noise = NoiseField::new(0, 0.1);
        assert!(VoxelGrid::new(IVec3::new(0, 5, 5), 1.0, noise.clone()).is_err());
        assert!(VoxelGrid::new(IVec3::new(5, -1, 5), 1.0, noise.clone()).is_err());
        assert!(VoxelGrid::new(IVec3::new(5, 5, 0), 1.0, noise).is_err());
    }

    #[test]
    fn test_out_of_range_get_returns_air() {
        let grid = test_grid(IVec3::new(4, 5, 6));
        let faces = [
            IVec3::new(-1, 0, 0),
            IVec3::new(4, 0, 0),
            IVec3::new(0, -1, 0),
            IVec3::new(0, 5, 0),
            IVec3::new(0, 0, -1),
            IVec3::new(0, 0, 6),
        ];
        for pos in faces {
            assert_eq!(grid.get(pos), 0.0, "expected air at {pos}");
            assert!(!grid.solid(pos));
        }
    }

    #[test]
    fn test_out_of_range_set_is_noop() {
        let mut grid = test_grid(IVec3::new(4, 4, 4));
        let before = grid.density_field().to_vec();
        grid.set(IVec3::new(-1, 2, 2), 1.0);
        grid.set(IVec3::new(2, 4, 2), 1.0);
        grid.set(IVec3::new(2, 2, 17), 1.0);
        assert_eq!(grid.density_field(), &before[..]);
    }

    #[test]
    fn test_set_clamps_to_unit_range() {
        let mut grid = test_grid(IVec3::splat(3));
        grid.set(IVec3::new(1, 1, 1), -0.5);
        assert_eq!(grid.get(IVec3::new(1, 1, 1)), 0.0);
        grid.set(IVec3::new(1, 1, 1), 7.0);
        assert_eq!(grid.get(IVec3::new(1, 1, 1)), 1.0);
    }

    #[test]
    fn test_regenerate_is_deterministic() {
        let a = test_grid(IVec3::splat(10));
        let b = test_grid(IVec3::splat(10));
        assert_eq!(a.density_field(), b.density_field());
    }

    #[test]
    fn test_regenerate_replaces_noise() {
        let mut grid = test_grid(IVec3::splat(8));
        let before = grid.density_field().to_vec();
        grid.regenerate(NoiseField::new(99, 0.1));
        assert_eq!(grid.noise().seed(), 99);
        assert_ne!(grid.density_field(), &before[..]);
    }

    #[test]
    fn test_resize_preserves_overlap_when_height_unchanged() {
        let mut grid = test_grid(IVec3::splat(5));
        // Sculpt so the contents differ from a fresh regeneration
        fill_solid(&mut grid);
        let original = grid.density_field().to_vec();
        let old_dims = grid.dims();

        grid.resize(IVec3::new(3, 5, 3)).unwrap();

        for z in 0..3 {
            for y in 0..5 {
                for x in 0..3 {
                    let old_idx = (x + y * old_dims.x + z * old_dims.x * old_dims.y) as usize;
                    assert_eq!(
                        grid.get(IVec3::new(x, y, z)),
                        original[old_idx],
                        "mismatch at ({x}, {y}, {z})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_resize_with_height_change_regenerates() {
        let mut grid = test_grid(IVec3::splat(5));
        fill_solid(&mut grid);

        grid.resize(IVec3::new(5, 3, 5)).unwrap();

        // Contents match a fresh grid at the new dimensions, edits dropped
        let fresh = test_grid(IVec3::new(5, 3, 5));
        assert_eq!(grid.density_field(), fresh.density_field());
    }

    #[test]
    fn test_resize_rejects_non_positive_dims() {
        let mut grid = test_grid(IVec3::splat(4));
        assert!(grid.resize(IVec3::new(4, 0, 4)).is_err());
        // Failed resize leaves the grid untouched
        assert_eq!(grid.dims(), IVec3::splat(4));
        assert_eq!(grid.voxel_count(), 64);
    }

    #[test]
    fn test_clear_leaves_solid_floor() {
        let mut grid = test_grid(IVec3::new(6, 4, 6));
        grid.clear();
        for z in 0..6 {
            for x in 0..6 {
                assert!(grid.solid(IVec3::new(x, 0, z)));
                for y in 1..4 {
                    assert_eq!(grid.get(IVec3::new(x, y, z)), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_sculpt_sphere_containment() {
        let mut grid = test_grid(IVec3::splat(9));
        fill_solid(&mut grid);

        let center = IVec3::splat(4);
        let brush = Brush {
            radius: 2.0,
            strength: 1.0,
        };
        grid.sculpt(center, &brush, SculptMode::Destructive, None);

        for z in 0..9 {
            for y in 0..9 {
                for x in 0..9 {
                    let pos = IVec3::new(x, y, z);
                    let dist_sq = (pos - center).length_squared();
                    if dist_sq as f32 <= brush.radius * brush.radius {
                        assert_eq!(grid.get(pos), 0.0, "voxel {pos} should be carved");
                    } else {
                        assert_eq!(grid.get(pos), 1.0, "voxel {pos} should be untouched");
                    }
                }
            }
        }
    }

    #[test]
    fn test_sculpt_respects_depth_gate() {
        let mut grid = test_grid(IVec3::splat(9));
        fill_solid(&mut grid);

        // Viewer on the -x side aiming at the center; the gate stops the
        // carve from reaching voxels behind the hit point
        let camera = Vec3::new(-10.0, 4.0, 4.0);
        let center = IVec3::splat(4);
        let gate = DepthGate::new(camera, (center.as_vec3() - camera).length());
        let brush = Brush {
            radius: 2.0,
            strength: 1.0,
        };
        grid.sculpt(center, &brush, SculptMode::Destructive, Some(&gate));

        // In front of the hit point: carved
        assert_eq!(grid.get(IVec3::new(3, 4, 4)), 0.0);
        // Behind the hit point, inside the sphere: protected by the gate
        assert_eq!(grid.get(IVec3::new(6, 4, 4)), 1.0);
    }

    #[test]
    fn test_sculpt_reports_changed_count() {
        let mut grid = test_grid(IVec3::splat(9));
        fill_solid(&mut grid);

        let brush = Brush {
            radius: 1.0,
            strength: 1.0,
        };
        // Radius 1 sphere: center + 6 face neighbors
        let changed = grid.sculpt(IVec3::splat(4), &brush, SculptMode::Destructive, None);
        assert_eq!(changed, 7);

        // Carving the same spot again changes nothing
        let changed = grid.sculpt(IVec3::splat(4), &brush, SculptMode::Destructive, None);
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_observers_run_in_order_once_per_operation() {
        let mut grid = test_grid(IVec3::splat(5));
        let calls = Rc::new(Cell::new(0u32));
        let order = Rc::new(Cell::new(0u32));

        let calls_a = Rc::clone(&calls);
        let order_a = Rc::clone(&order);
        grid.on_change(move || {
            calls_a.set(calls_a.get() + 1);
            // First observer sees the even counter value
            assert_eq!(order_a.get() % 2, 0);
            order_a.set(order_a.get() + 1);
        });

        let calls_b = Rc::clone(&calls);
        let order_b = Rc::clone(&order);
        grid.on_change(move || {
            calls_b.set(calls_b.get() + 1);
            assert_eq!(order_b.get() % 2, 1);
            order_b.set(order_b.get() + 1);
        });

        grid.clear();
        assert_eq!(calls.get(), 2);

        grid.regenerate(NoiseField::new(1, 0.1));
        assert_eq!(calls.get(), 4);

        grid.resize(IVec3::splat(6)).unwrap();
        assert_eq!(calls.get(), 6);

        grid.sculpt(IVec3::splat(2), &Brush::default(), SculptMode::Additive, None);
        assert_eq!(calls.get(), 8);

        // Plain set() does not notify
        grid.set(IVec3::splat(1), 0.5);
        assert_eq!(calls.get(), 8);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // 10x10x10 grid, scale 1.0, seed 0, frequency 0.1
        let mut grid = test_grid(IVec3::splat(10));

        grid.clear();
        assert!(grid.solid(IVec3::new(4, 0, 4)));
        assert_eq!(grid.get(IVec3::new(4, 1, 4)), 0.0);

        let brush = Brush {
            radius: 1.0,
            strength: 1.0,
        };
        grid.sculpt(IVec3::new(4, 0, 4), &brush, SculptMode::Additive, None);

        // The voxel above the floor gained material
        assert!(grid.solid(IVec3::new(4, 1, 4)));
        // A distant floor voxel is untouched
        assert_eq!(grid.get(IVec3::new(6, 0, 6)), 1.0);
    }
}
