//! Raycast hit-testing for sculpt placement.
//!
//! Walks a viewer ray through the grid in unit steps until a voxel passes
//! the mode's occupancy threshold, then applies the brush there with a
//! depth gate anchored at the ray origin.

use log::debug;

use crate::core::types::Vec3;
use crate::math::Ray;
use crate::voxel::{Brush, DepthGate, SculptMode, VoxelGrid};

/// Record of the most recent cast, in grid index space
#[derive(Clone, Copy, Debug)]
pub struct CastRecord {
    pub origin: Vec3,
    pub end: Vec3,
    pub hit: bool,
    pub mode: SculptMode,
}

/// Casts sculpting rays into a [`VoxelGrid`].
///
/// The acceptance thresholds differ by mode: a destructive ray stops at the
/// first voxel holding any material, while an additive ray keeps going
/// until the ground is confidently solid, so new material lands on a
/// surface rather than inside a half-filled boundary cell. All fields are
/// tunable configuration, not contract.
pub struct SculptProbe {
    /// Hard cap on ray steps; exhausting it is a normal miss
    pub max_steps: usize,
    /// Density above which a destructive ray accepts a voxel
    pub carve_threshold: f32,
    /// Density above which an additive ray accepts a voxel
    pub fill_threshold: f32,
    /// Depth-gate slack handed to accepted sculpts
    pub gate_slack: f32,
    last_cast: Option<CastRecord>,
}

impl Default for SculptProbe {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            carve_threshold: 0.0,
            fill_threshold: 0.7,
            gate_slack: DepthGate::DEFAULT_SLACK,
            last_cast: None,
        }
    }
}

impl SculptProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent cast, for debug visualization
    pub fn last_cast(&self) -> Option<&CastRecord> {
        self.last_cast.as_ref()
    }

    /// Cast a sculpting ray and, on a hit, sculpt the grid at the hit
    /// voxel. Returns whether any terrain was hit.
    ///
    /// The ray origin is in world space and is divided by the grid's
    /// visual scale to reach index space; the direction is unitless.
    /// Running out of steps without a hit is a normal `false`, not an
    /// error.
    pub fn cast(
        &mut self,
        grid: &mut VoxelGrid,
        ray: Ray,
        mode: SculptMode,
        brush: &Brush,
    ) -> bool {
        let origin = ray.origin / grid.scale();
        let ray = Ray::new(origin, ray.direction);

        // A ray that never enters the grid cannot hit anything
        let Some((_, t_far)) = ray.intersects_aabb(&grid.bounds()) else {
            debug!("Cast from {origin} missed the grid entirely");
            self.last_cast = Some(CastRecord {
                origin,
                end: origin,
                hit: false,
                mode,
            });
            return false;
        };

        let threshold = match mode {
            SculptMode::Destructive => self.carve_threshold,
            SculptMode::Additive => self.fill_threshold,
        };

        let mut pos = origin;
        for step in 0..self.max_steps {
            let voxel = pos.round().as_ivec3();
            if grid.get(voxel) > threshold {
                let mut gate = DepthGate::new(origin, (voxel.as_vec3() - origin).length());
                gate.slack = self.gate_slack;
                let changed = grid.sculpt(voxel, brush, mode, Some(&gate));
                debug!("Cast {mode:?} hit {voxel} after {step} steps, changed {changed} voxels");
                self.last_cast = Some(CastRecord {
                    origin,
                    end: pos,
                    hit: true,
                    mode,
                });
                return true;
            }
            // Past the far side of the grid nothing can be hit; stop
            // before burning the rest of the step budget
            if step as f32 > t_far + 1.0 {
                break;
            }
            pos += ray.direction;
        }

        debug!("Cast {mode:?} from {origin} exhausted its budget");
        self.last_cast = Some(CastRecord {
            origin,
            end: pos,
            hit: false,
            mode,
        });
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::terrain::NoiseField;

    fn terrain_grid() -> VoxelGrid {
        VoxelGrid::new(IVec3::splat(10), 1.0, NoiseField::new(0, 0.1)).unwrap()
    }

    fn total_density(grid: &VoxelGrid) -> f32 {
        grid.density_field().iter().sum()
    }

    #[test]
    fn test_downward_carve_hits_terrain() {
        let mut grid = terrain_grid();
        let before = total_density(&grid);

        let mut probe = SculptProbe::new();
        let ray = Ray::new(Vec3::new(5.0, 20.0, 5.0), Vec3::NEG_Y);
        let hit = probe.cast(&mut grid, ray, SculptMode::Destructive, &Brush::default());

        assert!(hit);
        // The hit voxel held material and sits inside its own gate, so the
        // carve must remove something
        assert!(total_density(&grid) < before);
        let record = probe.last_cast().unwrap();
        assert!(record.hit);
        assert_eq!(record.mode, SculptMode::Destructive);
    }

    #[test]
    fn test_skyward_ray_misses() {
        let mut grid = terrain_grid();
        let before = grid.density_field().to_vec();

        let mut probe = SculptProbe::new();
        let ray = Ray::new(Vec3::new(5.0, 20.0, 5.0), Vec3::Y);
        let hit = probe.cast(&mut grid, ray, SculptMode::Destructive, &Brush::default());

        assert!(!hit);
        assert!(!probe.last_cast().unwrap().hit);
        assert_eq!(grid.density_field(), &before[..]);
    }

    #[test]
    fn test_cast_is_deterministic() {
        let ray = Ray::new(Vec3::new(2.0, 15.0, 3.0), Vec3::new(0.2, -1.0, 0.1));

        let mut results = Vec::new();
        for _ in 0..2 {
            let mut grid = terrain_grid();
            let mut probe = SculptProbe::new();
            let hit = probe.cast(&mut grid, ray, SculptMode::Destructive, &Brush::default());
            results.push((hit, probe.last_cast().unwrap().end, grid.density_field().to_vec()));
        }

        assert_eq!(results[0].0, results[1].0);
        assert_eq!(results[0].1, results[1].1);
        assert_eq!(results[0].2, results[1].2);
    }

    #[test]
    fn test_additive_needs_confident_ground() {
        let mut grid = terrain_grid();
        grid.clear();
        // A lone half-filled voxel floating above the floor
        grid.set(IVec3::new(5, 5, 5), 0.5);

        let mut probe = SculptProbe::new();
        // Widen the gate so the brush may build upward from the hit layer
        probe.gate_slack = 1.5;
        let ray = Ray::new(Vec3::new(5.0, 9.0, 5.0), Vec3::NEG_Y);

        // Additive skips the half-filled cell and lands on the solid floor
        let hit = probe.cast(&mut grid, ray, SculptMode::Additive, &Brush { radius: 1.0, strength: 1.0 });
        assert!(hit);
        assert_eq!(grid.get(IVec3::new(5, 6, 5)), 0.0, "half-filled cell must not attract material");
        assert!(grid.solid(IVec3::new(5, 1, 5)), "material lands on the solid floor");
    }

    #[test]
    fn test_destructive_accepts_any_material() {
        let mut grid = terrain_grid();
        grid.clear();
        grid.set(IVec3::new(5, 5, 5), 0.3);

        let mut probe = SculptProbe::new();
        let ray = Ray::new(Vec3::new(5.0, 9.0, 5.0), Vec3::NEG_Y);

        let hit = probe.cast(&mut grid, ray, SculptMode::Destructive, &Brush { radius: 1.0, strength: 1.0 });
        assert!(hit);
        assert_eq!(grid.get(IVec3::new(5, 5, 5)), 0.0, "the faint voxel should be carved");
    }

    #[test]
    fn test_world_scale_origin_conversion() {
        let mut grid = terrain_grid();
        grid.set_scale(2.0);
        grid.clear();

        let mut probe = SculptProbe::new();
        // World origin (10, 10, 10) is index (5, 5, 5); aiming straight
        // down hits the floor at (5, 0, 5)
        let ray = Ray::new(Vec3::splat(10.0), Vec3::NEG_Y);
        let hit = probe.cast(&mut grid, ray, SculptMode::Destructive, &Brush { radius: 1.0, strength: 1.0 });

        assert!(hit);
        assert_eq!(grid.get(IVec3::new(5, 0, 5)), 0.0);
        // The floor farther out is untouched
        assert!(grid.solid(IVec3::new(8, 0, 8)));
    }
}
