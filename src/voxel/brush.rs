//! Sculpting brush parameters and the depth gate for ray-driven edits

use crate::core::types::Vec3;

/// Whether a sculpt deposits or removes material
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SculptMode {
    /// Deposit material (raise density)
    Additive,
    /// Carve material away (lower density)
    Destructive,
}

/// Spherical sculpting brush
#[derive(Clone, Copy, Debug)]
pub struct Brush {
    /// Radius in voxels
    pub radius: f32,
    /// Density added or removed per application
    pub strength: f32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            radius: 3.0,
            strength: 1.0,
        }
    }
}

/// Restricts a ray-driven sculpt to voxels on the correct side of the hit
/// point: carving cannot punch through to geometry behind the aim point,
/// and deposits cannot stack toward the viewer.
#[derive(Clone, Copy, Debug)]
pub struct DepthGate {
    /// Viewer position in grid index space
    pub camera: Vec3,
    /// Distance from the viewer to the accepted hit voxel
    pub hit_distance: f32,
    /// Tolerance in voxels around the hit distance. Tunable, not a contract.
    pub slack: f32,
}

impl DepthGate {
    pub const DEFAULT_SLACK: f32 = 0.5;

    /// Gate anchored at the viewer with the default slack
    pub fn new(camera: Vec3, hit_distance: f32) -> Self {
        Self {
            camera,
            hit_distance,
            slack: Self::DEFAULT_SLACK,
        }
    }

    /// Whether the voxel at `pos` may be edited in the given mode
    pub fn allows(&self, mode: SculptMode, pos: Vec3) -> bool {
        let dist = (pos - self.camera).length();
        match mode {
            SculptMode::Destructive => dist <= self.hit_distance + self.slack,
            SculptMode::Additive => dist >= self.hit_distance - self.slack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_default() {
        let brush = Brush::default();
        assert!(brush.radius > 0.0);
        assert!(brush.strength > 0.0);
    }

    #[test]
    fn test_destructive_gate_blocks_far_voxels() {
        // Viewer at origin aiming at a voxel 10 units away
        let gate = DepthGate::new(Vec3::ZERO, 10.0);
        assert!(gate.allows(SculptMode::Destructive, Vec3::new(9.0, 0.0, 0.0)));
        assert!(gate.allows(SculptMode::Destructive, Vec3::new(10.0, 0.0, 0.0)));
        // Beyond the hit point plus slack: would carve through a wall
        assert!(!gate.allows(SculptMode::Destructive, Vec3::new(12.0, 0.0, 0.0)));
    }

    #[test]
    fn test_additive_gate_blocks_near_voxels() {
        let gate = DepthGate::new(Vec3::ZERO, 10.0);
        assert!(gate.allows(SculptMode::Additive, Vec3::new(10.0, 0.0, 0.0)));
        assert!(gate.allows(SculptMode::Additive, Vec3::new(12.0, 0.0, 0.0)));
        // Closer than the hit point minus slack: would float toward the viewer
        assert!(!gate.allows(SculptMode::Additive, Vec3::new(8.0, 0.0, 0.0)));
    }
}
