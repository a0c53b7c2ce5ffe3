//! Voxel density grid and sculpting

pub mod grid;
pub mod brush;

pub use grid::{SOLID_THRESHOLD, VoxelGrid};
pub use brush::{Brush, DepthGate, SculptMode};
