//! Terracarve - interactive voxel terrain sculpting
//!
//! A procedurally generated 3D density grid that can be carved or built up
//! with a spherical brush, plus cube-based isosurface extraction to turn the
//! volume into a triangle mesh for display.

pub mod core;
pub mod math;
pub mod terrain;
pub mod voxel;
pub mod mesh;
pub mod sculpt;
