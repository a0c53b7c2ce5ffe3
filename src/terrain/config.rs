//! Terrain configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec3, Result};
use crate::terrain::NoiseField;
use crate::voxel::{Brush, VoxelGrid};

/// Parameters describing a sculptable terrain.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// config file only needs the values it overrides. Dimension validation
/// happens at [`TerrainConfig::build_grid`], not at parse time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Grid dimensions in voxels (width, height, depth)
    pub dims: [i32; 3],
    /// Distance between voxels when positioned in world space
    pub scale: f32,
    /// Noise seed
    pub seed: u32,
    /// Noise frequency applied to sample coordinates, typically (0, 1]
    pub frequency: f32,
    /// Density value the extracted surface sits at
    pub iso_level: f32,
    /// Sculpting brush radius in voxels
    pub brush_radius: f32,
    /// Density added or removed per sculpt
    pub brush_strength: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            dims: [10, 10, 10],
            scale: 1.0,
            seed: 0,
            frequency: 0.1,
            iso_level: 0.5,
            brush_radius: 3.0,
            brush_strength: 1.0,
        }
    }
}

impl TerrainConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Noise field described by the seed and frequency
    pub fn noise(&self) -> NoiseField {
        NoiseField::new(self.seed, self.frequency)
    }

    /// Sculpting brush described by the radius and strength
    pub fn brush(&self) -> Brush {
        Brush {
            radius: self.brush_radius,
            strength: self.brush_strength,
        }
    }

    /// Build the voxel grid this configuration describes.
    ///
    /// Fails with [`Error::InvalidDimensions`](crate::core::Error) when any
    /// axis is below 1.
    pub fn build_grid(&self) -> Result<VoxelGrid> {
        VoxelGrid::new(IVec3::from_array(self.dims), self.scale, self.noise())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_builds() {
        let config = TerrainConfig::default();
        let grid = config.build_grid().unwrap();
        assert_eq!(grid.dims(), IVec3::splat(10));
        assert_eq!(grid.scale(), 1.0);
    }

    #[test]
    fn test_invalid_dims_rejected() {
        let config = TerrainConfig {
            dims: [10, 0, 10],
            ..Default::default()
        };
        assert!(config.build_grid().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = TerrainConfig {
            dims: [16, 8, 16],
            seed: 77,
            frequency: 0.05,
            ..Default::default()
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&config).unwrap().as_bytes())
            .unwrap();

        let loaded = TerrainConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded.dims, [16, 8, 16]);
        assert_eq!(loaded.seed, 77);
        assert_eq!(loaded.frequency, 0.05);
        assert_eq!(loaded.iso_level, config.iso_level);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let partial: TerrainConfig = serde_json::from_str(r#"{"seed": 3}"#).unwrap();
        assert_eq!(partial.seed, 3);
        assert_eq!(partial.dims, [10, 10, 10]);
        assert_eq!(partial.brush_radius, 3.0);
    }
}
