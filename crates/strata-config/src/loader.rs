use serde::{Deserialize, Serialize};
use strata_core::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_LOD1_DISTANCE, DEFAULT_LOD2_DISTANCE};
use strata_core::PhysicsConfig;
use strata_sim::MapKind;
use strata_world::{HeightmapParams, WorldSettings};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse terrain config RON: {0}")]
    ConfigParseError(String),
}

/// Everything needed to start a terrain session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Cells per side minus one; the grid holds `(map_size + 1)^2` cells.
    pub map_size: usize,
    pub map_kind: MapKind,
    pub physics: PhysicsConfig,
    /// Heightmap noise seed.
    pub seed: u64,
    /// Cells per period of the base noise octave.
    pub noise_scale: f32,
    /// Tallest generated stone height.
    pub elevation: f32,
    /// Quads per chunk side. Should divide `map_size`.
    pub chunk_size: usize,
    pub world_scale: f32,
    pub height_scale: f32,
    pub lod1_distance: f32,
    pub lod2_distance: f32,
    pub normal_interval: u32,
    pub chunk_stride: usize,
    /// One simulation tick per rendered frame when true.
    pub synchronized: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            map_size: 256,
            map_kind: MapKind::CellBased,
            physics: PhysicsConfig::default(),
            seed: 42,
            noise_scale: 20.0,
            elevation: 10.0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            world_scale: 1.0,
            height_scale: 1.0,
            lod1_distance: DEFAULT_LOD1_DISTANCE,
            lod2_distance: DEFAULT_LOD2_DISTANCE,
            normal_interval: 1,
            chunk_stride: 1,
            synchronized: true,
        }
    }
}

impl TerrainConfig {
    /// Grid side length S.
    pub fn side(&self) -> usize {
        self.map_size + 1
    }

    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            chunk_size: self.chunk_size,
            world_scale: self.world_scale,
            height_scale: self.height_scale,
            lod1_distance: self.lod1_distance,
            lod2_distance: self.lod2_distance,
            normal_interval: self.normal_interval,
            chunk_stride: self.chunk_stride,
        }
    }

    pub fn heightmap_params(&self) -> HeightmapParams {
        HeightmapParams {
            scale: self.noise_scale,
            elevation: self.elevation,
            ..HeightmapParams::default()
        }
    }
}

/// Parse a terrain config RON string.
pub fn load_config_from_str(ron_str: &str) -> Result<TerrainConfig, LoadError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::ConfigParseError(e.to_string()))
}
