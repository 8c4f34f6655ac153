//! The bundled default terrain session.

use crate::loader::{load_config_from_str, LoadError, TerrainConfig};

pub const DEFAULT_TERRAIN_RON: &str = include_str!("../../../data/terrain.ron");

pub fn default_config() -> Result<TerrainConfig, LoadError> {
    load_config_from_str(DEFAULT_TERRAIN_RON)
}
