use strata_core::constants::MIN_GRID_SIDE;
use thiserror::Error;

use crate::loader::TerrainConfig;

/// Degenerate but usable configuration values. None of these stop a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigWarning {
    #[error("map_size {map_size} is too small to have interior cells")]
    MapTooSmall { map_size: usize },
    #[error("chunk_size {chunk_size} does not divide map_size {map_size}; trailing cells are not meshed")]
    ChunkSizeNotDividing { chunk_size: usize, map_size: usize },
    #[error("chunk_size {chunk_size} is not a multiple of 4; coarse LODs skip partial quads")]
    ChunkSizeNotStrideAligned { chunk_size: usize },
    #[error("'{name}' = {value} lies outside [0, 1]")]
    RatioOutOfRange { name: &'static str, value: f32 },
    #[error("'{name}' = {value} should be positive")]
    NotPositive { name: &'static str, value: f32 },
    #[error("lod1_distance {lod1} is not below lod2_distance {lod2}; the LOD1 band is empty")]
    LodOrder { lod1: f32, lod2: f32 },
}

/// Check a config for degenerate values and log each one.
pub fn validate_config(config: &TerrainConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.side() < MIN_GRID_SIDE {
        warnings.push(ConfigWarning::MapTooSmall {
            map_size: config.map_size,
        });
    }
    if config.chunk_size > 0 && config.map_size % config.chunk_size != 0 {
        warnings.push(ConfigWarning::ChunkSizeNotDividing {
            chunk_size: config.chunk_size,
            map_size: config.map_size,
        });
    }
    if config.chunk_size % 4 != 0 {
        warnings.push(ConfigWarning::ChunkSizeNotStrideAligned {
            chunk_size: config.chunk_size,
        });
    }

    let physics = &config.physics;
    let ratios = [
        ("sand_slope_ratio", physics.sand_slope_ratio),
        ("water_viscosity", physics.water_viscosity),
        ("water_splash_ratio", physics.water_splash_ratio),
        ("lava_viscosity", physics.lava_viscosity),
        ("lava_splash_ratio", physics.lava_splash_ratio),
    ];
    for (name, value) in ratios {
        if !(0.0..=1.0).contains(&value) {
            warnings.push(ConfigWarning::RatioOutOfRange { name, value });
        }
    }

    let positives = [
        ("world_scale", config.world_scale),
        ("height_scale", config.height_scale),
        ("noise_scale", config.noise_scale),
        ("dt", physics.dt),
    ];
    for (name, value) in positives {
        if value <= 0.0 || value.is_nan() {
            warnings.push(ConfigWarning::NotPositive { name, value });
        }
    }

    if config.lod1_distance >= config.lod2_distance {
        warnings.push(ConfigWarning::LodOrder {
            lod1: config.lod1_distance,
            lod2: config.lod2_distance,
        });
    }

    for warning in &warnings {
        log::warn!("Terrain config: {warning}");
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::PhysicsConfig;

    #[test]
    fn test_default_config_is_clean() {
        assert!(validate_config(&TerrainConfig::default()).is_empty());
    }

    #[test]
    fn test_non_dividing_chunk_size_warns() {
        let config = TerrainConfig {
            map_size: 255,
            chunk_size: 10,
            ..TerrainConfig::default()
        };
        let warnings = validate_config(&config);
        assert!(warnings.contains(&ConfigWarning::ChunkSizeNotDividing {
            chunk_size: 10,
            map_size: 255
        }));
        assert!(warnings.contains(&ConfigWarning::ChunkSizeNotStrideAligned { chunk_size: 10 }));
    }

    #[test]
    fn test_ratio_and_lod_warnings() {
        let config = TerrainConfig {
            lod1_distance: 300.0,
            lod2_distance: 200.0,
            physics: PhysicsConfig {
                water_splash_ratio: 1.5,
                ..PhysicsConfig::default()
            },
            ..TerrainConfig::default()
        };
        let warnings = validate_config(&config);
        assert_eq!(warnings.len(), 2, "got {warnings:?}");
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ConfigWarning::RatioOutOfRange { name: "water_splash_ratio", .. })));
        assert!(warnings.iter().any(|w| matches!(w, ConfigWarning::LodOrder { .. })));
    }

    #[test]
    fn test_tiny_map_warns() {
        let config = TerrainConfig {
            map_size: 1,
            chunk_size: 1,
            ..TerrainConfig::default()
        };
        let warnings = validate_config(&config);
        assert!(warnings.contains(&ConfigWarning::MapTooSmall { map_size: 1 }));
    }
}
