use strata_config::TerrainConfig;
use strata_core::Material;
use strata_sim::MapKind;
use strata_world::{World, WorldError};

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    pub map_kind: MapKind,
    pub map_size: usize,
    pub chunk_size: usize,
    pub seed: u64,
    /// Water columns dropped on the terrain before timing starts.
    pub water_sources: u32,
    /// Lava columns dropped on the terrain before timing starts.
    pub lava_sources: u32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
}

impl SceneConfig {
    /// Session config for this scene, everything else at defaults.
    pub fn terrain_config(&self) -> TerrainConfig {
        TerrainConfig {
            map_size: self.map_size,
            map_kind: self.map_kind,
            chunk_size: self.chunk_size,
            seed: self.seed,
            ..TerrainConfig::default()
        }
    }
}

/// Camera hovering over a corner of the map, looking at its center.
fn corner_camera(map_size: usize) -> ([f32; 3], [f32; 3]) {
    let c = map_size as f32 / 2.0;
    ([-20.0, 40.0, -20.0], [c, 0.0, c])
}

fn scene(
    name: &'static str,
    map_kind: MapKind,
    map_size: usize,
    water_sources: u32,
    lava_sources: u32,
) -> SceneConfig {
    let (camera_position, camera_target) = corner_camera(map_size);
    SceneConfig {
        name,
        map_kind,
        map_size,
        chunk_size: 32,
        seed: 42,
        water_sources,
        lava_sources,
        camera_position,
        camera_target,
    }
}

/// Return the standard suite of benchmark scenes.
pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        scene("cell-128", MapKind::CellBased, 128, 16, 4),
        scene("cell-256", MapKind::CellBased, 256, 64, 16),
        scene("cell-512", MapKind::CellBased, 512, 256, 64),
        scene("simple-256", MapKind::Simple, 256, 64, 0),
        scene("fluid-128", MapKind::Fluid, 128, 16, 0),
    ]
}

/// Deterministic interior cell for source number `i`.
fn source_cell(i: u32, salt: u32, side: usize) -> (i32, i32) {
    let interior = (side - 2) as u32;
    let hash = i.wrapping_mul(2_654_435_761) ^ salt.wrapping_mul(40_503);
    let x = 1 + hash % interior;
    let y = 1 + (hash / interior) % interior;
    (x as i32, y as i32)
}

/// Drop the scene's water and lava columns onto the world.
pub fn seed_fluids(world: &World, config: &SceneConfig) -> Result<(), WorldError> {
    let side = world.map().side();
    for i in 0..config.water_sources {
        let (x, y) = source_cell(i, 1, side);
        world.add(x, y, Material::Water, 5.0)?;
    }
    for i in 0..config.lava_sources {
        let (x, y) = source_cell(i, 2, side);
        world.add(x, y, Material::Lava, 3.0)?;
    }
    Ok(())
}
