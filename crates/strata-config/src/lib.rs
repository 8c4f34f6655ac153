pub mod defaults;
pub mod loader;
pub mod validator;

use strata_sim::InitialLayers;
use strata_world::{TerrainGenerator, World, WorldError};

pub use loader::{load_config_from_str, LoadError, TerrainConfig};
pub use validator::{validate_config, ConfigWarning};

/// Generate the stone heightmap a config describes and build its world.
pub fn build_world(config: &TerrainConfig) -> Result<World, WorldError> {
    validate_config(config);
    let side = config.side();
    let stone = TerrainGenerator::new(config.seed).heightmap(side, &config.heightmap_params());
    World::from_layers(
        config.map_kind,
        side,
        config.physics.clone(),
        InitialLayers::stone(&stone),
        config.world_settings(),
    )
}

/// Build a config's world and start its simulation thread in the configured
/// stepping mode.
pub fn start_session(config: &TerrainConfig) -> Result<World, WorldError> {
    let mut world = build_world(config)?;
    world.start_stepper(config.synchronized)?;
    Ok(world)
}
