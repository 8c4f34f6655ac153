pub mod chunk;
pub mod chunk_map;
pub mod streaming;
pub mod terrain;
pub mod visibility;

use std::io;
use std::sync::Arc;

use rayon::prelude::*;
use strata_core::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_LOD1_DISTANCE, DEFAULT_LOD2_DISTANCE};
use strata_core::{GridError, Material, PhysicsConfig};
use strata_mesh::Lod;
use strata_sim::{build_map, InitialLayers, MapKind, RuntimeMap, Stepper};

use streaming::StreamingPolicy;

pub use chunk::{Chunk, ChunkSettings, LayerKind, LayerMesh};
pub use chunk_map::ChunkMap;
pub use visibility::{Camera, LodBands};
pub use terrain::{HeightmapParams, TerrainGenerator};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("grid construction failed: {0}")]
    Grid(#[from] GridError),
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,
    #[error("chunk size {chunk_size} exceeds map size {map_size}")]
    ChunkTooLarge { chunk_size: usize, map_size: usize },
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("failed to start stepper thread: {0}")]
    Stepper(#[from] io::Error),
}

/// Chunking, meshing and LOD parameters of a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSettings {
    pub chunk_size: usize,
    pub world_scale: f32,
    pub height_scale: f32,
    pub lod1_distance: f32,
    pub lod2_distance: f32,
    pub normal_interval: u32,
    pub chunk_stride: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            world_scale: 1.0,
            height_scale: 1.0,
            lod1_distance: DEFAULT_LOD1_DISTANCE,
            lod2_distance: DEFAULT_LOD2_DISTANCE,
            normal_interval: 1,
            chunk_stride: 1,
        }
    }
}

impl WorldSettings {
    fn chunk_settings(&self) -> ChunkSettings {
        ChunkSettings {
            chunk_size: self.chunk_size,
            world_scale: self.world_scale,
            height_scale: self.height_scale,
            normal_interval: self.normal_interval,
        }
    }
}

/// What one call to [`World::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Chunks processed this tick under the round-robin schedule.
    pub scheduled: usize,
    /// Scheduled chunks that were visible and re-meshed.
    pub updated: usize,
    /// Scheduled chunks outside every LOD band.
    pub hidden: usize,
    /// Updated chunks per LOD.
    pub per_lod: [usize; 3],
    /// Simulation ticks completed since the previous frame.
    pub sim_ticks: u64,
}

/// Primary public struct for the strata-world crate.
/// Owns the grid, its chunk meshes and the optional background stepper.
pub struct World {
    map: Arc<dyn RuntimeMap>,
    chunks: ChunkMap,
    bands: LodBands,
    streaming: StreamingPolicy,
    settings: WorldSettings,
    stepper: Option<Stepper>,
}

impl World {
    /// Chunk an existing grid.
    pub fn new(map: Arc<dyn RuntimeMap>, settings: WorldSettings) -> Result<Self, WorldError> {
        let map_size = map.side().saturating_sub(1);
        if settings.chunk_size == 0 {
            return Err(WorldError::ZeroChunkSize);
        }
        if settings.chunk_size > map_size {
            return Err(WorldError::ChunkTooLarge {
                chunk_size: settings.chunk_size,
                map_size,
            });
        }

        let chunks = ChunkMap::build(map.as_ref(), &settings.chunk_settings());
        log::info!(
            "World: {:?} grid of side {}, {}x{} chunks of {} cells",
            map.kind(),
            map.side(),
            chunks.chunks_per_side(),
            chunks.chunks_per_side(),
            settings.chunk_size
        );

        Ok(Self {
            map,
            chunks,
            bands: LodBands::new(settings.lod1_distance, settings.lod2_distance),
            streaming: StreamingPolicy::new(settings.chunk_stride),
            settings,
            stepper: None,
        })
    }

    /// Build the grid from initial layers and chunk it.
    pub fn from_layers(
        kind: MapKind,
        side: usize,
        physics: PhysicsConfig,
        layers: InitialLayers<'_>,
        settings: WorldSettings,
    ) -> Result<Self, WorldError> {
        let map = build_map(kind, side, physics, layers)?;
        Self::new(map, settings)
    }

    /// Run the grid on a background thread. In synchronized mode each
    /// [`World::update`] releases exactly one simulation tick.
    pub fn start_stepper(&mut self, synchronized: bool) -> Result<(), WorldError> {
        if self.stepper.is_none() {
            self.stepper = Some(Stepper::spawn(Arc::clone(&self.map), synchronized)?);
        }
        Ok(())
    }

    pub fn stepper(&self) -> Option<&Stepper> {
        self.stepper.as_ref()
    }

    pub fn stop_stepper(&mut self) {
        if let Some(mut stepper) = self.stepper.take() {
            stepper.stop();
        }
    }

    /// Decide each scheduled chunk's LOD from the camera and re-mesh the
    /// visible ones in parallel.
    pub fn update(&mut self, camera: &Camera) -> FrameStats {
        let mut stats = FrameStats::default();
        if let Some(stepper) = self.stepper.as_mut() {
            stats.sim_ticks = stepper.lapses();
            if stepper.is_synchronized() {
                stepper.resume();
            }
        }

        let frustums = self.bands.frustums(camera);
        let phase = self.streaming.update();
        let streaming = &self.streaming;
        let map = self.map.as_ref();

        let outcomes: Vec<Option<Option<Lod>>> = self
            .chunks
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .map(|(i, chunk)| {
                if !streaming.is_scheduled(i, phase) {
                    return None;
                }
                let lod = frustums.classify(chunk.bounds());
                match lod {
                    Some(lod) => {
                        chunk.set_visible(true);
                        chunk.set_lod(lod);
                        chunk.update(map);
                    }
                    None => chunk.set_visible(false),
                }
                Some(lod)
            })
            .collect();

        for lod in outcomes.into_iter().flatten() {
            stats.scheduled += 1;
            match lod {
                Some(lod) => {
                    stats.updated += 1;
                    stats.per_lod[lod as usize] += 1;
                }
                None => stats.hidden += 1,
            }
        }
        log::debug!("World update: {stats:?}");
        stats
    }

    /// Add `amount` of `material` at a cell after checking its coordinates.
    pub fn add(&self, x: i32, y: i32, material: Material, amount: f32) -> Result<(), WorldError> {
        if !self.map.valid_coord(x, y) {
            return Err(WorldError::OutOfBounds { x, y });
        }
        self.map.add(x as usize, y as usize, material, amount);
        Ok(())
    }

    pub fn map(&self) -> &Arc<dyn RuntimeMap> {
        &self.map
    }

    pub fn chunk_map(&self) -> &ChunkMap {
        &self.chunks
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }
}
