//! Shared constants for the simulation and meshing crates.

/// Water or lava thinner than this is treated as absent when meshing.
pub const VISIBLE_EPSILON: f32 = 0.01;

/// Number of lowest-neighbor passes the lava rule runs per cell per tick.
pub const LAVA_FLOW_PASSES: usize = 2;

/// Transfer factor for the one-shot water smoothing pass.
pub const SMOOTH_STIFFNESS: f32 = 0.001;

/// Smallest grid that still has an interior cell.
pub const MIN_GRID_SIDE: usize = 3;

/// Default chunk side length in cells.
pub const DEFAULT_CHUNK_SIZE: usize = 32;

/// Default distance at which chunks drop to LOD1.
pub const DEFAULT_LOD1_DISTANCE: f32 = 200.0;

/// Default distance at which chunks drop to LOD2.
pub const DEFAULT_LOD2_DISTANCE: f32 = 300.0;
