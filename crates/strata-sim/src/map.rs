use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_core::math::{grid_index, in_bounds, validate_layers};
use strata_core::{GridError, Material, PhysicsConfig};

use crate::cell_based::CellBasedMap;
use crate::fluid::FluidMap;
use crate::simple::SimpleMap;
use crate::store::SharedCell;

/// Which update engine a grid runs. Chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapKind {
    /// In-place local rules for sand, water and lava.
    #[default]
    CellBased,
    /// Double-buffered sand diffusion and water transfer.
    Simple,
    /// Velocity/density fluid solver driving the water layer.
    Fluid,
}

/// The contract every grid variant fulfils.
///
/// Shared between the stepper thread (which calls `map_update`) and the render
/// path (which reads cells), so every method takes `&self`.
pub trait RuntimeMap: Send + Sync {
    fn kind(&self) -> MapKind;

    /// Grid side length S; the grid holds S x S cells.
    fn side(&self) -> usize;

    fn physics(&self) -> &PhysicsConfig;

    /// Handle to the cell at `index` as readers currently see it.
    ///
    /// Panics on an out-of-range index; check [`RuntimeMap::valid_index`] first.
    fn cell_at_index(&self, index: usize) -> &SharedCell;

    /// Add `amount` (may be negative) of `material` at `(x, y)`.
    fn add(&self, x: usize, y: usize, material: Material, amount: f32);

    /// Advance one tick.
    fn map_update(&self);

    /// One pass of gentle water smoothing over the Moore neighborhood.
    fn simple_smooth(&self);

    fn valid_coord(&self, x: i32, y: i32) -> bool {
        in_bounds(x, y, self.side())
    }

    fn valid_index(&self, index: usize) -> bool {
        index < self.side() * self.side()
    }

    fn cell_at(&self, x: usize, y: usize) -> &SharedCell {
        self.cell_at_index(grid_index(x, y, self.side()))
    }

    fn value_at(&self, x: usize, y: usize, material: Material) -> f32 {
        self.cell_at(x, y).get(material)
    }

    fn whole_at(&self, x: usize, y: usize) -> f32 {
        self.cell_at(x, y).whole_height()
    }
}

/// Initial heights a grid is seeded from. Stone is mandatory.
#[derive(Debug, Clone, Copy)]
pub struct InitialLayers<'a> {
    pub stone: &'a [f32],
    pub sand: Option<&'a [f32]>,
    pub water: Option<&'a [f32]>,
}

impl<'a> InitialLayers<'a> {
    pub fn stone(stone: &'a [f32]) -> Self {
        Self {
            stone,
            sand: None,
            water: None,
        }
    }

    pub fn with_sand(mut self, sand: &'a [f32]) -> Self {
        self.sand = Some(sand);
        self
    }

    pub fn with_water(mut self, water: &'a [f32]) -> Self {
        self.water = Some(water);
        self
    }

    /// Check every supplied layer against an S x S grid.
    pub fn validate(&self, side: usize) -> Result<(), GridError> {
        let mut layers: Vec<(&'static str, &[f32])> = vec![("stone", self.stone)];
        if let Some(sand) = self.sand {
            layers.push(("sand", sand));
        }
        if let Some(water) = self.water {
            layers.push(("water", water));
        }
        validate_layers(side, &layers)
    }
}

/// Build a grid of the requested variant.
///
/// Fails before any tick runs if the layer lengths break the S x S contract.
pub fn build_map(
    kind: MapKind,
    side: usize,
    physics: PhysicsConfig,
    layers: InitialLayers<'_>,
) -> Result<Arc<dyn RuntimeMap>, GridError> {
    let map: Arc<dyn RuntimeMap> = match kind {
        MapKind::CellBased => Arc::new(CellBasedMap::new(side, physics, layers)?),
        MapKind::Simple => Arc::new(SimpleMap::new(side, physics, layers)?),
        MapKind::Fluid => Arc::new(FluidMap::new(side, physics, layers)?),
    };
    log::info!(
        "Built {:?} grid: {}x{} cells, kernel {:?}",
        kind,
        side,
        side,
        map.physics().kernel
    );
    Ok(map)
}
