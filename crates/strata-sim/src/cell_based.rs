use strata_core::{GridError, Material, PhysicsConfig};

use crate::map::{InitialLayers, MapKind, RuntimeMap};
use crate::passes::{lava, sand, smooth, water};
use crate::store::{CellStore, SharedCell};

/// Primary engine: sand, water and lava rules applied in place.
///
/// Cells are visited row by row (`y` outer, `x` inner) over the interior
/// `[1, S-2]`. Because updates are in place, a cell sees the already-updated
/// state of the neighbors visited before it in the same tick.
pub struct CellBasedMap {
    cells: CellStore,
    physics: PhysicsConfig,
}

impl CellBasedMap {
    pub fn new(side: usize, physics: PhysicsConfig, layers: InitialLayers<'_>) -> Result<Self, GridError> {
        layers.validate(side)?;
        Ok(Self {
            cells: CellStore::from_layers(side, layers.stone, layers.sand, layers.water),
            physics,
        })
    }
}

impl RuntimeMap for CellBasedMap {
    fn kind(&self) -> MapKind {
        MapKind::CellBased
    }

    fn side(&self) -> usize {
        self.cells.side()
    }

    fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    fn cell_at_index(&self, index: usize) -> &SharedCell {
        self.cells.get(index)
    }

    /// Clamps immediately: the height never drops below zero.
    fn add(&self, x: usize, y: usize, material: Material, amount: f32) {
        self.cells
            .at(x, y)
            .field(material)
            .update(|h| (h + amount).max(0.0));
    }

    fn map_update(&self) {
        let side = self.cells.side();
        for y in 1..side - 1 {
            for x in 1..side - 1 {
                sand::apply(&self.cells, x, y, &self.physics);
                water::apply(&self.cells, x, y, &self.physics);
                lava::apply(&self.cells, x, y, &self.physics);
            }
        }
    }

    fn simple_smooth(&self) {
        smooth::smooth_water(&self.cells);
    }
}
