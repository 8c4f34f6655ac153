use glam::Vec2;
use strata_core::math::grid_index;
use strata_core::PhysicsConfig;

use crate::passes::{lowest_neighbor, transfer};
use crate::store::CellStore;

/// Move water toward the single lowest neighbor.
///
/// A splash moves a fraction of the whole column when the center's solid floor
/// already sits above the neighbor's surface; otherwise a viscosity transfer
/// moves a fraction of the surface height difference.
pub fn apply(cells: &CellStore, x: usize, y: usize, physics: &PhysicsConfig) {
    let center = cells.get(grid_index(x, y, cells.side()));

    let water = center.water.load();
    if water <= 0.0 {
        center.water.store(0.0);
        return;
    }

    let litho = center.litho_height();
    let total = litho + water;
    let Some(lowest) = lowest_neighbor(cells, x, y, physics.kernel.offsets(), total, |c| {
        c.litho_height() + c.water.load()
    }) else {
        center.set_water_flow(Vec2::ZERO);
        return;
    };

    let height_diff = total - lowest.total;
    center.set_water_flow(lowest.offset.as_vec2() * height_diff);

    let amount = if litho > lowest.total {
        water * physics.water_splash_ratio
    } else {
        height_diff * physics.water_viscosity
    };
    transfer(&center.water, &cells.get(lowest.index).water, amount);
}
