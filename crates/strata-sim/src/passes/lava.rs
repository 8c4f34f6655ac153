use glam::Vec2;
use strata_core::constants::LAVA_FLOW_PASSES;
use strata_core::math::grid_index;
use strata_core::PhysicsConfig;

use crate::passes::{lowest_neighbor, transfer};
use crate::store::CellStore;

/// Cool, react with water, solidify sand, then flow like water.
pub fn apply(cells: &CellStore, x: usize, y: usize, physics: &PhysicsConfig) {
    let center = cells.get(grid_index(x, y, cells.side()));

    let mut lava = center.lava.load() - physics.lava_cooling;
    if lava <= 0.0 {
        center.lava.store(0.0);
        return;
    }

    // Water and lava quench each other; the smaller amount turns to stone.
    let water = center.water.load();
    if water > 0.0 {
        let reacted = water.min(lava);
        center.water.store(water - reacted);
        center.stone.update(|s| s + reacted);
        lava -= reacted;
        if lava <= 0.0 {
            center.lava.store(0.0);
            return;
        }
    }
    center.lava.store(lava);

    let sand = center.sand.load();
    if sand > 0.0 {
        center.stone.update(|s| s + sand);
        center.sand.store(0.0);
    }

    for pass in 0..LAVA_FLOW_PASSES {
        let lava = center.lava.load();
        if lava <= 0.0 {
            break;
        }
        let litho = center.litho_height();
        let total = litho + lava;
        let Some(lowest) = lowest_neighbor(cells, x, y, physics.kernel.offsets(), total, |c| {
            c.litho_height() + c.lava.load()
        }) else {
            if pass == 0 {
                center.set_lava_flow(Vec2::ZERO);
            }
            break;
        };

        let height_diff = total - lowest.total;
        center.set_lava_flow(lowest.offset.as_vec2() * height_diff);
        let amount = if litho > lowest.total {
            lava * physics.lava_splash_ratio
        } else {
            height_diff * physics.lava_viscosity
        };
        transfer(&center.lava, &cells.get(lowest.index).lava, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Material;

    fn no_cooling() -> PhysicsConfig {
        PhysicsConfig {
            lava_cooling: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_cooling_to_zero() {
        let cells = CellStore::from_layers(3, &[1.0; 9], None, None);
        cells.get(4).lava.store(0.5);
        let physics = PhysicsConfig {
            lava_cooling: 1.0,
            ..Default::default()
        };
        apply(&cells, 1, 1, &physics);
        assert_eq!(cells.get(4).lava.load(), 0.0);
        assert_eq!(cells.total(Material::Lava), 0.0);
    }

    #[test]
    fn test_more_water_than_lava() {
        let cells = CellStore::from_layers(3, &[1.0; 9], None, None);
        cells.get(4).lava.store(1.0);
        cells.get(4).water.store(3.0);
        apply(&cells, 1, 1, &no_cooling());
        let c = cells.get(4).load();
        assert_eq!(c.lava, 0.0, "lava fully quenched");
        assert_eq!(c.water, 2.0, "water reduced by the lava amount");
        assert_eq!(c.stone, 2.0, "quenched lava became stone");
    }

    #[test]
    fn test_more_lava_than_water() {
        let cells = CellStore::from_layers(3, &[5.0; 9], None, None);
        cells.get(4).stone.store(0.0);
        cells.get(4).lava.store(3.0);
        cells.get(4).water.store(1.0);
        apply(&cells, 1, 1, &no_cooling());
        let c = cells.get(4).load();
        assert_eq!(c.water, 0.0, "water fully consumed");
        assert_eq!(c.stone, 1.0);
        assert_eq!(c.lava, 2.0, "lava reduced by the water amount, no lower neighbor to flow to");
    }

    #[test]
    fn test_sand_solidifies_under_lava() {
        let cells = CellStore::from_layers(3, &[5.0; 9], None, None);
        cells.get(4).stone.store(1.0);
        cells.get(4).sand.store(0.5);
        cells.get(4).lava.store(1.0);
        apply(&cells, 1, 1, &no_cooling());
        let c = cells.get(4).load();
        assert_eq!(c.sand, 0.0);
        assert_eq!(c.stone, 1.5);
    }

    #[test]
    fn test_lava_flows_two_passes() {
        let cells = CellStore::from_layers(3, &[1.0; 9], None, None);
        cells.get(4).lava.store(4.0);
        let physics = PhysicsConfig {
            lava_cooling: 0.0,
            lava_viscosity: 0.1,
            ..Default::default()
        };
        apply(&cells, 1, 1, &physics);
        // First pass: diff 4.0 into the first neighbor.
        assert!((cells.get(1).lava.load() - 0.4).abs() < 1e-6);
        // Second pass: the next untouched neighbor is now the lowest.
        assert!((cells.get(3).lava.load() - 0.36).abs() < 1e-6);
        let total = cells.total(Material::Lava);
        assert!((total - 4.0).abs() < 1e-5, "lava conserved without cooling");
    }
}
