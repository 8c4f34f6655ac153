use strata_core::math::{grid_index, offset_index};
use strata_core::PhysicsConfig;

use crate::passes::transfer;
use crate::store::CellStore;

/// Talus relaxation: sand slides toward every lower kernel neighbor.
///
/// Each transfer updates both cells before the next neighbor is examined, so
/// later neighbors see the already-reduced center.
pub fn apply(cells: &CellStore, x: usize, y: usize, physics: &PhysicsConfig) {
    let side = cells.side();
    let center = cells.get(grid_index(x, y, side));

    let sand = center.sand.load();
    if sand < 0.0 {
        center.sand.store(0.0);
        return;
    }
    if sand < physics.sand_stiffness {
        return;
    }

    for &offset in physics.kernel.offsets() {
        let sand = center.sand.load();
        if sand < physics.sand_stiffness {
            break;
        }
        let other = cells.get(offset_index(x, y, offset, side));
        let center_height = center.stone.load() + sand;
        let other_height = other.litho_height();
        if other_height >= center_height {
            continue;
        }
        let delta = (center_height - other_height) * physics.sand_slope_ratio;
        transfer(&center.sand, &other.sand, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> PhysicsConfig {
        PhysicsConfig {
            sand_slope_ratio: 0.1,
            sand_stiffness: 0.001,
            ..Default::default()
        }
    }

    #[test]
    fn test_sand_below_stiffness_stays() {
        let cells = CellStore::from_layers(3, &[1.0; 9], None, None);
        cells.get(4).sand.store(0.0005);
        apply(&cells, 1, 1, &physics());
        assert_eq!(cells.get(4).sand.load(), 0.0005);
        assert_eq!(cells.total(strata_core::Material::Sand), 0.0005f32 as f64);
    }

    #[test]
    fn test_negative_sand_clamped() {
        let cells = CellStore::from_layers(3, &[1.0; 9], None, None);
        cells.get(4).sand.store(-1.0);
        apply(&cells, 1, 1, &physics());
        assert_eq!(cells.get(4).sand.load(), 0.0);
    }

    #[test]
    fn test_sand_slides_to_lower_neighbors() {
        let cells = CellStore::from_layers(3, &[1.0; 9], None, None);
        cells.get(4).sand.store(1.0);
        apply(&cells, 1, 1, &physics());

        let center = cells.get(4).sand.load();
        assert!(center < 1.0, "center should lose sand");
        // First neighbor sees the full 1.0 difference.
        assert!((cells.get(1).sand.load() - 0.1).abs() < 1e-6);
        // Later neighbors see the reduced center.
        assert!(cells.get(7).sand.load() < cells.get(1).sand.load());
        let total = cells.total(strata_core::Material::Sand);
        assert!((total - 1.0).abs() < 1e-5, "sand must be conserved, got {total}");
    }

    #[test]
    fn test_sand_does_not_climb() {
        let cells = CellStore::from_layers(3, &[2.0; 9], None, None);
        cells.get(4).stone.store(0.0);
        cells.get(4).sand.store(1.0);
        apply(&cells, 1, 1, &physics());
        assert_eq!(cells.get(4).sand.load(), 1.0);
    }
}
