use strata_core::constants::SMOOTH_STIFFNESS;
use strata_core::math::{grid_index, offset_index};
use strata_core::Kernel;

use crate::passes::transfer;
use crate::store::CellStore;

/// Even out water depth between every interior cell and its 8 neighbors.
pub fn smooth_water(cells: &CellStore) {
    let side = cells.side();
    for y in 1..side - 1 {
        for x in 1..side - 1 {
            let center = cells.get(grid_index(x, y, side));
            for &offset in Kernel::Moore.offsets() {
                let other = cells.get(offset_index(x, y, offset, side));
                let delta = (center.water.load() - other.water.load()) * SMOOTH_STIFFNESS;
                if delta > 0.0 {
                    transfer(&center.water, &other.water, delta);
                } else if delta < 0.0 {
                    transfer(&other.water, &center.water, -delta);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Material;

    #[test]
    fn test_smooth_spreads_and_conserves() {
        let cells = CellStore::from_layers(5, &[0.0; 25], None, None);
        cells.get(12).water.store(10.0);
        smooth_water(&cells);
        assert!(cells.get(12).water.load() < 10.0);
        assert!(cells.get(6).water.load() > 0.0, "diagonal neighbor receives water");
        let total = cells.total(Material::Water);
        assert!((total - 10.0).abs() < 1e-4, "smoothing conserves water, got {total}");
    }

    #[test]
    fn test_smooth_flat_water_unchanged() {
        let cells = CellStore::from_layers(4, &[0.0; 16], None, Some(&[1.0; 16][..]));
        smooth_water(&cells);
        for c in cells.iter() {
            assert_eq!(c.water.load(), 1.0);
        }
    }
}
