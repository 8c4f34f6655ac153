use strata_core::math::{grid_index, offset_index};
use strata_core::{GridError, Material, PhysicsConfig};

use crate::map::{InitialLayers, MapKind, RuntimeMap};
use crate::passes::{lowest_neighbor, smooth, transfer};
use crate::store::{CellStore, DoubleStore, SharedCell};

/// Double-buffered engine: reads the previous tick, writes the next one.
///
/// Each tick copies front to back with every height clamped to zero, runs sand
/// diffusion and water transfer against the front snapshot, then swaps.
pub struct SimpleMap {
    stores: DoubleStore,
    physics: PhysicsConfig,
}

impl SimpleMap {
    pub fn new(side: usize, physics: PhysicsConfig, layers: InitialLayers<'_>) -> Result<Self, GridError> {
        layers.validate(side)?;
        let front = CellStore::from_layers(side, layers.stone, layers.sand, layers.water);
        let back = CellStore::from_layers(side, layers.stone, layers.sand, layers.water);
        Ok(Self {
            stores: DoubleStore::new(front, back),
            physics,
        })
    }

    /// Implicit diffusion step toward the neighbor average.
    fn diffuse_sand(&self, prev: &CellStore, next: &CellStore, x: usize, y: usize, a: f32) {
        let side = prev.side();
        let index = grid_index(x, y, side);
        if next.get(index).sand.load() < self.physics.sand_stiffness {
            return;
        }
        let offsets = self.physics.kernel.offsets();
        let neighbor_sand: f32 = offsets
            .iter()
            .map(|&o| prev.get(offset_index(x, y, o, side)).sand.load().max(0.0))
            .sum();
        let own = prev.get(index).sand.load().max(0.0);
        let shifted = (own + a * neighbor_sand) / (1.0 + offsets.len() as f32 * a);
        next.get(index).sand.store(shifted);
    }

    /// Water transfer decided from the previous snapshot, applied to the next.
    fn flow_water(&self, prev: &CellStore, next: &CellStore, x: usize, y: usize) {
        let index = grid_index(x, y, prev.side());
        let center = prev.get(index);
        let water = center.water.load().max(0.0);
        // Inflow from cells visited earlier this tick counts toward the threshold.
        if next.get(index).water.load() < self.physics.evaporation_threshold {
            next.get(index).water.store(0.0);
            return;
        }

        let litho = center.litho_height();
        let total = litho + water;
        let Some(lowest) = lowest_neighbor(prev, x, y, self.physics.kernel.offsets(), total, |c| {
            c.litho_height() + c.water.load().max(0.0)
        }) else {
            next.get(index).set_water_flow(glam::Vec2::ZERO);
            return;
        };

        let height_diff = total - lowest.total;
        next.get(index)
            .set_water_flow(lowest.offset.as_vec2() * height_diff);
        let amount = if litho > lowest.total {
            water * self.physics.water_splash_ratio
        } else {
            height_diff * self.physics.water_viscosity
        };
        transfer(&next.get(index).water, &next.get(lowest.index).water, amount);
    }
}

impl RuntimeMap for SimpleMap {
    fn kind(&self) -> MapKind {
        MapKind::Simple
    }

    fn side(&self) -> usize {
        self.stores.front().side()
    }

    fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    fn cell_at_index(&self, index: usize) -> &SharedCell {
        self.stores.front().get(index)
    }

    /// Does not clamp; negative heights are clamped at the start of the next tick.
    fn add(&self, x: usize, y: usize, material: Material, amount: f32) {
        self.stores
            .front()
            .at(x, y)
            .field(material)
            .update(|h| h + amount);
    }

    fn map_update(&self) {
        let prev = self.stores.front();
        let next = self.stores.back();
        next.copy_clamped_from(prev);

        let side = prev.side();
        let a = self.physics.sand_diffusion_coefficient(side);
        for y in 1..side - 1 {
            for x in 1..side - 1 {
                self.diffuse_sand(prev, next, x, y, a);
                self.flow_water(prev, next, x, y);
            }
        }

        self.stores.swap();
    }

    fn simple_smooth(&self) {
        smooth::smooth_water(self.stores.front());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::{assert_all_clamped, flat_stone, seeded_water};

    fn build(stone: &[f32], water: &[f32], side: usize) -> SimpleMap {
        SimpleMap::new(
            side,
            PhysicsConfig::default(),
            InitialLayers::stone(stone).with_water(water),
        )
        .expect("valid layers")
    }

    #[test]
    fn test_add_does_not_clamp_until_tick() {
        let stone = flat_stone(8, 1.0);
        let map = build(&stone, &[0.0; 64], 8);
        map.add(3, 3, Material::Sand, -2.0);
        assert_eq!(map.value_at(3, 3, Material::Sand), -2.0);
        map.map_update();
        assert_eq!(map.value_at(3, 3, Material::Sand), 0.0, "tick clamps negative sand");
    }

    #[test]
    fn test_tick_swaps_buffers() {
        let (stone, water) = seeded_water(8, 1.0, 4, 4, 5.0);
        let map = build(&stone, &water, 8);
        let parity = map.stores.parity();
        map.map_update();
        assert_ne!(map.stores.parity(), parity);
        assert!(map.value_at(4, 4, Material::Water) < 5.0);
        assert!(map.value_at(4, 3, Material::Water) > 0.0, "first-listed neighbor receives water");
    }

    #[test]
    fn test_evaporation() {
        let stone = flat_stone(8, 1.0);
        let mut water = vec![0.0; 64];
        water[grid_index(3, 3, 8)] = 0.00001;
        let map = build(&stone, &water, 8);
        map.map_update();
        assert_eq!(map.value_at(3, 3, Material::Water), 0.0);
    }

    #[test]
    fn test_inflow_into_dry_cell_survives() {
        let side = 8;
        let stone: Vec<f32> = (0..side * side).map(|i| 10.0 - (i % side) as f32).collect();
        let mut water = vec![0.0; side * side];
        water[grid_index(3, 4, side)] = 2.0;
        let map = build(&stone, &water, side);
        map.map_update();

        assert_eq!(map.value_at(3, 4, Material::Water), 1.0, "half the column splashes off the step");
        assert_eq!(map.value_at(4, 4, Material::Water), 1.0, "dry downhill cell keeps the splash");
        let total: f32 = (0..side * side).map(|i| map.cell_at_index(i).water.load()).sum();
        assert!((total - 2.0).abs() < 1e-6, "water lost during the tick: {total}");
    }

    #[test]
    fn test_sand_diffuses_toward_neighbors() {
        let stone = flat_stone(8, 1.0);
        let mut sand = vec![0.0; 64];
        sand[grid_index(4, 4, 8)] = 1.0;
        let map = SimpleMap::new(
            8,
            PhysicsConfig::default(),
            InitialLayers::stone(&stone).with_sand(&sand),
        )
        .expect("valid layers");
        map.map_update();
        let center = map.value_at(4, 4, Material::Sand);
        assert!(center < 1.0 && center > 0.0, "center sand relaxes, got {center}");
    }

    #[test]
    fn test_heights_non_negative_after_ticks() {
        let (stone, water) = seeded_water(12, 1.0, 6, 6, 10.0);
        let map = build(&stone, &water, 12);
        for i in 0..15 {
            map.add(2 + i % 6, 3, Material::Water, -0.3);
            map.map_update();
            assert_all_clamped(&map);
        }
    }
}
