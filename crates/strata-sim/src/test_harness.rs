//! Grid fixtures shared by the simulation tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use strata_core::math::grid_index;
use strata_core::{Material, PhysicsConfig};

use crate::map::{MapKind, RuntimeMap};
use crate::store::{CellStore, SharedCell};

/// Uniform stone heightmap for an S x S grid.
pub fn flat_stone(side: usize, height: f32) -> Vec<f32> {
    vec![height; side * side]
}

/// Flat stone with a single column of water at `(x, y)`.
pub fn seeded_water(side: usize, stone: f32, x: usize, y: usize, water: f32) -> (Vec<f32>, Vec<f32>) {
    let mut layer = vec![0.0; side * side];
    layer[grid_index(x, y, side)] = water;
    (flat_stone(side, stone), layer)
}

/// Panic with the offending cell if any height is negative.
pub fn assert_all_clamped(map: &dyn RuntimeMap) {
    let side = map.side();
    for y in 0..side {
        for x in 0..side {
            let cell = map.cell_at(x, y).load();
            assert!(cell.is_clamped(), "negative height at ({x}, {y}): {cell:?}");
        }
    }
}

/// A map whose tick only counts how often it ran.
struct CountingMap {
    cells: CellStore,
    physics: PhysicsConfig,
    updates: Arc<AtomicU64>,
    delay: Duration,
}

impl RuntimeMap for CountingMap {
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

    fn add(&self, x: usize, y: usize, material: Material, amount: f32) {
        self.cells.at(x, y).field(material).update(|h| h + amount);
    }

    fn map_update(&self) {
        self.updates.fetch_add(1, Ordering::AcqRel);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn simple_smooth(&self) {}
}

pub fn counting_map() -> (Arc<dyn RuntimeMap>, Arc<AtomicU64>) {
    slow_counting_map(Duration::ZERO)
}

/// Counting map whose tick sleeps for `delay` after being counted.
pub fn slow_counting_map(delay: Duration) -> (Arc<dyn RuntimeMap>, Arc<AtomicU64>) {
    let updates = Arc::new(AtomicU64::new(0));
    let map = CountingMap {
        cells: CellStore::from_layers(3, &flat_stone(3, 0.0), None, None),
        physics: PhysicsConfig::default(),
        updates: Arc::clone(&updates),
        delay,
    };
    (Arc::new(map), updates)
}
