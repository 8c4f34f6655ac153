use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec2;
use strata_core::{AtomicF32, Cell, Material};

/// One grid cell as the grid stores it: every field independently atomic.
///
/// Readers on the render path and the stepper thread touch the same cells
/// without locks. Each scalar is always either fully old or fully new.
#[derive(Debug, Default)]
pub struct SharedCell {
    pub stone: AtomicF32,
    pub sand: AtomicF32,
    pub water: AtomicF32,
    pub lava: AtomicF32,
    water_flow: [AtomicF32; 2],
    lava_flow: [AtomicF32; 2],
}

impl SharedCell {
    pub fn from_cell(cell: &Cell) -> Self {
        let shared = Self::default();
        shared.store(cell);
        shared
    }

    /// Copy every field out into a plain [`Cell`].
    pub fn load(&self) -> Cell {
        Cell {
            stone: self.stone.load(),
            sand: self.sand.load(),
            water: self.water.load(),
            lava: self.lava.load(),
            water_flow: self.water_flow(),
            lava_flow: self.lava_flow(),
        }
    }

    pub fn store(&self, cell: &Cell) {
        self.stone.store(cell.stone);
        self.sand.store(cell.sand);
        self.water.store(cell.water);
        self.lava.store(cell.lava);
        self.set_water_flow(cell.water_flow);
        self.set_lava_flow(cell.lava_flow);
    }

    pub fn field(&self, material: Material) -> &AtomicF32 {
        match material {
            Material::Stone => &self.stone,
            Material::Sand => &self.sand,
            Material::Water => &self.water,
            Material::Lava => &self.lava,
        }
    }

    pub fn get(&self, material: Material) -> f32 {
        self.field(material).load()
    }

    pub fn litho_height(&self) -> f32 {
        self.stone.load() + self.sand.load()
    }

    pub fn whole_height(&self) -> f32 {
        self.litho_height() + self.water.load() + self.lava.load()
    }

    pub fn water_flow(&self) -> Vec2 {
        Vec2::new(self.water_flow[0].load(), self.water_flow[1].load())
    }

    pub fn set_water_flow(&self, flow: Vec2) {
        self.water_flow[0].store(flow.x);
        self.water_flow[1].store(flow.y);
    }

    pub fn lava_flow(&self) -> Vec2 {
        Vec2::new(self.lava_flow[0].load(), self.lava_flow[1].load())
    }

    pub fn set_lava_flow(&self, flow: Vec2) {
        self.lava_flow[0].store(flow.x);
        self.lava_flow[1].store(flow.y);
    }
}

/// Flat row-major arena of cells for an S x S grid.
#[derive(Debug)]
pub struct CellStore {
    cells: Vec<SharedCell>,
    side: usize,
}

impl CellStore {
    /// Build a store from per-layer heights. Missing layers start at zero.
    ///
    /// Callers validate layer lengths first; a short optional layer reads as zero.
    pub fn from_layers(side: usize, stone: &[f32], sand: Option<&[f32]>, water: Option<&[f32]>) -> Self {
        let cells = stone
            .iter()
            .enumerate()
            .map(|(i, &stone)| {
                let sand = sand.and_then(|s| s.get(i).copied()).unwrap_or(0.0);
                let water = water.and_then(|w| w.get(i).copied()).unwrap_or(0.0);
                SharedCell::from_cell(&Cell::new(stone, sand, water, 0.0))
            })
            .collect();
        Self { cells, side }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Panics if `index` is out of range. Callers check `valid_index` first.
    #[inline]
    pub fn get(&self, index: usize) -> &SharedCell {
        &self.cells[index]
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> &SharedCell {
        &self.cells[y * self.side + x]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedCell> {
        self.cells.iter()
    }

    /// Copy every cell of `other` into this store, clamping heights to >= 0.
    pub fn copy_clamped_from(&self, other: &CellStore) {
        for (dst, src) in self.cells.iter().zip(other.cells.iter()) {
            let mut cell = src.load();
            cell.stone = cell.stone.max(0.0);
            cell.sand = cell.sand.max(0.0);
            cell.water = cell.water.max(0.0);
            cell.lava = cell.lava.max(0.0);
            dst.store(&cell);
        }
    }

    /// Sum of one material over the whole grid.
    pub fn total(&self, material: Material) -> f64 {
        self.cells.iter().map(|c| c.get(material) as f64).sum()
    }
}

/// Two cell stores that alternate roles each tick.
///
/// The front store is what readers see; the back store is written during a
/// tick. `swap()` flips the roles once the tick is complete.
#[derive(Debug)]
pub struct DoubleStore {
    stores: [CellStore; 2],
    /// 0 or 1: index of the store currently visible to readers.
    read_index: AtomicUsize,
}

impl DoubleStore {
    pub fn new(front: CellStore, back: CellStore) -> Self {
        Self {
            stores: [front, back],
            read_index: AtomicUsize::new(0),
        }
    }

    /// The store visible to readers this tick.
    pub fn front(&self) -> &CellStore {
        &self.stores[self.read_index.load(Ordering::Acquire)]
    }

    /// The store written during this tick.
    pub fn back(&self) -> &CellStore {
        &self.stores[1 - self.read_index.load(Ordering::Acquire)]
    }

    /// Swap front/back roles. Call after the tick has fully written the back store.
    pub fn swap(&self) {
        self.read_index.fetch_xor(1, Ordering::AcqRel);
    }

    /// Current parity (0 or 1).
    pub fn parity(&self) -> usize {
        self.read_index.load(Ordering::Acquire)
    }
}
