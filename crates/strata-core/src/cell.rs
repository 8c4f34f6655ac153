use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the four stacked materials of a terrain column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Material {
    Stone = 0,
    Sand = 1,
    Water = 2,
    Lava = 3,
}

/// All materials, bottom of the stack first.
pub const ALL_MATERIALS: [Material; 4] = [
    Material::Stone,
    Material::Sand,
    Material::Water,
    Material::Lava,
];

/// Plain-value snapshot of one grid cell.
///
/// The grid stores cells as atomics; this copy is what readers work with
/// after loading a cell and what constructors seed the grid from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    pub stone: f32,
    pub sand: f32,
    pub water: f32,
    pub lava: f32,
    /// Direction and magnitude of the last water transfer. Visualization only.
    pub water_flow: Vec2,
    /// Direction and magnitude of the last lava transfer. Visualization only.
    pub lava_flow: Vec2,
}

impl Cell {
    pub fn new(stone: f32, sand: f32, water: f32, lava: f32) -> Self {
        Self {
            stone,
            sand,
            water,
            lava,
            water_flow: Vec2::ZERO,
            lava_flow: Vec2::ZERO,
        }
    }

    /// Total column height (all four materials).
    pub fn whole_height(&self) -> f32 {
        self.stone + self.sand + self.water + self.lava
    }

    /// Height of the solid floor (stone + sand).
    pub fn litho_height(&self) -> f32 {
        self.stone + self.sand
    }

    pub fn value(&self, material: Material) -> f32 {
        match material {
            Material::Stone => self.stone,
            Material::Sand => self.sand,
            Material::Water => self.water,
            Material::Lava => self.lava,
        }
    }

    pub fn value_mut(&mut self, material: Material) -> &mut f32 {
        match material {
            Material::Stone => &mut self.stone,
            Material::Sand => &mut self.sand,
            Material::Water => &mut self.water,
            Material::Lava => &mut self.lava,
        }
    }

    /// True if no material height is negative.
    pub fn is_clamped(&self) -> bool {
        ALL_MATERIALS.iter().all(|m| self.value(*m) >= 0.0)
    }
}

/// An `f32` that can be shared between the stepper and the render path.
///
/// Relaxed ordering: a reader sees either the old or the new value, never a
/// torn one. No ordering between fields is implied.
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Read-modify-write as a plain load followed by a store.
    ///
    /// Two concurrent writers may lose an update; the grid accepts this.
    #[inline]
    pub fn update(&self, f: impl FnOnce(f32) -> f32) -> f32 {
        let next = f(self.load());
        self.store(next);
        next
    }
}
