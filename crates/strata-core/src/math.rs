use glam::{IVec2, Vec3};

use crate::constants::MIN_GRID_SIDE;
use crate::error::GridError;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Linear index of `(x, y)` in a row-major grid of side `side`.
#[inline]
pub fn grid_index(x: usize, y: usize, side: usize) -> usize {
    y * side + x
}

/// Inverse of [`grid_index`].
#[inline]
pub fn index_to_xy(index: usize, side: usize) -> (usize, usize) {
    (index % side, index / side)
}

/// True if `(x, y)` lies inside a `side` x `side` grid.
#[inline]
pub fn in_bounds(x: i32, y: i32, side: usize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < side && (y as usize) < side
}

/// Neighbor of an interior cell. Callers only pass interior coordinates,
/// so the offset never leaves the grid.
#[inline]
pub fn offset_index(x: usize, y: usize, offset: IVec2, side: usize) -> usize {
    let nx = (x as i32 + offset.x) as usize;
    let ny = (y as i32 + offset.y) as usize;
    grid_index(nx, ny, side)
}

/// Check the construction contract for a set of initial heightmaps.
///
/// The first layer is the reference; every other layer must match its length,
/// and the reference must hold exactly `side * side` cells.
pub fn validate_layers(side: usize, layers: &[(&'static str, &[f32])]) -> Result<(), GridError> {
    if side < MIN_GRID_SIDE {
        return Err(GridError::SideTooSmall(side));
    }
    let Some((ref_name, reference)) = layers.first() else {
        return Ok(());
    };
    let expected = side * side;
    if reference.len() != expected {
        return Err(GridError::SideMismatch {
            layer: *ref_name,
            actual: reference.len(),
            expected,
            side,
        });
    }
    for (name, layer) in &layers[1..] {
        if layer.len() != reference.len() {
            return Err(GridError::LengthMismatch {
                layer: *name,
                actual: layer.len(),
                expected: reference.len(),
            });
        }
    }
    Ok(())
}
