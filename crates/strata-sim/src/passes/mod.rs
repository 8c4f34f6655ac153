//! Per-cell update rules. Each pass touches one center cell and its kernel
//! neighbors in place.

pub mod lava;
pub mod sand;
pub mod smooth;
pub mod water;

use glam::IVec2;
use strata_core::math::offset_index;
use strata_core::AtomicF32;

use crate::store::{CellStore, SharedCell};

/// The neighbor a fluid rule decided to transfer into.
#[derive(Debug, Clone, Copy)]
pub struct Lowest {
    pub offset: IVec2,
    pub index: usize,
    pub total: f32,
}

/// Scan `offsets` around interior cell `(x, y)` for the neighbor whose
/// `total_of` is strictly below `center_total` and below every neighbor
/// scanned before it. Ties keep the earlier neighbor.
pub fn lowest_neighbor(
    cells: &CellStore,
    x: usize,
    y: usize,
    offsets: &[IVec2],
    center_total: f32,
    total_of: impl Fn(&SharedCell) -> f32,
) -> Option<Lowest> {
    let side = cells.side();
    let mut best: Option<Lowest> = None;
    let mut lowest = center_total;
    for &offset in offsets {
        let index = offset_index(x, y, offset, side);
        let total = total_of(cells.get(index));
        if total < lowest {
            lowest = total;
            best = Some(Lowest {
                offset,
                index,
                total,
            });
        }
    }
    best
}

/// Move `amount` from `from` to `to`, never taking more than `from` holds.
/// Returns the amount actually moved.
#[inline]
pub fn transfer(from: &AtomicF32, to: &AtomicF32, amount: f32) -> f32 {
    let available = from.load();
    let moved = amount.min(available).max(0.0);
    from.store(available - moved);
    to.update(|v| v + moved);
    moved
}
