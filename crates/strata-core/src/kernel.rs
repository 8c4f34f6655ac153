use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Neighbor set used by the local update rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Kernel {
    /// The 4 edge neighbors.
    #[default]
    VonNeumann,
    /// All 8 surrounding cells.
    Moore,
    /// The 4 diagonal neighbors.
    VonNeumannRotated,
}

/// Edge neighbors in scan order: row above, same row left to right, row below.
const VON_NEUMANN: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
];

const MOORE: [IVec2; 8] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

const VON_NEUMANN_ROTATED: [IVec2; 4] = [
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
];

impl Kernel {
    /// Neighbor offsets as (dx, dy), in the fixed order the rules scan them.
    ///
    /// Rules that pick a single "lowest" neighbor keep the first one in this
    /// order on ties.
    pub fn offsets(self) -> &'static [IVec2] {
        match self {
            Kernel::VonNeumann => &VON_NEUMANN,
            Kernel::Moore => &MOORE,
            Kernel::VonNeumannRotated => &VON_NEUMANN_ROTATED,
        }
    }

    pub fn len(self) -> usize {
        self.offsets().len()
    }

    pub fn is_empty(self) -> bool {
        self.offsets().is_empty()
    }
}
