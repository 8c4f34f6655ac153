pub mod map;
pub mod stepper;
pub mod store;

mod cell_based;
mod fluid;
mod passes;
mod simple;

#[cfg(test)]
mod test_harness;

pub use cell_based::CellBasedMap;
pub use fluid::FluidMap;
pub use map::{build_map, InitialLayers, MapKind, RuntimeMap};
pub use simple::SimpleMap;
pub use stepper::Stepper;
pub use store::SharedCell;
