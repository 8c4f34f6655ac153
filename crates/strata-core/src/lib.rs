pub mod cell;
pub mod constants;
pub mod error;
pub mod kernel;
pub mod math;
pub mod physics;

pub use cell::{AtomicF32, Cell, Material, ALL_MATERIALS};
pub use error::GridError;
pub use kernel::Kernel;
pub use physics::PhysicsConfig;
