use serde::{Deserialize, Serialize};

use crate::kernel::Kernel;

/// Per-material constants for the update rules. Fixed once a grid is built.
///
/// Every field falls back to its default when missing from a RON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Sand transfer factor. Loaded from configs but not read by any rule.
    pub sand_hardness: f32,
    /// Minimum sand thickness before sand moves at all.
    pub sand_stiffness: f32,
    /// Fraction of the height difference sand slides toward a lower neighbor.
    pub sand_slope_ratio: f32,
    /// Sand diffusion viscosity (implicit smoothing in the simple variant).
    pub sand_viscosity: f32,
    /// Sand diffusion time step.
    pub sand_dt: f32,
    /// Below this thickness sand would be regenerated. Currently inert.
    pub sand_creation_height: f32,
    /// Regeneration rate paired with `sand_creation_height`. Currently inert.
    pub sand_creation_speed: f32,
    /// Fraction of the height difference moved per water transfer.
    pub water_viscosity: f32,
    /// Fraction of the column moved when water drops over a solid step.
    pub water_splash_ratio: f32,
    /// Water below this depth evaporates (simple variant).
    pub evaporation_threshold: f32,
    /// Density diffusion rate of the fluid solver.
    pub water_diffusion: f32,
    /// Lava lost per tick.
    pub lava_cooling: f32,
    /// Fraction of the column moved when lava drops over a solid step.
    pub lava_splash_ratio: f32,
    /// Fraction of the height difference moved per lava transfer.
    pub lava_viscosity: f32,
    /// Fluid solver time step.
    pub dt: f32,
    /// Jacobi iterations per fluid solver linear solve.
    pub iterations: u32,
    pub kernel: Kernel,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            sand_hardness: 1.0,
            sand_stiffness: 0.001,
            sand_slope_ratio: 0.1,
            sand_viscosity: 0.01,
            sand_dt: 0.01,
            sand_creation_height: 0.1,
            sand_creation_speed: 0.0001,
            water_viscosity: 0.01,
            water_splash_ratio: 0.5,
            evaporation_threshold: 0.0001,
            water_diffusion: 0.0001,
            lava_cooling: 0.0001,
            lava_splash_ratio: 0.5,
            lava_viscosity: 0.005,
            dt: 0.1,
            iterations: 4,
            kernel: Kernel::VonNeumann,
        }
    }
}

impl PhysicsConfig {
    /// Implicit sand diffusion coefficient for a grid of `side` x `side` cells.
    pub fn sand_diffusion_coefficient(&self, side: usize) -> f32 {
        self.sand_dt * self.sand_viscosity * (side * side) as f32
    }
}
