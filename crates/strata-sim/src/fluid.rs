use std::sync::{Mutex, PoisonError};

use strata_core::math::{grid_index, offset_index};
use strata_core::{GridError, Material, PhysicsConfig};

use crate::map::{InitialLayers, MapKind, RuntimeMap};
use crate::store::{CellStore, SharedCell};

/// How a field behaves at the grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Mirror the interior neighbor unchanged.
    Scalar,
    /// x-velocity: flipped on the left/right edges.
    VelocityX,
    /// y-velocity: flipped on the top/bottom edges.
    VelocityY,
}

/// Solver fields, all S x S, row-major.
struct FluidState {
    vx: Vec<f32>,
    vy: Vec<f32>,
    vx0: Vec<f32>,
    vy0: Vec<f32>,
    density: Vec<f32>,
    density0: Vec<f32>,
    scratch: Vec<f32>,
}

/// Experimental engine: a stable-fluids solver whose density is the water layer.
///
/// Stone, sand and lava are static. Water added through `add` is picked up as
/// density at the start of the next tick and written back at its end.
pub struct FluidMap {
    cells: CellStore,
    physics: PhysicsConfig,
    state: Mutex<FluidState>,
}

impl FluidMap {
    pub fn new(side: usize, physics: PhysicsConfig, layers: InitialLayers<'_>) -> Result<Self, GridError> {
        layers.validate(side)?;
        let cells = CellStore::from_layers(side, layers.stone, layers.sand, layers.water);
        let n = side * side;
        let mut state = FluidState {
            vx: vec![0.0; n],
            vy: vec![0.0; n],
            vx0: vec![0.0; n],
            vy0: vec![0.0; n],
            density: vec![0.0; n],
            density0: vec![0.0; n],
            scratch: vec![0.0; n],
        };

        // Start every interior cell moving toward its steepest-descent neighbor.
        for y in 1..side - 1 {
            for x in 1..side - 1 {
                let i = grid_index(x, y, side);
                let mut lowest = layers.stone[i];
                let mut dir = glam::Vec2::ZERO;
                for &offset in physics.kernel.offsets() {
                    let other = layers.stone[offset_index(x, y, offset, side)];
                    if other < lowest {
                        lowest = other;
                        dir = offset.as_vec2();
                    }
                }
                state.vx[i] = dir.x;
                state.vy[i] = dir.y;
            }
        }

        Ok(Self {
            cells,
            physics,
            state: Mutex::new(state),
        })
    }
}

impl RuntimeMap for FluidMap {
    fn kind(&self) -> MapKind {
        MapKind::Fluid
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

    /// Clamps immediately.
    fn add(&self, x: usize, y: usize, material: Material, amount: f32) {
        self.cells
            .at(x, y)
            .field(material)
            .update(|h| (h + amount).max(0.0));
    }

    fn map_update(&self) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let FluidState {
            vx,
            vy,
            vx0,
            vy0,
            density,
            density0,
            scratch,
        } = &mut *guard;
        let solver = Solver {
            side: self.cells.side(),
            iterations: self.physics.iterations,
        };
        let dt = self.physics.dt;

        for (d, cell) in density.iter_mut().zip(self.cells.iter()) {
            *d = cell.water.load().max(0.0);
        }

        solver.diffuse(Boundary::VelocityX, vx0, vx, self.physics.water_viscosity, dt, scratch);
        solver.diffuse(Boundary::VelocityY, vy0, vy, self.physics.water_viscosity, dt, scratch);
        solver.project(vx0, vy0, vx, vy, scratch);

        solver.advect(Boundary::VelocityX, vx, vx0, vx0, vy0, dt);
        solver.advect(Boundary::VelocityY, vy, vy0, vx0, vy0, dt);
        solver.project(vx, vy, vx0, vy0, scratch);

        solver.diffuse(Boundary::Scalar, density0, density, self.physics.water_diffusion, dt, scratch);
        solver.advect(Boundary::Scalar, density, density0, vx, vy, dt);

        for (cell, d) in self.cells.iter().zip(density.iter()) {
            cell.water.store(d.max(0.0));
        }
        for (i, cell) in self.cells.iter().enumerate() {
            cell.set_water_flow(glam::Vec2::new(vx[i], vy[i]));
        }
    }

    /// No-op: the solver's own diffusion already smooths the water layer.
    fn simple_smooth(&self) {}
}

/// Grid operators of the solver.
struct Solver {
    side: usize,
    iterations: u32,
}

impl Solver {
    #[inline]
    fn ix(&self, x: usize, y: usize) -> usize {
        grid_index(x, y, self.side)
    }

    fn diffuse(&self, b: Boundary, x: &mut [f32], x0: &[f32], diff: f32, dt: f32, scratch: &mut [f32]) {
        let inner = (self.side - 2) as f32;
        let a = dt * diff * inner * inner;
        self.lin_solve(b, x, x0, a, 1.0 + 4.0 * a, scratch);
    }

    /// Jacobi iteration for `c*x - a*(sum of 4 neighbors) = x0`.
    fn lin_solve(&self, b: Boundary, x: &mut [f32], x0: &[f32], a: f32, c: f32, scratch: &mut [f32]) {
        let c_recip = 1.0 / c;
        let n = self.side;
        for _ in 0..self.iterations {
            for j in 1..n - 1 {
                for i in 1..n - 1 {
                    let neighbors = x[self.ix(i + 1, j)]
                        + x[self.ix(i - 1, j)]
                        + x[self.ix(i, j + 1)]
                        + x[self.ix(i, j - 1)];
                    scratch[self.ix(i, j)] = (x0[self.ix(i, j)] + a * neighbors) * c_recip;
                }
            }
            for j in 1..n - 1 {
                let row = self.ix(1, j)..self.ix(n - 1, j);
                x[row.clone()].copy_from_slice(&scratch[row]);
            }
            self.set_bnd(b, x);
        }
    }

    /// Remove the divergent part of `(vx, vy)`. `p` and `div` are scratch fields.
    fn project(&self, vx: &mut [f32], vy: &mut [f32], p: &mut [f32], div: &mut [f32], scratch: &mut [f32]) {
        let n = self.side;
        let nf = n as f32;
        for j in 1..n - 1 {
            for i in 1..n - 1 {
                div[self.ix(i, j)] = -0.5
                    * (vx[self.ix(i + 1, j)] - vx[self.ix(i - 1, j)] + vy[self.ix(i, j + 1)]
                        - vy[self.ix(i, j - 1)])
                    / nf;
                p[self.ix(i, j)] = 0.0;
            }
        }
        self.set_bnd(Boundary::Scalar, div);
        self.set_bnd(Boundary::Scalar, p);
        self.lin_solve(Boundary::Scalar, p, div, 1.0, 4.0, scratch);

        for j in 1..n - 1 {
            for i in 1..n - 1 {
                vx[self.ix(i, j)] -= 0.5 * (p[self.ix(i + 1, j)] - p[self.ix(i - 1, j)]) * nf;
                vy[self.ix(i, j)] -= 0.5 * (p[self.ix(i, j + 1)] - p[self.ix(i, j - 1)]) * nf;
            }
        }
        self.set_bnd(Boundary::VelocityX, vx);
        self.set_bnd(Boundary::VelocityY, vy);
    }

    /// Semi-Lagrangian transport of `d0` along `(vx, vy)` into `d`.
    fn advect(&self, b: Boundary, d: &mut [f32], d0: &[f32], vx: &[f32], vy: &[f32], dt: f32) {
        let n = self.side;
        let dt0 = dt * (n - 2) as f32;
        let max = n as f32 - 1.5;
        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let x = (i as f32 - dt0 * vx[self.ix(i, j)]).clamp(0.5, max);
                let y = (j as f32 - dt0 * vy[self.ix(i, j)]).clamp(0.5, max);
                let i0 = x.floor() as usize;
                let j0 = y.floor() as usize;
                let s1 = x - i0 as f32;
                let s0 = 1.0 - s1;
                let t1 = y - j0 as f32;
                let t0 = 1.0 - t1;
                d[self.ix(i, j)] = s0 * (t0 * d0[self.ix(i0, j0)] + t1 * d0[self.ix(i0, j0 + 1)])
                    + s1 * (t0 * d0[self.ix(i0 + 1, j0)] + t1 * d0[self.ix(i0 + 1, j0 + 1)]);
            }
        }
        self.set_bnd(b, d);
    }

    /// Mirror the edges, flipping the velocity component normal to each edge.
    fn set_bnd(&self, b: Boundary, x: &mut [f32]) {
        let n = self.side;
        let flip_x = if b == Boundary::VelocityX { -1.0 } else { 1.0 };
        let flip_y = if b == Boundary::VelocityY { -1.0 } else { 1.0 };
        for i in 1..n - 1 {
            x[self.ix(i, 0)] = flip_y * x[self.ix(i, 1)];
            x[self.ix(i, n - 1)] = flip_y * x[self.ix(i, n - 2)];
            x[self.ix(0, i)] = flip_x * x[self.ix(1, i)];
            x[self.ix(n - 1, i)] = flip_x * x[self.ix(n - 2, i)];
        }
        x[self.ix(0, 0)] = 0.5 * (x[self.ix(1, 0)] + x[self.ix(0, 1)]);
        x[self.ix(0, n - 1)] = 0.5 * (x[self.ix(1, n - 1)] + x[self.ix(0, n - 2)]);
        x[self.ix(n - 1, 0)] = 0.5 * (x[self.ix(n - 2, 0)] + x[self.ix(n - 1, 1)]);
        x[self.ix(n - 1, n - 1)] = 0.5 * (x[self.ix(n - 2, n - 1)] + x[self.ix(n - 1, n - 2)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::{assert_all_clamped, flat_stone, seeded_water};

    fn solver(side: usize) -> Solver {
        Solver {
            side,
            iterations: 4,
        }
    }

    #[test]
    fn test_set_bnd_scalar_mirrors() {
        let s = solver(4);
        let mut x: Vec<f32> = (0..16).map(|i| i as f32).collect();
        s.set_bnd(Boundary::Scalar, &mut x);
        assert_eq!(x[s.ix(1, 0)], x[s.ix(1, 1)]);
        assert_eq!(x[s.ix(0, 2)], x[s.ix(1, 2)]);
        assert_eq!(x[s.ix(3, 1)], x[s.ix(2, 1)]);
        assert_eq!(x[s.ix(0, 0)], 0.5 * (x[s.ix(1, 0)] + x[s.ix(0, 1)]));
    }

    #[test]
    fn test_set_bnd_flips_normal_velocity() {
        let s = solver(4);
        let mut vx = vec![1.0; 16];
        s.set_bnd(Boundary::VelocityX, &mut vx);
        assert_eq!(vx[s.ix(0, 1)], -1.0, "x-velocity flips on the left edge");
        assert_eq!(vx[s.ix(3, 2)], -1.0, "x-velocity flips on the right edge");
        assert_eq!(vx[s.ix(1, 0)], 1.0, "x-velocity is tangential on the top edge");

        let mut vy = vec![1.0; 16];
        s.set_bnd(Boundary::VelocityY, &mut vy);
        assert_eq!(vy[s.ix(1, 0)], -1.0, "y-velocity flips on the top edge");
        assert_eq!(vy[s.ix(0, 1)], 1.0, "y-velocity is tangential on the left edge");
    }

    #[test]
    fn test_advect_zero_velocity_is_identity() {
        let s = solver(6);
        let d0: Vec<f32> = (0..36).map(|i| (i % 5) as f32).collect();
        let zero = vec![0.0; 36];
        let mut d = vec![0.0; 36];
        s.advect(Boundary::Scalar, &mut d, &d0, &zero, &zero, 0.1);
        for y in 1..5 {
            for x in 1..5 {
                let i = s.ix(x, y);
                assert!((d[i] - d0[i]).abs() < 1e-6, "({x}, {y}) moved without velocity");
            }
        }
    }

    #[test]
    fn test_initial_velocity_points_downhill() {
        let side = 6;
        let stone: Vec<f32> = (0..side * side).map(|i| (i % side) as f32).collect();
        let map = FluidMap::new(side, PhysicsConfig::default(), InitialLayers::stone(&stone))
            .expect("valid layers");
        let state = map.state.lock().unwrap_or_else(PoisonError::into_inner);
        let i = grid_index(3, 3, side);
        assert_eq!(state.vx[i], -1.0, "stone decreases toward -x");
        assert_eq!(state.vy[i], 0.0);
    }

    #[test]
    fn test_fluid_keeps_water_non_negative() {
        let (stone, water) = seeded_water(16, 1.0, 8, 8, 5.0);
        let map = FluidMap::new(
            16,
            PhysicsConfig::default(),
            InitialLayers::stone(&stone).with_water(&water),
        )
        .expect("valid layers");
        for _ in 0..10 {
            map.add(4, 4, Material::Water, 1.0);
            map.map_update();
            assert_all_clamped(&map);
        }
    }

    #[test]
    fn test_fluid_add_clamps_and_smooth_is_noop() {
        let stone = flat_stone(8, 1.0);
        let map = FluidMap::new(8, PhysicsConfig::default(), InitialLayers::stone(&stone))
            .expect("valid layers");
        map.add(2, 2, Material::Water, -3.0);
        assert_eq!(map.value_at(2, 2, Material::Water), 0.0);
        map.add(2, 2, Material::Water, 1.0);
        map.simple_smooth();
        assert_eq!(map.value_at(2, 2, Material::Water), 1.0);
    }

    #[test]
    fn test_added_water_spreads() {
        let stone = flat_stone(10, 1.0);
        let map = FluidMap::new(10, PhysicsConfig::default(), InitialLayers::stone(&stone))
            .expect("valid layers");
        map.add(5, 5, Material::Water, 4.0);
        map.map_update();
        let center = map.value_at(5, 5, Material::Water);
        assert!(center < 4.0, "density should diffuse away from the source, got {center}");
        assert!(map.value_at(5, 4, Material::Water) > 0.0);
    }
}
