//! 2D Eulerian fluid on a staggered (MAC) grid
//!
//! A small real-time velocity solver for interactive demos:
//! - Border cells are walls, interior cells are fluid
//! - Divergence is relaxed with over-relaxed row-major sweeps
//!   (approximate projection, no pressure field)
//! - Velocity is advected semi-Lagrangian with bilinear sampling
//!
//! Rendering and input are left to the host. It reads the grid between
//! steps through the read-only accessors.
//!
//! # Example
//!
//! ```
//! use eulerian::FluidSimulation;
//!
//! let mut sim = FluidSimulation::new(16, 12, 1.0).unwrap();
//! sim.reset();
//! for _ in 0..10 {
//!     sim.step(1.0 / 60.0);
//! }
//! assert!(sim.stats().finite);
//! ```

pub mod advection;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod forces;
pub mod grid;
pub mod host;
pub mod params;
pub mod pressure;
pub mod sampler;

pub use diagnostics::FieldStats;
pub use error::{FieldKind, SimError};
pub use glam::Vec2;
pub use grid::{CellType, FaceField, Grid};
pub use host::{FrameDriver, FrameReport, HostCommand};
pub use params::{SimConfig, SolverParams};

use advection::AdvectionBuffers;
use pressure::RelaxBuffers;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Velocity solver owning its grid, scratch buffers, and randomizer.
pub struct FluidSimulation {
    grid: Grid,
    params: SolverParams,
    rng: ChaCha8Rng,

    /// Pre-allocated scratch (no per-step allocation)
    advection_buffers: AdvectionBuffers,
    relax_buffers: RelaxBuffers,

    /// Accumulated simulated time
    time: f32,
    /// Completed steps
    frame: u64,
}

impl FluidSimulation {
    /// Create a simulation at rest with default solver parameters.
    pub fn new(width: usize, height: usize, cell_size: f32) -> Result<Self, SimError> {
        Self::with_params(width, height, cell_size, SolverParams::default())
    }

    /// Create a simulation with explicit solver parameters.
    pub fn with_params(
        width: usize,
        height: usize,
        cell_size: f32,
        params: SolverParams,
    ) -> Result<Self, SimError> {
        params.validate()?;
        let grid = Grid::new(width, height, cell_size)?;
        let advection_buffers = AdvectionBuffers::new(&grid);
        let relax_buffers = RelaxBuffers::new(&grid);
        let rng = ChaCha8Rng::seed_from_u64(params.seed);

        let mut sim = Self {
            grid,
            params,
            rng,
            advection_buffers,
            relax_buffers,
            time: 0.0,
            frame: 0,
        };
        if sim.params.randomize_on_create {
            sim.reset();
        }

        log::debug!(
            "created {}x{} grid, cell size {}, {} relax iterations",
            width,
            height,
            cell_size,
            sim.params.relax_iterations
        );
        Ok(sim)
    }

    /// Create a simulation from a loaded config.
    pub fn from_config(config: &SimConfig) -> Result<Self, SimError> {
        Self::with_params(config.width, config.height, config.cell_size, config.solver.clone())
    }

    /// Run one step: body forces (if configured), divergence, relaxation, advection.
    ///
    /// Never fails. `dt <= 0` is accepted and gives a near-identity step.
    pub fn step(&mut self, dt: f32) {
        if self.params.body_force != Vec2::ZERO {
            forces::apply_body_force(&mut self.grid, self.params.body_force, dt);
        }

        pressure::compute_divergence(&mut self.grid);
        pressure::relax_divergence(
            &mut self.grid,
            &mut self.relax_buffers,
            dt,
            self.params.relax_iterations,
            self.params.over_relaxation,
        );
        advection::advect_velocity(&mut self.grid, &mut self.advection_buffers, dt);

        self.time += dt;
        self.frame += 1;
        log::trace!("step {} dt={} t={}", self.frame, dt, self.time);
    }

    /// Re-randomize every face from the simulation's randomizer and refresh divergence.
    ///
    /// Successive calls continue the random stream, so each reset differs.
    pub fn reset(&mut self) {
        self.grid
            .randomize_velocities(&mut self.rng, self.params.velocity_scale);
        pressure::compute_divergence(&mut self.grid);
        log::debug!("velocities randomized (scale {})", self.params.velocity_scale);
    }

    /// Reseed the randomizer, then `reset`. Equal seeds give equal fields.
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.reset();
    }

    // ========== Caller-chosen initial field ==========

    /// Set one horizontal face velocity. Meant for building an initial field between steps.
    pub fn set_u(&mut self, i: usize, j: usize, value: f32) -> Result<(), SimError> {
        self.grid.set_u(i, j, value)
    }

    /// Set one vertical face velocity. Meant for building an initial field between steps.
    pub fn set_v(&mut self, i: usize, j: usize, value: f32) -> Result<(), SimError> {
        self.grid.set_v(i, j, value)
    }

    /// Recompute the stored divergence from the current faces.
    pub fn refresh_divergence(&mut self) {
        pressure::compute_divergence(&mut self.grid);
    }

    // ========== Read accessors ==========

    pub fn cell_type(&self, i: usize, j: usize) -> Result<CellType, SimError> {
        self.grid.cell_type_at(i, j)
    }

    /// Divergence from the most recent divergence pass.
    pub fn divergence(&self, i: usize, j: usize) -> Result<f32, SimError> {
        self.grid.divergence_at(i, j)
    }

    pub fn u(&self, i: usize, j: usize) -> Result<f32, SimError> {
        self.grid.u_at(i, j)
    }

    pub fn v(&self, i: usize, j: usize) -> Result<f32, SimError> {
        self.grid.v_at(i, j)
    }

    /// Bilinear velocity at a position in cell-index units.
    pub fn sample_velocity(&self, pos: Vec2) -> Vec2 {
        sampler::sample_velocity(&self.grid, pos)
    }

    /// Read-only view of the whole grid, for renderers.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn stats(&self) -> FieldStats {
        FieldStats::compute(&self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_creation() {
        let sim = FluidSimulation::new(16, 9, 64.0).unwrap();
        assert_eq!(sim.width(), 16);
        assert_eq!(sim.height(), 9);
        assert_eq!(sim.cell_size(), 64.0);
        assert_eq!(sim.frame(), 0);
        assert!(sim.grid().u().as_slice().iter().all(|&u| u == 0.0));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            FluidSimulation::new(0, 5, 1.0),
            Err(SimError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            FluidSimulation::new(5, 5, 0.0),
            Err(SimError::InvalidCellSize(_))
        ));
        let params = SolverParams {
            over_relaxation: 2.5,
            ..Default::default()
        };
        assert!(matches!(
            FluidSimulation::with_params(5, 5, 1.0, params),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_randomize_on_create() {
        let params = SolverParams {
            randomize_on_create: true,
            ..Default::default()
        };
        let sim = FluidSimulation::with_params(8, 8, 1.0, params).unwrap();
        assert!(sim.grid().u().as_slice().iter().any(|&u| u != 0.0));
        // Divergence already matches the new field
        let expected = sim.u(2, 3).unwrap() - sim.u(1, 3).unwrap() + sim.v(1, 4).unwrap() - sim.v(1, 3).unwrap();
        assert_eq!(sim.divergence(1, 3).unwrap(), expected);
    }

    #[test]
    fn test_step_advances_clock() {
        let mut sim = FluidSimulation::new(6, 6, 1.0).unwrap();
        sim.step(0.5);
        sim.step(0.25);
        assert_eq!(sim.frame(), 2);
        assert!((sim.time() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_step_at_rest_stays_at_rest() {
        let mut sim = FluidSimulation::new(8, 8, 1.0).unwrap();
        for _ in 0..5 {
            sim.step(1.0 / 60.0);
        }
        let stats = sim.stats();
        assert_eq!(stats.max_speed, 0.0);
        assert_eq!(stats.divergence_sum_sq, 0.0);
    }

    #[test]
    fn test_body_force_moves_fluid() {
        let params = SolverParams {
            body_force: Vec2::new(0.0, 9.81),
            ..Default::default()
        };
        let mut sim = FluidSimulation::with_params(8, 8, 1.0, params).unwrap();
        sim.step(1.0 / 60.0);
        assert!(sim.stats().max_speed > 0.0);
    }

    #[test]
    fn test_from_config() {
        let config = SimConfig::default();
        let sim = FluidSimulation::from_config(&config).unwrap();
        assert_eq!(sim.width(), config.width);
        assert_eq!(sim.params(), &config.solver);
    }
}
