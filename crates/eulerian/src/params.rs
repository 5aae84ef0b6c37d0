//! Solver parameters and on-disk simulation config.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::SimError;

/// Construction-time solver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Relaxation sweeps per step
    pub relax_iterations: usize,
    /// Over-relaxation factor, (0, 2). Values above 1 speed up convergence.
    pub over_relaxation: f32,
    /// Randomized velocities are drawn from [-velocity_scale, velocity_scale]
    pub velocity_scale: f32,
    /// Seed for the velocity randomizer
    pub seed: u64,
    /// Constant acceleration added to fluid faces before projection (length/time²).
    /// Zero disables the force pass entirely.
    pub body_force: Vec2,
    /// Randomize the field at construction instead of starting from rest
    pub randomize_on_create: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            relax_iterations: constants::RELAX_ITERATIONS,
            over_relaxation: constants::OVER_RELAXATION,
            velocity_scale: constants::VELOCITY_SCALE,
            seed: constants::DEFAULT_SEED,
            body_force: Vec2::ZERO,
            randomize_on_create: false,
        }
    }
}

impl SolverParams {
    /// Check ranges. Called by every `FluidSimulation` constructor.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.over_relaxation > 0.0 && self.over_relaxation < 2.0) {
            return Err(SimError::InvalidParameter {
                name: "over_relaxation",
                reason: format!("must lie in (0, 2), got {}", self.over_relaxation),
            });
        }
        if !(self.velocity_scale.is_finite() && self.velocity_scale >= 0.0) {
            return Err(SimError::InvalidParameter {
                name: "velocity_scale",
                reason: format!("must be finite and non-negative, got {}", self.velocity_scale),
            });
        }
        if !self.body_force.is_finite() {
            return Err(SimError::InvalidParameter {
                name: "body_force",
                reason: format!("must be finite, got {:?}", self.body_force),
            });
        }
        if self.over_relaxation <= 1.0 {
            log::warn!(
                "over_relaxation {} <= 1.0, relaxation will converge slowly",
                self.over_relaxation
            );
        }
        Ok(())
    }
}

/// Grid shape plus solver parameters, as stored in a JSON config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub solver: SolverParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: constants::DEMO_WIDTH,
            height: constants::DEMO_HEIGHT,
            cell_size: constants::DEMO_CELL_SIZE,
            solver: SolverParams::default(),
        }
    }
}

impl SimConfig {
    /// Save config to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load config from a JSON file. Missing fields take their defaults.
    pub fn load_json(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&json)?;
        config.solver.validate()?;
        log::debug!(
            "loaded config {}: {}x{} cells of {}",
            path.display(),
            config.width,
            config.height,
            config.cell_size
        );
        Ok(config)
    }
}
