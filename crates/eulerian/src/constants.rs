//! Reference values for the solver and the demo host.
//!
//! Defaults in `SolverParams` and `SimConfig` come from here so the
//! library, the examples, and the tests agree on what "reference behavior" means.

/// Over-relaxation factor applied to each divergence correction. Must lie in (0, 2).
pub const OVER_RELAXATION: f32 = 1.9;

/// Half-width of the uniform range used when randomizing velocities.
pub const VELOCITY_SCALE: f32 = 10.0;

/// Relaxation sweeps per step. 30-60 keeps a frame under budget on the demo grid.
pub const RELAX_ITERATIONS: usize = 40;

/// Seed for the velocity randomizer when none is configured.
pub const DEFAULT_SEED: u64 = 0x5EED_F1D0;

/// Demo window is 960x540 px with 64 px cells.
pub const DEMO_CELL_SIZE: f32 = 64.0;
pub const DEMO_WIDTH: usize = 960 / 64;
pub const DEMO_HEIGHT: usize = 540 / 64;

/// Fixed frame time used by headless runs (seconds).
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Frames between periodic stats log lines in the frame host.
pub const STATS_LOG_INTERVAL: u64 = 120;
