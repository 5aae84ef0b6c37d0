//! Frame driver for interactive hosts.
//!
//! Owns the simulation and turns per-frame user commands (reset, single
//! step, run/pause) into solver calls. Drawing happens elsewhere, after
//! `frame` returns and before the next call.

use crate::constants::STATS_LOG_INTERVAL;
use crate::FluidSimulation;

/// User action collected by the host during one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCommand {
    /// Re-randomize the velocity field
    Reset,
    /// Advance one extra step, also while paused
    SingleStep,
    /// Switch between continuous running and paused
    ToggleRun,
}

/// What a call to `FrameDriver::frame` did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub steps: u32,
    pub reset: bool,
}

pub struct FrameDriver {
    sim: FluidSimulation,
    running: bool,
    frames: u64,
    log_interval: u64,
    reported_non_finite: bool,
}

impl FrameDriver {
    /// Drive `sim`, stepping every frame.
    pub fn new(sim: FluidSimulation) -> Self {
        Self {
            sim,
            running: true,
            frames: 0,
            log_interval: STATS_LOG_INTERVAL,
            reported_non_finite: false,
        }
    }

    /// Drive `sim`, only stepping on `SingleStep` until `ToggleRun`.
    pub fn paused(sim: FluidSimulation) -> Self {
        Self {
            running: false,
            ..Self::new(sim)
        }
    }

    /// Frames between stats log lines. 0 disables them.
    pub fn with_log_interval(mut self, frames: u64) -> Self {
        self.log_interval = frames;
        self
    }

    /// Handle one host frame.
    ///
    /// Steps once if running, then applies `commands` in order. Negative
    /// frame times are treated as zero.
    pub fn frame(&mut self, frame_time: f32, commands: &[HostCommand]) -> FrameReport {
        let dt = frame_time.max(0.0);
        let mut report = FrameReport::default();

        if self.running {
            self.sim.step(dt);
            report.steps += 1;
        }

        for command in commands {
            match command {
                HostCommand::Reset => {
                    self.sim.reset();
                    report.reset = true;
                }
                HostCommand::SingleStep => {
                    self.sim.step(dt);
                    report.steps += 1;
                }
                HostCommand::ToggleRun => {
                    self.running = !self.running;
                    log::debug!("simulation {}", if self.running { "running" } else { "paused" });
                }
            }
        }

        self.frames += 1;
        if report.steps > 0 {
            self.log_stats();
        }
        report
    }

    fn log_stats(&mut self) {
        let check = self.log_interval > 0 && self.frames % self.log_interval == 0;
        if !check && self.reported_non_finite {
            return;
        }
        let stats = self.sim.stats();
        if !stats.finite && !self.reported_non_finite {
            log::warn!(
                "velocity field is no longer finite at t={:.3}s (frame {})",
                self.sim.time(),
                self.frames
            );
            self.reported_non_finite = true;
        }
        if check {
            log::debug!(
                "frame {} | t={:.2}s | div²={:.4} | max|div|={:.4} | max speed={:.3} | KE={:.3}",
                self.frames,
                self.sim.time(),
                stats.divergence_sum_sq,
                stats.divergence_max_abs,
                stats.max_speed,
                stats.kinetic_energy
            );
        }
    }

    pub fn simulation(&self) -> &FluidSimulation {
        &self.sim
    }

    pub fn into_simulation(self) -> FluidSimulation {
        self.sim
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Host frames handled so far (stepped or not).
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
