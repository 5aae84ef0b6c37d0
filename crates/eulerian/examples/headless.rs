//! Headless run of the demo scene.
//!
//! Randomizes the field, then drives it through the frame host for a few
//! seconds of simulated time and prints field stats along the way.
//!
//! Usage: cargo run --example headless [config.json]
//! Set RUST_LOG=debug to see the host's periodic stats lines.

use std::path::Path;

use eulerian::constants::FRAME_DT;
use eulerian::{FluidSimulation, FrameDriver, HostCommand, SimConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load_json(Path::new(&path))?,
        None => SimConfig::default(),
    };

    println!("=== HEADLESS EULERIAN RUN ===");
    println!(
        "Grid: {}x{} cells of {} | {} sweeps, o={}",
        config.width,
        config.height,
        config.cell_size,
        config.solver.relax_iterations,
        config.solver.over_relaxation
    );

    let sim = FluidSimulation::from_config(&config)?;
    let mut driver = FrameDriver::new(sim);

    // Same as pressing R on the first frame
    driver.frame(FRAME_DT, &[HostCommand::Reset]);

    for frame in 1..=300 {
        driver.frame(FRAME_DT, &[]);

        if frame % 30 == 0 {
            let sim = driver.simulation();
            let stats = sim.stats();
            println!(
                "Frame {:4} t={:5.2}s | div²={:10.4} | max|div|={:8.4} | max speed={:7.3} | KE={:9.3}",
                frame,
                sim.time(),
                stats.divergence_sum_sq,
                stats.divergence_max_abs,
                stats.max_speed,
                stats.kinetic_energy
            );
            if !stats.finite {
                println!("!!! field went non-finite, stopping");
                break;
            }
        }
    }

    let sim = driver.simulation();
    let center = sim.sample_velocity(eulerian::Vec2::new(
        sim.width() as f32 * 0.5,
        sim.height() as f32 * 0.5,
    ));
    println!("\nVelocity at grid center: ({:.3}, {:.3})", center.x, center.y);
    let (u_min, u_max) = sim.grid().u().min_max();
    let (v_min, v_max) = sim.grid().v().min_max();
    println!("u range [{:.3}, {:.3}] | v range [{:.3}, {:.3}]", u_min, u_max, v_min, v_max);
    Ok(())
}
