//! Relaxation convergence diagnostic.
//!
//! Randomizes a grid and prints the fluid-cell Σ div² after every sweep for
//! a few over-relaxation factors.

use eulerian::diagnostics::divergence_sum_sq;
use eulerian::pressure::{relax_sweep, RelaxBuffers};
use eulerian::Grid;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SWEEPS: usize = 60;

fn main() {
    env_logger::init();

    println!("=== RELAXATION CONVERGENCE ===\n");

    let dt = 1.0 / 60.0;
    for over_relaxation in [1.0, 1.5, 1.9] {
        let mut grid = match Grid::new(24, 18, 1.0) {
            Ok(grid) => grid,
            Err(e) => {
                eprintln!("grid: {}", e);
                return;
            }
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        grid.randomize_velocities(&mut rng, 10.0);
        let mut buffers = RelaxBuffers::new(&grid);

        let initial = divergence_sum_sq(&grid);
        println!("o = {:.1}: initial Σdiv² = {:.4}", over_relaxation, initial);

        for sweep in 1..=SWEEPS {
            relax_sweep(&mut grid, &mut buffers, dt, over_relaxation);
            if sweep % 10 == 0 {
                let current = divergence_sum_sq(&grid);
                println!(
                    "  sweep {:3}: Σdiv² = {:10.4} ({:5.1}% of initial)",
                    sweep,
                    current,
                    100.0 * current / initial
                );
            }
        }
        println!();
    }
}
