//! Divergence and approximate pressure projection.
//!
//! There is no pressure field. Relaxation pushes each fluid cell's net
//! outflow back onto its open faces, sweeping the grid in row-major order
//! with over-relaxation. Each sweep works from the divergence measured when
//! it began. The error shrinks with the number of sweeps but never reaches
//! exactly zero.

use crate::grid::{CellType, FaceField, Grid};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Net outflow of cell (i, j): u[i+1,j] - u[i,j] + v[i,j+1] - v[i,j].
///
/// Positive is a source, negative a sink. Reads the faces as they are now.
#[inline]
pub fn cell_divergence(u: &FaceField, v: &FaceField, i: usize, j: usize) -> f32 {
    let u_right = u.as_slice()[u.index(i + 1, j)];
    let u_left = u.as_slice()[u.index(i, j)];
    let v_top = v.as_slice()[v.index(i, j + 1)];
    let v_bottom = v.as_slice()[v.index(i, j)];
    u_right - u_left + v_top - v_bottom
}

/// Fill `out` (one value per cell, row-major) with the divergence of every cell.
fn fill_divergence(u: &FaceField, v: &FaceField, width: usize, out: &mut [f32]) {
    let fill_row = |(j, row): (usize, &mut [f32])| {
        for (i, d) in row.iter_mut().enumerate() {
            *d = cell_divergence(u, v, i, j);
        }
    };

    #[cfg(feature = "parallel")]
    out.par_chunks_mut(width).enumerate().for_each(fill_row);

    #[cfg(not(feature = "parallel"))]
    out.chunks_mut(width).enumerate().for_each(fill_row);
}

/// Overwrite `grid.divergence` for every cell, walls included.
pub fn compute_divergence(grid: &mut Grid) {
    fill_divergence(&grid.u, &grid.v, grid.width, &mut grid.divergence);
}

/// Per-sweep divergence snapshot, allocated once per grid.
///
/// Kept apart from `Grid::divergence` so the grid keeps the step's
/// pre-relaxation values.
#[derive(Clone, Debug)]
pub struct RelaxBuffers {
    divergence: Vec<f32>,
}

impl RelaxBuffers {
    pub fn new(grid: &Grid) -> Self {
        Self {
            divergence: vec![0.0; grid.width * grid.height],
        }
    }

    /// Divergence captured at the start of the last sweep.
    pub fn divergence(&self) -> &[f32] {
        &self.divergence
    }
}

/// Fluid indicator of the left, right, bottom, and top neighbours of cell (i, j).
#[inline]
fn neighbour_indicators(grid: &Grid, i: usize, j: usize) -> [f32; 4] {
    let (i, j) = (i as i32, j as i32);
    [
        grid.fluid_indicator(i - 1, j),
        grid.fluid_indicator(i + 1, j),
        grid.fluid_indicator(i, j - 1),
        grid.fluid_indicator(i, j + 1),
    ]
}

/// Run `iterations` relaxation sweeps.
///
/// Each correction is scaled by `over_relaxation * dt`. Large `dt` can make
/// the sweep unstable; that is not detected.
pub fn relax_divergence(
    grid: &mut Grid,
    buffers: &mut RelaxBuffers,
    dt: f32,
    iterations: usize,
    over_relaxation: f32,
) {
    for _ in 0..iterations {
        relax_sweep(grid, buffers, dt, over_relaxation);
    }
}

/// One row-major sweep over all fluid cells.
///
/// Divergence is snapshotted once when the sweep starts and is not
/// recomputed while faces change, so every cell is corrected by the
/// divergence it had before the sweep.
pub fn relax_sweep(grid: &mut Grid, buffers: &mut RelaxBuffers, dt: f32, over_relaxation: f32) {
    if buffers.divergence.len() != grid.width * grid.height {
        *buffers = RelaxBuffers::new(grid);
    }
    fill_divergence(&grid.u, &grid.v, grid.width, &mut buffers.divergence);

    for j in 0..grid.height {
        for i in 0..grid.width {
            let cell = grid.cell_index(i, j);
            if grid.cell_type[cell] != CellType::Fluid {
                continue;
            }

            let [s_left, s_right, s_bottom, s_top] = neighbour_indicators(grid, i, j);
            let s = s_left + s_right + s_bottom + s_top;
            // Fully enclosed cell: nothing to push the divergence onto
            if s == 0.0 {
                continue;
            }

            let correction = over_relaxation * dt * buffers.divergence[cell] / s;

            let u_left = grid.u.index(i, j);
            let u_right = grid.u.index(i + 1, j);
            let v_bottom = grid.v.index(i, j);
            let v_top = grid.v.index(i, j + 1);

            let u = grid.u.as_mut_slice();
            u[u_left] += correction * s_left;
            u[u_right] -= correction * s_right;

            let v = grid.v.as_mut_slice();
            v[v_bottom] += correction * s_bottom;
            v[v_top] -= correction * s_top;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relax(grid: &mut Grid, dt: f32, iterations: usize, over_relaxation: f32) {
        let mut buffers = RelaxBuffers::new(grid);
        relax_divergence(grid, &mut buffers, dt, iterations, over_relaxation);
    }

    #[test]
    fn test_single_face_divergence_is_local() {
        let mut grid = Grid::new(4, 4, 1.0).unwrap();
        grid.set_u(2, 2, 2.0).unwrap();
        compute_divergence(&mut grid);

        for j in 0..4 {
            for i in 0..4 {
                let d = grid.divergence_at(i, j).unwrap();
                match (i, j) {
                    (1, 2) => assert_eq!(d, 2.0),
                    (2, 2) => assert_eq!(d, -2.0),
                    _ => assert_eq!(d, 0.0, "cell ({}, {})", i, j),
                }
            }
        }
    }

    #[test]
    fn test_vertical_face_divergence() {
        let mut grid = Grid::new(5, 5, 1.0).unwrap();
        grid.set_v(3, 1, -1.5).unwrap();
        compute_divergence(&mut grid);
        // Face sits between cells (3,0) below and (3,1) above
        assert_eq!(grid.divergence_at(3, 0).unwrap(), -1.5);
        assert_eq!(grid.divergence_at(3, 1).unwrap(), 1.5);
        let nonzero = grid.divergence().iter().filter(|&&d| d != 0.0).count();
        assert_eq!(nonzero, 2);
    }

    #[test]
    fn test_divergence_ignores_cell_size() {
        let mut grid = Grid::new(4, 4, 32.0).unwrap();
        grid.set_u(2, 1, 3.0).unwrap();
        compute_divergence(&mut grid);
        assert_eq!(grid.divergence_at(1, 1).unwrap(), 3.0);
    }

    #[test]
    fn test_neighbour_indicators() {
        let grid = Grid::new(5, 5, 1.0).unwrap();
        assert_eq!(neighbour_indicators(&grid, 2, 2), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(neighbour_indicators(&grid, 1, 1), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(neighbour_indicators(&grid, 2, 1), [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(neighbour_indicators(&grid, 0, 0), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_enclosed_cell_is_skipped() {
        // 3x3: the single fluid cell has only wall neighbours
        let mut grid = Grid::new(3, 3, 1.0).unwrap();
        grid.set_u(2, 1, 5.0).unwrap();
        let before = grid.clone();
        relax(&mut grid, 1.0, 10, 1.9);
        assert_eq!(grid.u().as_slice(), before.u().as_slice());
        assert_eq!(grid.v().as_slice(), before.v().as_slice());
    }

    #[test]
    fn test_two_cell_channel_relaxes_to_zero() {
        // 4x3 has fluid cells (1,1) and (2,1) sharing one face
        let mut grid = Grid::new(4, 3, 1.0).unwrap();
        grid.set_u(2, 1, 1.0).unwrap();
        // Both cells push half of their pre-sweep divergence onto the shared face
        relax(&mut grid, 0.5, 1, 1.0);
        assert_eq!(grid.u_at(2, 1).unwrap(), 0.0);
        // Wall faces never move
        assert_eq!(grid.u_at(1, 1).unwrap(), 0.0);
        assert_eq!(grid.u_at(3, 1).unwrap(), 0.0);
        assert_eq!(cell_divergence(grid.u(), grid.v(), 1, 1), 0.0);
        assert_eq!(cell_divergence(grid.u(), grid.v(), 2, 1), 0.0);
    }

    #[test]
    fn test_sweep_uses_divergence_from_sweep_start() {
        // Same channel at dt = 1: cell (1,1) zeroes the face, then cell (2,1)
        // still applies its pre-sweep divergence of -1
        let mut grid = Grid::new(4, 3, 1.0).unwrap();
        grid.set_u(2, 1, 1.0).unwrap();
        let mut buffers = RelaxBuffers::new(&grid);
        relax_sweep(&mut grid, &mut buffers, 1.0, 1.0);
        assert_eq!(grid.u_at(2, 1).unwrap(), -1.0);
        assert_eq!(buffers.divergence()[grid.cell_index(1, 1)], 1.0);
        assert_eq!(buffers.divergence()[grid.cell_index(2, 1)], -1.0);
    }

    #[test]
    fn test_relaxation_keeps_stored_divergence() {
        let mut grid = Grid::new(6, 6, 1.0).unwrap();
        grid.set_u(3, 3, 4.0).unwrap();
        compute_divergence(&mut grid);
        let stored = grid.divergence().to_vec();
        relax(&mut grid, 0.1, 10, 1.9);
        assert_eq!(grid.divergence(), stored.as_slice());
    }

    #[test]
    fn test_zero_dt_leaves_field_untouched() {
        let mut grid = Grid::new(6, 6, 1.0).unwrap();
        grid.set_u(3, 3, 4.0).unwrap();
        grid.set_v(2, 4, -1.0).unwrap();
        let before = grid.clone();
        relax(&mut grid, 0.0, 20, 1.9);
        assert_eq!(grid.u().as_slice(), before.u().as_slice());
        assert_eq!(grid.v().as_slice(), before.v().as_slice());
    }

    #[test]
    fn test_wall_cells_do_not_drive_corrections() {
        // Divergence only inside a wall cell: no fluid cell sees it, nothing moves
        let mut grid = Grid::new(5, 5, 1.0).unwrap();
        grid.set_u(0, 2, 3.0).unwrap();
        let before = grid.clone();
        relax(&mut grid, 1.0, 5, 1.9);
        assert_eq!(grid.u().as_slice(), before.u().as_slice());
    }

    #[test]
    fn test_buffers_resize_for_other_grid() {
        let small = Grid::new(3, 3, 1.0).unwrap();
        let mut buffers = RelaxBuffers::new(&small);
        let mut grid = Grid::new(7, 5, 1.0).unwrap();
        grid.set_u(3, 2, 1.0).unwrap();
        relax_sweep(&mut grid, &mut buffers, 0.1, 1.9);
        assert_eq!(buffers.divergence().len(), 35);
    }
}
