//! Semi-Lagrangian velocity advection.
//!
//! Every fluid cell traces backward from its center along its own (u, v)
//! and takes the velocity found there. All lookups read the field as it was
//! at the start of the pass; results go to scratch buffers that are swapped
//! in afterwards.

use glam::Vec2;

use crate::grid::{CellType, FaceField, Grid};
use crate::sampler::sample_velocity;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Scratch faces for double-buffered advection, allocated once per grid.
#[derive(Clone, Debug)]
pub struct AdvectionBuffers {
    u_next: FaceField,
    v_next: FaceField,
}

impl AdvectionBuffers {
    pub fn new(grid: &Grid) -> Self {
        Self {
            u_next: grid.u.clone(),
            v_next: grid.v.clone(),
        }
    }

    fn matches(&self, grid: &Grid) -> bool {
        self.u_next.nx() == grid.u.nx()
            && self.u_next.ny() == grid.u.ny()
            && self.v_next.nx() == grid.v.nx()
            && self.v_next.ny() == grid.v.ny()
    }
}

/// Position a fluid cell's velocity is pulled from, in cell-index units.
///
/// Velocities are length/time, so the displacement is divided by `cell_size`.
#[inline]
pub fn backtrace(grid: &Grid, i: usize, j: usize, dt: f32) -> Vec2 {
    let velocity = Vec2::new(
        grid.u.as_slice()[grid.u.index(i, j)],
        grid.v.as_slice()[grid.v.index(i, j)],
    );
    grid.cell_center(i, j) - velocity * (dt / grid.cell_size)
}

/// Advect u[i,j] and v[i,j] of every fluid cell in row `j`.
fn advect_row(grid: &Grid, j: usize, u_row: &mut [f32], v_row: &mut [f32], dt: f32) {
    for i in 0..grid.width {
        if grid.cell_type[grid.cell_index(i, j)] != CellType::Fluid {
            continue;
        }
        let old = sample_velocity(grid, backtrace(grid, i, j, dt));
        u_row[i] = old.x;
        v_row[i] = old.y;
    }
}

/// One advection pass over the whole grid.
pub fn advect_velocity(grid: &mut Grid, buffers: &mut AdvectionBuffers, dt: f32) {
    if !buffers.matches(grid) {
        *buffers = AdvectionBuffers::new(grid);
    }

    // Faces no fluid cell owns keep their current value
    buffers.u_next.as_mut_slice().copy_from_slice(grid.u.as_slice());
    buffers.v_next.as_mut_slice().copy_from_slice(grid.v.as_slice());

    {
        let src: &Grid = grid;
        let u_stride = src.u.nx();
        let v_stride = src.v.nx();

        // u has `height` rows and v has `height + 1`; zip stops at the shorter
        #[cfg(feature = "parallel")]
        buffers
            .u_next
            .as_mut_slice()
            .par_chunks_mut(u_stride)
            .zip(buffers.v_next.as_mut_slice().par_chunks_mut(v_stride))
            .enumerate()
            .for_each(|(j, (u_row, v_row))| advect_row(src, j, u_row, v_row, dt));

        #[cfg(not(feature = "parallel"))]
        buffers
            .u_next
            .as_mut_slice()
            .chunks_mut(u_stride)
            .zip(buffers.v_next.as_mut_slice().chunks_mut(v_stride))
            .enumerate()
            .for_each(|(j, (u_row, v_row))| advect_row(src, j, u_row, v_row, dt));
    }

    std::mem::swap(&mut grid.u, &mut buffers.u_next);
    std::mem::swap(&mut grid.v, &mut buffers.v_next);
}
