//! External body forces (gravity and friends).

use glam::Vec2;

use crate::grid::Grid;

/// Add `force * dt` to every face that separates two fluid cells.
///
/// Faces touching a wall are left alone so the force does not pump flux
/// through the border.
pub fn apply_body_force(grid: &mut Grid, force: Vec2, dt: f32) {
    if force == Vec2::ZERO {
        return;
    }
    let du = force.x * dt;
    let dv = force.y * dt;

    if du != 0.0 {
        for j in 0..grid.height {
            for i in 1..grid.width {
                let (ii, jj) = (i as i32, j as i32);
                if grid.is_fluid(ii - 1, jj) && grid.is_fluid(ii, jj) {
                    let idx = grid.u.index(i, j);
                    grid.u.as_mut_slice()[idx] += du;
                }
            }
        }
    }

    if dv != 0.0 {
        for j in 1..grid.height {
            for i in 0..grid.width {
                let (ii, jj) = (i as i32, j as i32);
                if grid.is_fluid(ii, jj - 1) && grid.is_fluid(ii, jj) {
                    let idx = grid.v.index(i, j);
                    grid.v.as_mut_slice()[idx] += dv;
                }
            }
        }
    }
}
