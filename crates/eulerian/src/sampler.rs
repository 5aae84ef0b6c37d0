//! Bilinear velocity sampling at arbitrary positions on the staggered grid.
//!
//! Positions are in cell-index units. Each component is sampled around its
//! own staggered location: u is shifted by -0.5 in y, v by -0.5 in x. Corner
//! indices are clamped into the component's array, while the blend fractions
//! come from the unclamped position, so a sample is always a convex
//! combination of four stored values and never extrapolates.

use glam::Vec2;

use crate::grid::{FaceField, Grid};

/// The four stored samples and blend fractions behind one bilinear lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil {
    /// (i0,j0), (i1,j0), (i0,j1), (i1,j1) after clamping
    pub corners: [(usize, usize); 4],
    pub fx: f32,
    pub fy: f32,
}

impl Stencil {
    /// Build the stencil for `pos` on `field`, honoring the field's staggered offset.
    pub fn new(field: &FaceField, pos: Vec2) -> Self {
        let local = pos - field.offset();
        let x0 = local.x.floor();
        let y0 = local.y.floor();
        let fx = (local.x - x0).clamp(0.0, 1.0);
        let fy = (local.y - y0).clamp(0.0, 1.0);

        // `as` saturates, so positions far outside the grid still clamp cleanly
        let i = x0 as i32;
        let j = y0 as i32;
        let max_i = field.nx() as i32 - 1;
        let max_j = field.ny() as i32 - 1;
        let i0 = i.clamp(0, max_i) as usize;
        let i1 = i.saturating_add(1).clamp(0, max_i) as usize;
        let j0 = j.clamp(0, max_j) as usize;
        let j1 = j.saturating_add(1).clamp(0, max_j) as usize;

        Self {
            corners: [(i0, j0), (i1, j0), (i0, j1), (i1, j1)],
            fx,
            fy,
        }
    }

    /// Blend weights in corner order. Non-negative, sum to one.
    pub fn weights(&self) -> [f32; 4] {
        let (fx, fy) = (self.fx, self.fy);
        [
            (1.0 - fx) * (1.0 - fy),
            fx * (1.0 - fy),
            (1.0 - fx) * fy,
            fx * fy,
        ]
    }

    /// Interpolate `field` over this stencil.
    #[inline]
    pub fn apply(&self, field: &FaceField) -> f32 {
        let at = |(i, j): (usize, usize)| field.as_slice()[field.index(i, j)];
        let s00 = at(self.corners[0]);
        let s10 = at(self.corners[1]);
        let s01 = at(self.corners[2]);
        let s11 = at(self.corners[3]);

        let s0 = s00 * (1.0 - self.fx) + s10 * self.fx;
        let s1 = s01 * (1.0 - self.fx) + s11 * self.fx;
        s0 * (1.0 - self.fy) + s1 * self.fy
    }

    /// Smallest and largest of the four corner samples.
    pub fn corner_range(&self, field: &FaceField) -> (f32, f32) {
        self.corners.iter().fold((f32::MAX, f32::MIN), |(lo, hi), &(i, j)| {
            let s = field.as_slice()[field.index(i, j)];
            (lo.min(s), hi.max(s))
        })
    }
}

/// Stencil used for the u component at `pos`.
pub fn u_stencil(grid: &Grid, pos: Vec2) -> Stencil {
    Stencil::new(&grid.u, pos)
}

/// Stencil used for the v component at `pos`.
pub fn v_stencil(grid: &Grid, pos: Vec2) -> Stencil {
    Stencil::new(&grid.v, pos)
}

/// Horizontal velocity at `pos`.
pub fn sample_u(grid: &Grid, pos: Vec2) -> f32 {
    u_stencil(grid, pos).apply(&grid.u)
}

/// Vertical velocity at `pos`.
pub fn sample_v(grid: &Grid, pos: Vec2) -> f32 {
    v_stencil(grid, pos).apply(&grid.v)
}

/// Full velocity at `pos` (cell-index units).
pub fn sample_velocity(grid: &Grid, pos: Vec2) -> Vec2 {
    Vec2::new(sample_u(grid, pos), sample_v(grid, pos))
}
