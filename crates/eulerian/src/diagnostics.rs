//! Field statistics for logging and tests.

use crate::grid::{CellType, Grid};
use crate::pressure::cell_divergence;

/// Summary of the current velocity field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    /// Σ div² over fluid cells, from the faces as they are now
    pub divergence_sum_sq: f32,
    /// max |div| over fluid cells
    pub divergence_max_abs: f32,
    /// Largest |u| or |v| on a face touching a fluid cell
    pub max_speed: f32,
    /// ½ Σ (u² + v²) over faces touching a fluid cell
    pub kinetic_energy: f32,
    /// False once any face holds NaN or infinity
    pub finite: bool,
}

/// Σ div² over fluid cells, evaluated from the current faces.
///
/// Unlike `Grid::divergence`, this never goes stale.
pub fn divergence_sum_sq(grid: &Grid) -> f32 {
    let mut sum = 0.0;
    for j in 0..grid.height {
        for i in 0..grid.width {
            if grid.cell_type[grid.cell_index(i, j)] == CellType::Fluid {
                let d = cell_divergence(&grid.u, &grid.v, i, j);
                sum += d * d;
            }
        }
    }
    sum
}

impl FieldStats {
    pub fn compute(grid: &Grid) -> Self {
        let mut stats = FieldStats {
            finite: true,
            ..Default::default()
        };

        for j in 0..grid.height {
            for i in 0..grid.width {
                if grid.cell_type[grid.cell_index(i, j)] != CellType::Fluid {
                    continue;
                }
                let d = cell_divergence(&grid.u, &grid.v, i, j);
                stats.divergence_sum_sq += d * d;
                stats.divergence_max_abs = stats.divergence_max_abs.max(d.abs());
            }
        }

        for j in 0..grid.u.ny() {
            for i in 0..grid.u.nx() {
                let (ii, jj) = (i as i32, j as i32);
                if grid.is_fluid(ii - 1, jj) || grid.is_fluid(ii, jj) {
                    stats.add_face(grid.u.as_slice()[grid.u.index(i, j)]);
                }
            }
        }
        for j in 0..grid.v.ny() {
            for i in 0..grid.v.nx() {
                let (ii, jj) = (i as i32, j as i32);
                if grid.is_fluid(ii, jj - 1) || grid.is_fluid(ii, jj) {
                    stats.add_face(grid.v.as_slice()[grid.v.index(i, j)]);
                }
            }
        }

        stats.finite &= grid.u.as_slice().iter().all(|x| x.is_finite())
            && grid.v.as_slice().iter().all(|x| x.is_finite());
        stats
    }

    fn add_face(&mut self, value: f32) {
        self.max_speed = self.max_speed.max(value.abs());
        self.kinetic_energy += 0.5 * value * value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_at_rest() {
        let grid = Grid::new(6, 4, 1.0).unwrap();
        let stats = FieldStats::compute(&grid);
        assert_eq!(stats.divergence_sum_sq, 0.0);
        assert_eq!(stats.max_speed, 0.0);
        assert_eq!(stats.kinetic_energy, 0.0);
        assert!(stats.finite);
    }

    #[test]
    fn test_single_face() {
        let mut grid = Grid::new(4, 4, 1.0).unwrap();
        grid.set_u(2, 2, 2.0).unwrap();
        let stats = FieldStats::compute(&grid);
        assert_eq!(stats.divergence_sum_sq, 8.0);
        assert_eq!(stats.divergence_max_abs, 2.0);
        assert_eq!(stats.max_speed, 2.0);
        assert_eq!(stats.kinetic_energy, 2.0);
        assert_eq!(divergence_sum_sq(&grid), 8.0);
    }

    #[test]
    fn test_outer_faces_excluded() {
        let mut grid = Grid::new(4, 4, 1.0).unwrap();
        // Face between two wall cells
        grid.set_u(1, 0, 50.0).unwrap();
        let stats = FieldStats::compute(&grid);
        assert_eq!(stats.max_speed, 0.0);
    }

    #[test]
    fn test_nan_detected() {
        let mut grid = Grid::new(4, 4, 1.0).unwrap();
        grid.set_v(0, 0, f32::NAN).unwrap();
        assert!(!FieldStats::compute(&grid).finite);
    }
}
