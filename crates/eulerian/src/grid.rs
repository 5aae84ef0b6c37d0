//! 2D MAC (Marker-and-Cell) staggered grid.
//!
//! Velocity components live on cell faces:
//! - u (horizontal) on vertical faces, sample (i, j) at (i, j+0.5)
//! - v (vertical) on horizontal faces, sample (i, j) at (i+0.5, j)
//!
//! Positions are in cell-index units. Cell type and divergence are stored at
//! cell centers. Border cells are walls, everything else is fluid, and that
//! classification never changes after construction.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{FieldKind, SimError};

/// Cell classification for relaxation and advection.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CellType {
    /// Border cell. Never relaxed or advected.
    Wall,
    /// Interior cell
    Fluid,
}

/// Flat row-major array of face samples with a known shape and staggered offset.
///
/// `offset` is the position of sample (0, 0) in cell-index space, so sample
/// (i, j) sits at `(i, j) + offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceField {
    nx: usize,
    ny: usize,
    offset: Vec2,
    data: Vec<f32>,
}

impl FaceField {
    pub fn new(nx: usize, ny: usize, offset: Vec2) -> Self {
        Self {
            nx,
            ny,
            offset,
            data: vec![0.0; nx * ny],
        }
    }

    /// Samples per row
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of rows
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    #[inline]
    pub fn in_bounds(&self, i: usize, j: usize) -> bool {
        i < self.nx && j < self.ny
    }

    /// Bounds-checked read.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if self.in_bounds(i, j) {
            Some(self.data[self.index(i, j)])
        } else {
            None
        }
    }

    /// Native position of sample (i, j) in cell-index units.
    #[inline]
    pub fn position(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new(i as f32, j as f32) + self.offset
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Smallest and largest stored sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &x| (lo.min(x), hi.max(x)))
    }
}

/// Staggered grid owning the velocity faces, divergence, and cell types.
#[derive(Clone, Debug)]
pub struct Grid {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cell_size: f32,

    /// Horizontal velocity on vertical faces, (width+1) x height
    pub(crate) u: FaceField,
    /// Vertical velocity on horizontal faces, width x (height+1)
    pub(crate) v: FaceField,

    /// Net outflow per cell, overwritten by `compute_divergence`
    pub(crate) divergence: Vec<f32>,

    pub(crate) cell_type: Vec<CellType>,
}

impl Grid {
    /// Allocate a grid at rest. Border cells become walls, the rest fluid.
    pub fn new(width: usize, height: usize, cell_size: f32) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SimError::InvalidCellSize(cell_size));
        }

        let cell_count = width * height;
        let mut cell_type = vec![CellType::Fluid; cell_count];
        for j in 0..height {
            for i in 0..width {
                if i == 0 || j == 0 || i == width - 1 || j == height - 1 {
                    cell_type[j * width + i] = CellType::Wall;
                }
            }
        }

        Ok(Self {
            width,
            height,
            cell_size,
            u: FaceField::new(width + 1, height, Vec2::new(0.0, 0.5)),
            v: FaceField::new(width, height + 1, Vec2::new(0.5, 0.0)),
            divergence: vec![0.0; cell_count],
            cell_type,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    // ========== Index helpers ==========

    /// Index into cell-centered arrays (cell type, divergence)
    #[inline]
    pub fn cell_index(&self, i: usize, j: usize) -> usize {
        j * self.width + i
    }

    /// Center of cell (i, j) in cell-index units.
    #[inline]
    pub fn cell_center(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new(i as f32 + 0.5, j as f32 + 0.5)
    }

    fn check_cell(&self, i: usize, j: usize) -> Result<usize, SimError> {
        if i < self.width && j < self.height {
            Ok(self.cell_index(i, j))
        } else {
            Err(SimError::OutOfRange {
                field: FieldKind::Cell,
                i,
                j,
                width: self.width,
                height: self.height,
            })
        }
    }

    // ========== Classification ==========

    /// True for in-range fluid cells. Anything outside the grid counts as wall.
    #[inline]
    pub fn is_fluid(&self, i: i32, j: i32) -> bool {
        if i < 0 || j < 0 || i >= self.width as i32 || j >= self.height as i32 {
            return false;
        }
        self.cell_type[self.cell_index(i as usize, j as usize)] == CellType::Fluid
    }

    /// 1.0 for fluid, 0.0 for wall or out of range.
    #[inline]
    pub fn fluid_indicator(&self, i: i32, j: i32) -> f32 {
        if self.is_fluid(i, j) {
            1.0
        } else {
            0.0
        }
    }

    pub fn fluid_cell_count(&self) -> usize {
        self.cell_type.iter().filter(|&&t| t == CellType::Fluid).count()
    }

    // ========== Read accessors ==========

    pub fn cell_type_at(&self, i: usize, j: usize) -> Result<CellType, SimError> {
        let idx = self.check_cell(i, j)?;
        Ok(self.cell_type[idx])
    }

    pub fn divergence_at(&self, i: usize, j: usize) -> Result<f32, SimError> {
        let idx = self.check_cell(i, j)?;
        Ok(self.divergence[idx])
    }

    pub fn u_at(&self, i: usize, j: usize) -> Result<f32, SimError> {
        self.u.get(i, j).ok_or(SimError::OutOfRange {
            field: FieldKind::U,
            i,
            j,
            width: self.u.nx(),
            height: self.u.ny(),
        })
    }

    pub fn v_at(&self, i: usize, j: usize) -> Result<f32, SimError> {
        self.v.get(i, j).ok_or(SimError::OutOfRange {
            field: FieldKind::V,
            i,
            j,
            width: self.v.nx(),
            height: self.v.ny(),
        })
    }

    /// Horizontal velocity faces.
    pub fn u(&self) -> &FaceField {
        &self.u
    }

    /// Vertical velocity faces.
    pub fn v(&self) -> &FaceField {
        &self.v
    }

    pub fn divergence(&self) -> &[f32] {
        &self.divergence
    }

    pub fn cell_types(&self) -> &[CellType] {
        &self.cell_type
    }

    // ========== Mutation ==========

    pub(crate) fn set_u(&mut self, i: usize, j: usize, value: f32) -> Result<(), SimError> {
        if !self.u.in_bounds(i, j) {
            return Err(SimError::OutOfRange {
                field: FieldKind::U,
                i,
                j,
                width: self.u.nx(),
                height: self.u.ny(),
            });
        }
        let idx = self.u.index(i, j);
        self.u.data[idx] = value;
        Ok(())
    }

    pub(crate) fn set_v(&mut self, i: usize, j: usize, value: f32) -> Result<(), SimError> {
        if !self.v.in_bounds(i, j) {
            return Err(SimError::OutOfRange {
                field: FieldKind::V,
                i,
                j,
                width: self.v.nx(),
                height: self.v.ny(),
            });
        }
        let idx = self.v.index(i, j);
        self.v.data[idx] = value;
        Ok(())
    }

    /// Draw every face sample, wall faces included, uniformly from [-scale, scale].
    ///
    /// Leaves `divergence` stale; callers recompute it.
    pub fn randomize_velocities<R: Rng + ?Sized>(&mut self, rng: &mut R, scale: f32) {
        for u in self.u.as_mut_slice() {
            *u = rng.gen_range(-scale..=scale);
        }
        for v in self.v.as_mut_slice() {
            *v = rng.gen_range(-scale..=scale);
        }
    }
}
