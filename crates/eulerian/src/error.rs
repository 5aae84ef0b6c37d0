//! Error type for construction-time misuse and bounds-checked access.

/// Which array an index was checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Cell-centered arrays (cell type, divergence)
    Cell,
    /// Horizontal velocity faces, `(width+1) x height`
    U,
    /// Vertical velocity faces, `width x (height+1)`
    V,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Cell => write!(f, "cell"),
            FieldKind::U => write!(f, "u"),
            FieldKind::V => write!(f, "v"),
        }
    }
}

/// Solver error.
///
/// Only construction and indexed access can fail. A successfully built
/// simulation steps without ever returning an error.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// Grid width or height is zero.
    InvalidDimensions { width: usize, height: usize },
    /// Cell size is not a positive finite number.
    InvalidCellSize(f32),
    /// A solver parameter is out of its accepted range.
    InvalidParameter { name: &'static str, reason: String },
    /// Index outside the shape of the addressed array.
    OutOfRange {
        field: FieldKind,
        i: usize,
        j: usize,
        width: usize,
        height: usize,
    },
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive, got {}x{}", width, height)
            }
            SimError::InvalidCellSize(size) => {
                write!(f, "cell size must be positive and finite, got {}", size)
            }
            SimError::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{}`: {}", name, reason)
            }
            SimError::OutOfRange { field, i, j, width, height } => write!(
                f,
                "{} index ({}, {}) out of range for {}x{} array",
                field, i, j, width, height
            ),
        }
    }
}

impl std::error::Error for SimError {}
