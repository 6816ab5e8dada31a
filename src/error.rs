use derive_more::{Display, From};

use crate::types::Value;

pub type Result<T> = core::result::Result<T, ZPlaneError>;

#[derive(Debug, Display, From)]
pub enum ZPlaneError {
    /// An axis of the domain has `min == max`.
    #[display("degenerate {axis} axis: min and max are both {value}")]
    DegenerateDomain { axis: &'static str, value: Value },

    /// An axis of the domain has `min > max` or a non-finite bound.
    #[display("invalid {axis} axis bounds [{min}, {max}]")]
    InvalidDomain {
        axis: &'static str,
        min: Value,
        max: Value,
    },

    /// Grid or tessellation resolution is zero.
    #[display("{what} resolution must be at least {minimum}, got {value}")]
    InvalidResolution {
        what: &'static str,
        value: usize,
        minimum: usize,
    },

    /// A waypoint duration is negative or not finite.
    #[display("waypoint {index} has invalid duration {duration}")]
    InvalidDuration { index: usize, duration: Value },

    /// A tick delta is negative or not finite.
    #[display("invalid tick delta {delta}")]
    InvalidDelta { delta: Value },

    /// A scalar parameter (ε, cap, zero, pole, waypoint coordinate) is out of range.
    #[display("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: Value },

    /// A magnitude grid is not square.
    #[display("magnitude grid must be square, got {rows} x {cols}")]
    NonSquareGrid { rows: usize, cols: usize },

    /// A magnitude was non-finite (or negative) after regularization and clipping.
    #[display("non-finite magnitude at grid index [{row}, {col}]")]
    NonFiniteMagnitude { row: usize, col: usize },

    #[from]
    #[display("grid shape error: {_0}")]
    Shape(ndarray::ShapeError),
}

impl std::error::Error for ZPlaneError {}
