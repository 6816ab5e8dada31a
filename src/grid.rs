use ndarray::Array2;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::{
    config::Domain,
    error::{Result, ZPlaneError},
    interp::axis_coordinate,
    transfer::TransferFunction,
    types::{Complex, Value},
};

/// Coordinate of grid cell `[row, col]`: `col` walks the real axis, `row` the imaginary axis.
#[inline]
pub fn grid_coordinate(domain: &Domain, resolution: usize, row: usize, col: usize) -> Complex {
    Complex::new(
        axis_coordinate(col, resolution, domain.real.min, domain.real.max),
        axis_coordinate(row, resolution, domain.imag.min, domain.imag.max),
    )
}

/// Evaluates the clipped magnitude of `transfer` on a `resolution × resolution` grid.
///
/// The result is indexed `[row, col]` = `[imag_index, real_index]`. Rows are evaluated in
/// parallel with Rayon; every cell is computed independently so the output does not depend
/// on scheduling.
///
/// ```text
/// Per cell:
/// 1. grid_coordinate       →  z
/// 2. transfer.regularized  →  (z - zero) / (z - pole + ε)
/// 3. norm, clamp [0, cap]  →  magnitude
/// 4. NaN                   →  NonFiniteMagnitude
/// ```
pub fn evaluate_magnitudes(
    domain: &Domain,
    resolution: usize,
    transfer: &TransferFunction,
    cap: Value,
) -> Result<Array2<Value>> {
    domain.validate()?;
    if resolution == 0 {
        return Err(ZPlaneError::InvalidResolution {
            what: "grid",
            value: resolution,
            minimum: 1,
        });
    }
    if !cap.is_finite() || cap <= 0.0 {
        return Err(ZPlaneError::InvalidParameter {
            name: "magnitude_cap",
            value: cap,
        });
    }

    let per_row: Vec<Vec<Value>> = (0..resolution)
        .into_par_iter()
        .map(|row| {
            (0..resolution)
                .map(|col| transfer.magnitude(grid_coordinate(domain, resolution, row, col), cap))
                .collect()
        })
        .collect();

    // Merge rows into a single row-major buffer
    let mut values: Vec<Value> = Vec::with_capacity(resolution * resolution);
    for (row, mut r) in per_row.into_iter().enumerate() {
        if let Some(col) = r.iter().position(|m| !m.is_finite()) {
            return Err(ZPlaneError::NonFiniteMagnitude { row, col });
        }
        values.append(&mut r);
    }

    debug!(resolution, cap, "evaluated magnitude grid");
    Ok(Array2::from_shape_vec((resolution, resolution), values)?)
}
