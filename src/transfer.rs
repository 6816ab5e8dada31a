use std::fmt;

use crate::{
    error::{Result, ZPlaneError},
    types::{Complex, Value},
};

/// A single-zero, single-pole transfer function.
///
/// ```text
/// H(z) = (z - zero) / (z - pole)
/// ```
///
/// The surface path evaluates the regularized form `(z - zero) / (z - pole + epsilon)` so a
/// grid point sitting on the pole stays finite. The readout path uses [`exact`](Self::exact).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferFunction {
    /// Root of the numerator.
    pub zero: Complex,
    /// Root of the denominator.
    pub pole: Complex,
    /// Added to the denominator when sampling the surface.
    pub epsilon: Value,
}

impl Default for TransferFunction {
    fn default() -> Self {
        Self {
            zero: Complex::new(0.5, 0.0),
            pole: Complex::new(0.9, 0.0),
            epsilon: 1e-10,
        }
    }
}

impl TransferFunction {
    pub fn new(zero: Complex, pole: Complex) -> Self {
        Self {
            zero,
            pole,
            ..Default::default()
        }
    }

    /// Sets the regularization constant.
    pub fn with_epsilon(mut self, epsilon: Value) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Exact value of `H(z)`. Non-finite at the pole.
    #[inline]
    pub fn exact(&self, z: Complex) -> Complex {
        (z - self.zero) / (z - self.pole)
    }

    /// Regularized value `(z - zero) / (z - pole + epsilon)`.
    #[inline]
    pub fn regularized(&self, z: Complex) -> Complex {
        (z - self.zero) / (z - self.pole + self.epsilon)
    }

    /// Regularized magnitude clipped to `[0, cap]`.
    ///
    /// Infinite magnitudes clip to `cap`. NaN is passed through for the caller to reject.
    ///
    /// # Panics
    /// Panics if `cap` is negative or NaN.
    #[inline]
    pub fn magnitude(&self, z: Complex, cap: Value) -> Value {
        self.regularized(z).norm().clamp(0.0, cap)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("zero.re", self.zero.re),
            ("zero.im", self.zero.im),
            ("pole.re", self.pole.re),
            ("pole.im", self.pole.im),
            ("epsilon", self.epsilon),
        ] {
            if !value.is_finite() {
                return Err(ZPlaneError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Formats a constant of `H(z)`: plain real when the imaginary part is zero, `(a ± bj)` otherwise.
pub(crate) fn format_constant(c: Complex) -> String {
    if c.im == 0.0 {
        format!("{}", c.re)
    } else {
        let sign = if c.im < 0.0 { '-' } else { '+' };
        format!("({} {} {}j)", c.re, sign, c.im.abs())
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "H(z) = (z - {}) / (z - {})",
            format_constant(self.zero),
            format_constant(self.pole)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_is_zero_at_zero() {
        let h = TransferFunction::default();
        assert_eq!(h.magnitude(Complex::new(0.5, 0.0), 10.0), 0.0);
    }

    #[test]
    fn test_magnitude_clipped_at_pole() {
        let h = TransferFunction::default();
        assert_eq!(h.magnitude(Complex::new(0.9, 0.0), 10.0), 10.0);
    }

    #[test]
    fn test_magnitude_nan_passes_through_clip() {
        let h = TransferFunction::new(Complex::new(0.5, 0.0), Complex::new(0.9, 0.0))
            .with_epsilon(0.0);
        // Dividing by 0 + 0j yields NaN in both components.
        assert!(h.magnitude(Complex::new(0.9, 0.0), 10.0).is_nan());
    }

    #[test]
    fn test_exact_ignores_epsilon() {
        let h = TransferFunction::default().with_epsilon(1.0);
        let z = Complex::new(0.0, 0.0);
        assert!((h.exact(z).re - 0.5 / 0.9).abs() < 1e-12);
        assert_eq!(h.exact(z).im, 0.0);
        assert_ne!(h.exact(z), h.regularized(z));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(
            TransferFunction::default().to_string(),
            "H(z) = (z - 0.5) / (z - 0.9)"
        );
        let h = TransferFunction::new(Complex::new(0.0, -0.5), Complex::new(0.9, 0.25));
        assert_eq!(h.to_string(), "H(z) = (z - (0 - 0.5j)) / (z - (0.9 + 0.25j))");
    }

    #[test]
    fn test_validate_rejects_nan_epsilon() {
        let h = TransferFunction::default().with_epsilon(Value::NAN);
        assert!(matches!(
            h.validate(),
            Err(ZPlaneError::InvalidParameter { name: "epsilon", .. })
        ));
    }
}
