use std::fmt;

use crate::{
    animator::AnimationState,
    transfer::{TransferFunction, format_constant},
    types::{Complex, Value},
};

/// Sign shown in front of a formatted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    /// `'+'` for `value >= 0` (including `-0.0` and NaN), `'-'` for strictly negative values.
    pub fn of(value: Value) -> Self {
        if value < 0.0 { Sign::Minus } else { Sign::Plus }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Plus => f.write_str("+"),
            Sign::Minus => f.write_str("-"),
        }
    }
}

/// A real value split into an explicit sign and its absolute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedComponent {
    pub sign: Sign,
    pub magnitude: Value,
}

impl SignedComponent {
    pub fn new(value: Value) -> Self {
        Self {
            sign: Sign::of(value),
            magnitude: value.abs(),
        }
    }

    /// Signed value back as a plain number.
    pub fn value(&self) -> Value {
        match self.sign {
            Sign::Plus => self.magnitude,
            Sign::Minus => -self.magnitude,
        }
    }
}

/// Exact value of `H(z)` at one marker position.
///
/// Built fresh on every query; there is no cache. The value is computed from the zero and
/// pole directly and never goes through the surface grid, so it stays exact where the
/// rendered height is quantized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadoutSnapshot {
    pub position: Complex,
    pub value: Complex,
}

/// Formatted readout lines handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadoutText {
    /// `Re(z) = x`
    pub real: String,
    /// `Im(z) = y`
    pub imag: String,
    /// `H(z) = ((x ± yj) - zero) / ((x ± yj) - pole) = a ± bj`
    pub value: String,
}

impl fmt::Display for ReadoutText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.real, self.imag, self.value)
    }
}

/// Recomputes the exact readout at `position`.
pub fn snapshot(transfer: &TransferFunction, position: Complex) -> ReadoutSnapshot {
    ReadoutSnapshot {
        position,
        value: transfer.exact(position),
    }
}

/// Readout for a live animation state.
pub fn snapshot_from(transfer: &TransferFunction, state: &AnimationState) -> ReadoutSnapshot {
    snapshot(transfer, state.position)
}

impl ReadoutSnapshot {
    pub fn real_part(&self) -> SignedComponent {
        SignedComponent::new(self.position.re)
    }

    pub fn imag_part(&self) -> SignedComponent {
        SignedComponent::new(self.position.im)
    }

    /// Real and imaginary parts of `H(z)`.
    pub fn value_parts(&self) -> (SignedComponent, SignedComponent) {
        (
            SignedComponent::new(self.value.re),
            SignedComponent::new(self.value.im),
        )
    }

    /// Formats the snapshot with `precision` digits after the decimal point.
    pub fn format(&self, transfer: &TransferFunction, precision: usize) -> ReadoutText {
        let z = format_complex(self.position, precision);
        let (re, im) = self.value_parts();
        ReadoutText {
            real: format!("Re(z) = {:.*}", precision, self.position.re),
            imag: format!("Im(z) = {:.*}", precision, self.position.im),
            value: format!(
                "H(z) = ({z} - {}) / ({z} - {}) = {:.*} {} {:.*}j",
                format_constant(transfer.zero),
                format_constant(transfer.pole),
                precision,
                re.value(),
                im.sign,
                precision,
                im.magnitude,
            ),
        }
    }
}

/// `(x ± |y|j)` with fixed precision.
fn format_complex(c: Complex, precision: usize) -> String {
    let im = SignedComponent::new(c.im);
    format!(
        "({:.*} {} {:.*}j)",
        precision, c.re, im.sign, precision, im.magnitude
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animator::{Waypoint, WaypointAnimator},
        config::RunConfig,
        surface::SurfaceMesh,
    };

    #[test]
    fn test_sign_selection() {
        assert_eq!(Sign::of(0.0), Sign::Plus);
        assert_eq!(Sign::of(-0.0), Sign::Plus);
        assert_eq!(Sign::of(1e-300), Sign::Plus);
        assert_eq!(Sign::of(-1e-300), Sign::Minus);
        assert_eq!(Sign::of(Value::NAN), Sign::Plus);
    }

    #[test]
    fn test_signed_component_value() {
        let c = SignedComponent::new(-0.25);
        assert_eq!(c.sign, Sign::Minus);
        assert_eq!(c.magnitude, 0.25);
        assert_eq!(c.value(), -0.25);
    }

    #[test]
    fn test_snapshot_is_exact_at_zero() {
        let transfer = TransferFunction::default();
        let s = snapshot(&transfer, Complex::new(0.5, 0.0));
        assert_eq!(s.value, Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_format_lines() {
        let transfer = TransferFunction::default();
        let s = snapshot(&transfer, Complex::new(0.5, -0.5));
        let text = s.format(&transfer, 2);
        assert_eq!(text.real, "Re(z) = 0.50");
        assert_eq!(text.imag, "Im(z) = -0.50");
        // (0 - 0.5j) / (-0.4 - 0.5j) = (0.25 + 0.2j) / 0.41
        assert_eq!(
            text.value,
            "H(z) = ((0.50 - 0.50j) - 0.5) / ((0.50 - 0.50j) - 0.9) = 0.61 + 0.49j"
        );
        assert_eq!(text.to_string().lines().count(), 3);
    }

    #[test]
    fn test_format_precision() {
        let transfer = TransferFunction::default();
        let s = snapshot(&transfer, Complex::new(0.0, 0.0));
        let text = s.format(&transfer, 4);
        assert_eq!(text.real, "Re(z) = 0.0000");
        assert!(text.value.ends_with("= 0.5556 + 0.0000j"));
    }

    #[test]
    fn test_snapshot_from_uses_state_position() {
        let transfer = TransferFunction::default();
        let state = AnimationState {
            segment: 3,
            progress: 0.25,
            position: Complex::new(0.5, -0.5),
        };
        assert_eq!(
            snapshot_from(&transfer, &state),
            snapshot(&transfer, Complex::new(0.5, -0.5))
        );
    }

    #[test]
    fn test_readout_is_exact_not_quantized() {
        let config = RunConfig::default().with_grid_resolution(8);
        let surface = SurfaceMesh::build(&config).unwrap();
        let mut animator =
            WaypointAnimator::from_waypoints(vec![Waypoint::new(0.3, 0.2, 1.0)]).unwrap();
        animator.advance(0.0).unwrap();

        let readout = snapshot_from(&config.transfer, &animator.animation_state().unwrap());
        let exact = config.transfer.exact(Complex::new(0.3, 0.2));
        let quantized = surface.height_at(0.3, 0.2);

        assert_eq!(readout.value, exact);
        assert_ne!(readout.value.norm(), quantized);
    }
}
