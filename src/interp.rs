use crate::types::{Complex, Value};

// linearly map a number from one range to another
pub fn remap(s: Value, range_in: [Value; 2], range_out: [Value; 2]) -> Value {
    range_out[0] + (s - range_in[0]) * (range_out[1] - range_out[0]) / (range_in[1] - range_in[0])
}

// Linear interpolation
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

// Linearly interpolate between two z-plane points by factor t
pub fn lerp_complex(a: Complex, b: Complex, t: Value) -> Complex {
    Complex::new(lerp(a.re, b.re, t), lerp(a.im, b.im, t))
}

/// Coordinate of sample `index` on an axis of `count` uniformly spaced samples over `[min, max]`.
///
/// A single-sample axis sits at `min`.
pub fn axis_coordinate(index: usize, count: usize, min: Value, max: Value) -> Value {
    if count <= 1 {
        return min;
    }
    min + (max - min) * index as Value / (count - 1) as Value
}

/// Nearest sample index for `coord` on an axis of `count` samples over `[min, max]`.
///
/// ```text
/// index = round((coord - min) / (max - min) * (count - 1)), clamped to [0, count - 1]
/// ```
pub fn nearest_index(coord: Value, count: usize, min: Value, max: Value) -> usize {
    if count <= 1 {
        return 0;
    }
    let last = (count - 1) as Value;
    let scaled = ((coord - min) / (max - min) * last).round();
    // NaN survives the clamp and saturates to 0 on the cast.
    scaled.clamp(0.0, last) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_to_unit() {
        assert_eq!(remap(0.0, [-1.5, 1.5], [0.0, 1.0]), 0.5);
        assert_eq!(remap(1.5, [-1.5, 1.5], [-3.5, 3.5]), 3.5);
    }

    #[test]
    fn test_lerp_complex_midpoint() {
        let mid = lerp_complex(Complex::new(0.0, 0.0), Complex::new(1.0, 0.0), 0.5);
        assert_eq!(mid, Complex::new(0.5, 0.0));
    }

    #[test]
    fn test_axis_coordinate_endpoints() {
        assert_eq!(axis_coordinate(0, 50, -1.5, 1.5), -1.5);
        assert_eq!(axis_coordinate(49, 50, -1.5, 1.5), 1.5);
        assert_eq!(axis_coordinate(0, 1, -1.5, 1.5), -1.5);
    }

    #[test]
    fn test_nearest_index_inverts_axis_coordinate() {
        for i in 0..50 {
            let coord = axis_coordinate(i, 50, -1.5, 1.5);
            assert_eq!(nearest_index(coord, 50, -1.5, 1.5), i);
        }
    }

    #[test]
    fn test_nearest_index_clamps_outside_domain() {
        assert_eq!(nearest_index(-10.0, 50, -1.5, 1.5), 0);
        assert_eq!(nearest_index(10.0, 50, -1.5, 1.5), 49);
        assert_eq!(nearest_index(Value::NAN, 50, -1.5, 1.5), 0);
    }
}
