use nalgebra::{Point3, Vector3};

/// Scalar value used for domain coordinates, magnitudes and time.
pub type Value = f64;

/// A point of the z-plane. Real part on the first axis, imaginary part on the second.
pub type Complex = nalgebra::Complex<Value>;

/// A surface point `(re, im, height)`.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;
