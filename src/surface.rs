use ndarray::Array2;
use tracing::info;

use crate::{
    config::{Domain, RunConfig},
    error::{Result, ZPlaneError},
    grid::{evaluate_magnitudes, grid_coordinate},
    interp::{axis_coordinate, nearest_index},
    mesh::MeshDescriptor,
    types::{Complex, Point, Value},
};

/// A grid coordinate and its clipped magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainSample {
    pub coordinate: Complex,
    /// Clipped to `[0, cap]`.
    pub magnitude: Value,
}

/// Height field of `|H(z)|` sampled on a uniform `N × N` grid.
///
/// Built once from a [`RunConfig`] and never mutated afterwards. Rendering reads heights
/// through [`point_at`](SurfaceMesh::point_at), which snaps to the nearest sample instead
/// of re-evaluating `H`, so the rendered surface is piecewise constant.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    domain: Domain,
    resolution: usize,
    /// Samples indexed `[imag_index, real_index]`.
    samples: Array2<DomainSample>,
}

impl SurfaceMesh {
    /// Evaluates the grid described by `config` and wraps it into a surface.
    pub fn build(config: &RunConfig) -> Result<Self> {
        let magnitudes = evaluate_magnitudes(
            &config.domain,
            config.grid_resolution,
            &config.transfer,
            config.magnitude_cap,
        )?;
        Self::from_magnitudes(config.domain, magnitudes)
    }

    /// Pairs each magnitude of a square grid with its coordinate.
    ///
    /// The grid must be square and non-empty, with finite, non-negative magnitudes.
    pub fn from_magnitudes(domain: Domain, magnitudes: Array2<Value>) -> Result<Self> {
        domain.validate()?;
        let (resolution, cols) = magnitudes.dim();
        if resolution != cols {
            return Err(ZPlaneError::NonSquareGrid {
                rows: resolution,
                cols,
            });
        }
        if resolution == 0 {
            return Err(ZPlaneError::InvalidResolution {
                what: "grid",
                value: resolution,
                minimum: 1,
            });
        }
        if let Some(((row, col), _)) = magnitudes
            .indexed_iter()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(ZPlaneError::NonFiniteMagnitude { row, col });
        }

        let samples = Array2::from_shape_fn((resolution, resolution), |(row, col)| DomainSample {
            coordinate: grid_coordinate(&domain, resolution, row, col),
            magnitude: magnitudes[[row, col]],
        });
        info!(resolution, "built surface mesh");
        Ok(Self {
            domain,
            resolution,
            samples,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Samples per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn samples(&self) -> &Array2<DomainSample> {
        &self.samples
    }

    /// Returns the sample at `[row, col]` (`row` = imaginary index, `col` = real index).
    pub fn get(&self, row: usize, col: usize) -> DomainSample {
        self.samples[[row, col]]
    }

    /// Nearest `(row, col)` sample index for a domain coordinate, clamped to the grid.
    #[inline]
    pub fn sample_index(&self, re: Value, im: Value) -> (usize, usize) {
        let col = nearest_index(re, self.resolution, self.domain.real.min, self.domain.real.max);
        let row = nearest_index(im, self.resolution, self.domain.imag.min, self.domain.imag.max);
        (row, col)
    }

    /// Quantized height at `(u, v)`: the magnitude of the nearest precomputed sample.
    #[inline]
    pub fn height_at(&self, u: Value, v: Value) -> Value {
        let (row, col) = self.sample_index(u, v);
        self.samples[[row, col]].magnitude
    }

    /// Maps a tessellation coordinate to the surface point `(u, v, height)`.
    #[inline]
    pub fn point_at(&self, u: Value, v: Value) -> Point {
        Point::new(u, v, self.height_at(u, v))
    }

    /// Builds a triangle mesh with `resolution × resolution` vertices spanning the domain.
    ///
    /// Heights come from [`point_at`](SurfaceMesh::point_at). When `resolution` equals the
    /// grid resolution every vertex sits exactly on a sample.
    pub fn tessellate(&self, resolution: usize) -> MeshDescriptor {
        let mut vertices = Vec::with_capacity(resolution * resolution);
        for j in 0..resolution {
            let v = axis_coordinate(j, resolution, self.domain.imag.min, self.domain.imag.max);
            for i in 0..resolution {
                let u = axis_coordinate(i, resolution, self.domain.real.min, self.domain.real.max);
                vertices.push(self.point_at(u, v));
            }
        }

        let mut mesh = MeshDescriptor::new_empty();
        mesh.set_vertices(vertices);
        mesh.create_grid_triangles(resolution);
        mesh.create_normals();
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisRange;
    use proptest::prelude::*;

    fn reference() -> SurfaceMesh {
        SurfaceMesh::build(&RunConfig::default()).unwrap()
    }

    #[test]
    fn test_build_uses_config_resolution() {
        let surface = reference();
        assert_eq!(surface.resolution(), 50);
        assert_eq!(surface.samples().dim(), (50, 50));
        assert_eq!(surface.get(0, 0).coordinate, Complex::new(-1.5, -1.5));
        assert_eq!(surface.get(49, 49).coordinate, Complex::new(1.5, 1.5));
    }

    #[test]
    fn test_sample_index_round_trips() {
        let surface = reference();
        for row in 0..50 {
            for col in 0..50 {
                let c = surface.get(row, col).coordinate;
                assert_eq!(surface.sample_index(c.re, c.im), (row, col));
            }
        }
    }

    #[test]
    fn test_point_at_is_quantized() {
        let surface = reference();
        let sample = surface.get(20, 30);
        let c = sample.coordinate;
        let step = 3.0 / 49.0;
        // A quarter step away still snaps to the same sample.
        let p = surface.point_at(c.re + step / 4.0, c.im - step / 4.0);
        assert_eq!(p.x, c.re + step / 4.0);
        assert_eq!(p.y, c.im - step / 4.0);
        assert_eq!(p.z, sample.magnitude);
    }

    #[test]
    fn test_point_at_clamps_outside_domain() {
        let surface = reference();
        assert_eq!(surface.height_at(-100.0, -100.0), surface.get(0, 0).magnitude);
        assert_eq!(surface.height_at(100.0, 100.0), surface.get(49, 49).magnitude);
    }

    #[test]
    fn test_tessellation_at_grid_resolution_hits_samples() {
        let surface = reference();
        let mesh = surface.tessellate(50);
        assert_eq!(mesh.vertices.len(), 2500);
        assert_eq!(mesh.tris.len(), 2 * 49 * 49);
        for (k, vertex) in mesh.vertices.iter().enumerate() {
            let sample = surface.get(k / 50, k % 50);
            assert_eq!(vertex.z, sample.magnitude);
        }
    }

    #[test]
    fn test_coarse_grid_yields_plateaus() {
        let config = RunConfig::default()
            .with_domain(Domain {
                real: AxisRange::new(-1.0, 1.0),
                imag: AxisRange::new(-1.0, 1.0),
            })
            .with_grid_resolution(3);
        let surface = SurfaceMesh::build(&config).unwrap();
        let mesh = surface.tessellate(9);
        let distinct: std::collections::BTreeSet<u64> =
            mesh.vertices.iter().map(|p| p.z.to_bits()).collect();
        assert!(distinct.len() <= 9);
    }

    #[test]
    fn test_from_magnitudes_rejects_non_square_grid() {
        let result = SurfaceMesh::from_magnitudes(Domain::default(), Array2::zeros((3, 2)));
        assert!(matches!(
            result,
            Err(ZPlaneError::NonSquareGrid { rows: 3, cols: 2 })
        ));
    }

    #[test]
    fn test_from_magnitudes_rejects_nan() {
        let mut magnitudes = Array2::zeros((3, 3));
        magnitudes[[0, 0]] = Value::NAN;
        let result = SurfaceMesh::from_magnitudes(Domain::default(), magnitudes);
        assert!(matches!(
            result,
            Err(ZPlaneError::NonFiniteMagnitude { row: 0, col: 0 })
        ));
    }

    #[test]
    fn test_from_magnitudes_accepts_valid_grid() {
        let magnitudes = Array2::from_elem((2, 2), 1.5);
        let surface = SurfaceMesh::from_magnitudes(Domain::default(), magnitudes).unwrap();
        assert_eq!(surface.height_at(-1.5, -1.5), 1.5);
    }

    proptest! {
        #[test]
        fn test_sample_index_monotonic(a in -3.0f64..3.0, b in -3.0f64..3.0, v in -3.0f64..3.0) {
            let surface = reference();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (_, col_lo) = surface.sample_index(lo, v);
            let (_, col_hi) = surface.sample_index(hi, v);
            prop_assert!(col_lo <= col_hi);
            let (row_lo, _) = surface.sample_index(v, lo);
            let (row_hi, _) = surface.sample_index(v, hi);
            prop_assert!(row_lo <= row_hi);
        }
    }
}
