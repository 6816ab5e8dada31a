use crate::types::{Point, Value, Vector};

/// Renderer-facing triangle mesh of the magnitude surface.
///
/// Vertices are `(re, im, height)` in domain units, laid out row-major over a square
/// tessellation so neighbouring cells share vertices.
/// Call [`create_grid_triangles`](MeshDescriptor::create_grid_triangles) then
/// [`create_normals`](MeshDescriptor::create_normals) after populating vertices.
#[derive(Debug, Clone)]
pub struct MeshDescriptor {
    /// Vertex positions: `[(re, im, height), ...]`
    pub vertices: Vec<Point>,

    /// Triangle index triples into `vertices`: `[[v0, v1, v2], ...]`
    pub tris: Vec<[usize; 3]>,

    /// Per-vertex normals, averaged over adjacent faces.
    pub normals: Vec<[Value; 3]>,
}

impl MeshDescriptor {
    /// Creates an empty mesh with no vertices, triangles, or normals.
    pub fn new_empty() -> Self {
        Self {
            vertices: Vec::new(),
            tris: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Computes the face normal for triangle `tri`.
    ///
    /// Returns the zero vector if the triangle is degenerate.
    pub fn tri_normal(&self, tri: usize) -> Vector {
        let [a, b, c] = self.tris[tri];
        let v_a_b = self.vertices[b] - self.vertices[a];
        let v_b_c = self.vertices[c] - self.vertices[b];

        let cross = v_a_b.cross(&v_b_c);

        let nrm = cross.norm();
        if nrm == 0.0 {
            Vector::new(0.0, 0.0, 0.0)
        } else {
            cross / nrm
        }
    }

    /// Splits every cell of a `resolution × resolution` vertex grid into two triangles.
    ///
    /// ```text
    ///  k+r ---- k+r+1        r = resolution
    ///   |  \      |
    ///   |    \    |          tri 0: k, k+1, k+r
    ///   |      \  |          tri 1: k+1, k+r+1, k+r
    ///   k ------ k+1
    /// ```
    ///
    /// Winding is counter-clockwise seen from `+height`, so normals point up.
    /// Must be called after [`set_vertices`](MeshDescriptor::set_vertices).
    pub fn create_grid_triangles(&mut self, resolution: usize) {
        self.tris.clear();
        if resolution < 2 || self.vertices.len() < resolution * resolution {
            return;
        }
        self.tris.reserve(2 * (resolution - 1) * (resolution - 1));
        for j in 0..resolution - 1 {
            for i in 0..resolution - 1 {
                let k = j * resolution + i;
                self.tris.push([k, k + 1, k + resolution]);
                self.tris.push([k + 1, k + resolution + 1, k + resolution]);
            }
        }
    }

    /// Computes smooth per-vertex normals by summing the face normals around each vertex.
    ///
    /// Replaces any previously stored normals. Vertices touching only degenerate faces get
    /// the `+height` axis.
    pub fn create_normals(&mut self) {
        let mut sums = vec![Vector::zeros(); self.vertices.len()];
        for tri in 0..self.tris.len() {
            let normal = self.tri_normal(tri);
            for &v in &self.tris[tri] {
                sums[v] += normal;
            }
        }
        self.normals = sums
            .into_iter()
            .map(|n| {
                let nrm = n.norm();
                if nrm == 0.0 {
                    [0.0, 0.0, 1.0]
                } else {
                    let n = n / nrm;
                    [n.x, n.y, n.z]
                }
            })
            .collect();
    }

    /// Replaces the vertex buffer.
    pub fn set_vertices(&mut self, vertices: Vec<Point>) {
        self.vertices = vertices
    }

    /// Flattened triangle indices, as expected by GPU index buffers.
    pub fn indices_u32(&self) -> Vec<u32> {
        self.tris
            .iter()
            .flat_map(|t| t.iter().map(|&v| v as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(resolution: usize) -> MeshDescriptor {
        let mut mesh = MeshDescriptor::new_empty();
        let vertices = (0..resolution * resolution)
            .map(|k| Point::new((k % resolution) as Value, (k / resolution) as Value, 2.0))
            .collect();
        mesh.set_vertices(vertices);
        mesh.create_grid_triangles(resolution);
        mesh.create_normals();
        mesh
    }

    #[test]
    fn test_grid_triangle_count() {
        let mesh = flat_grid(4);
        assert_eq!(mesh.tris.len(), 18);
        assert_eq!(mesh.indices_u32().len(), 54);
    }

    #[test]
    fn test_flat_grid_normals_point_up() {
        let mesh = flat_grid(3);
        assert_eq!(mesh.normals.len(), 9);
        for n in &mesh.normals {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let mut mesh = MeshDescriptor::new_empty();
        mesh.set_vertices(vec![Point::origin(); 3]);
        mesh.tris.push([0, 1, 2]);
        assert_eq!(mesh.tri_normal(0), Vector::zeros());
    }
}
