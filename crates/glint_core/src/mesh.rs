//! Mesh geometry resolved from an asset.
//!
//! Vertex attributes are gathered into one interleaved [`Vertex`] record per
//! vertex. Attributes the asset does not provide stay zeroed.

use bytemuck::{Pod, Zeroable};
use glint_math::{Bounds, Vec3};

/// One vertex with every supported attribute.
///
/// The layout is `#[repr(C)]` and `Pod`, so a vertex slice can be uploaded
/// to the GPU as raw bytes (see [`Primitive::vertex_bytes`]).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Joint indices into the owning skin's joint list
    pub joints: [u16; 4],
    pub weights: [f32; 4],
}

impl Vertex {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// One drawable vertex/index group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Primitive {
    pub vertices: Vec<Vertex>,

    /// Triangle indices; empty for a non-indexed primitive
    pub indices: Vec<u16>,

    /// Index into `SceneGraph::materials`
    pub material: Option<usize>,

    /// Bounds of the vertex positions
    pub bounds: Bounds,
}

impl Primitive {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>, material: Option<usize>) -> Self {
        let bounds = Bounds::from_points(vertices.iter().map(Vertex::position));
        Self {
            vertices,
            indices,
            material,
            bounds,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles, assuming triangle-list topology.
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertices.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Raw bytes of the vertex array.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the index array.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// A named list of primitives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    /// Bounds enclosing every primitive.
    pub fn bounds(&self) -> Bounds {
        self.primitives
            .iter()
            .fold(Bounds::EMPTY, |acc, p| acc.union(&p.bounds))
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(Primitive::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(Primitive::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            position: [x, y, z],
            ..Default::default()
        }
    }

    #[test]
    fn test_primitive_creation() {
        let prim = Primitive::new(
            vec![vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0)],
            vec![0, 1, 2],
            None,
        );

        assert_eq!(prim.vertex_count(), 3);
        assert_eq!(prim.triangle_count(), 1);
        assert!(prim.is_indexed());
        assert_eq!(prim.bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_non_indexed_triangle_count() {
        let prim = Primitive::new(vec![Vertex::default(); 6], vec![], Some(0));
        assert_eq!(prim.triangle_count(), 2);
        assert!(!prim.is_indexed());
    }

    #[test]
    fn test_vertex_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 56);

        let prim = Primitive::new(vec![vertex(1.0, 2.0, 3.0)], vec![0, 0, 0], None);
        let bytes = prim.vertex_bytes();
        assert_eq!(bytes.len(), 56);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(prim.index_bytes().len(), 6);
    }

    #[test]
    fn test_mesh_bounds() {
        let mesh = Mesh {
            name: "pair".to_string(),
            primitives: vec![
                Primitive::new(vec![vertex(-1.0, 0.0, 0.0)], vec![], None),
                Primitive::new(vec![vertex(0.0, 0.0, 5.0)], vec![], None),
            ],
        };

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(mesh.vertex_count(), 2);
    }
}
