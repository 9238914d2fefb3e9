//! CPU-side mesh geometry.
//!
//! A [`Geometry`] is an indexed triangle list of positions and normals. Every
//! geometry is built once, wrapped in an `Rc` and shared by all meshes that
//! display it; it is never modified after it has been attached to the scene.
//!
//! - `primitives` builds the torus, sphere, icosahedron and box shapes
//! - `text` extrudes typeface outlines into bevelled 3D text

use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Vector3, Zero};

pub mod primitives;
pub mod text;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl ModelVertex {
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position.into()
    }

    pub fn normal(&self) -> Vector3<f32> {
        self.normal.into()
    }
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Which shape a geometry describes. Used as the key for GPU buffers and
/// instance batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    Text,
    Sphere,
    Icosahedron,
    Box,
    Torus,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

#[derive(Clone, Debug)]
pub struct Geometry {
    kind: GeometryKind,
    vertices: Vec<ModelVertex>,
    indices: Vec<u32>,
}

impl Geometry {
    /// Builds a geometry and flips every triangle whose winding disagrees with
    /// its vertex normals, so that counter-clockwise faces always point outwards.
    pub fn new(kind: GeometryKind, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        let mut geometry = Self {
            kind,
            vertices,
            indices,
        };
        geometry.orient_faces();
        geometry
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `None` for a geometry without vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.vertices.first()?.position();
        let (min, max) = self.vertices.iter().skip(1).fold((first, first), |(min, max), v| {
            let p = v.position();
            (
                Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        });
        Some(BoundingBox { min, max })
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for vertex in self.vertices.iter_mut() {
            vertex.position = (vertex.position() + offset).into();
        }
    }

    /// Moves the geometry so that its bounding box is centred on the origin and
    /// returns the applied offset.
    pub fn center(&mut self) -> Vector3<f32> {
        let offset = match self.bounding_box() {
            Some(bounds) => -bounds.center(),
            None => return Vector3::zero(),
        };
        self.translate(offset);
        offset
    }

    fn orient_faces(&mut self) {
        for triangle in self.indices.chunks_exact_mut(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| self.vertices[i as usize]);
            let face = (b.position() - a.position()).cross(c.position() - a.position());
            let normal = a.normal() + b.normal() + c.normal();
            if face.dot(normal) < 0.0 {
                triangle.swap(1, 2);
            }
        }
    }
}

/// Normalizes `v`, or returns `fallback` for a zero-length vector.
pub(crate) fn normalize_or(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    let length = v.magnitude();
    if length > f32::EPSILON {
        v / length
    } else {
        fallback
    }
}
