//! Per-node transforms and their GPU representation.
//!
//! Scene nodes carry a [`Transform`]. When the scene is drawn, every mesh's
//! world matrix is packed into an [`InstanceRaw`] and uploaded into an instance
//! buffer, so that all meshes sharing a geometry and matcap are drawn with a
//! single instanced draw call.

use cgmath::{Euler, Matrix, Matrix3, Matrix4, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};

use crate::geometry::Vertex;

/// Local transformation: position, Euler rotation and scale.
///
/// The rotation is applied in XYZ order, i.e. the matrix is `Rx * Ry * Rz`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Create a transform that does not move, rotate or scale.
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    pub fn rotation_quaternion(&self) -> Quaternion<f32> {
        Quaternion::from_angle_x(self.rotation.x)
            * Quaternion::from_angle_y(self.rotation.y)
            * Quaternion::from_angle_z(self.rotation.z)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation_quaternion())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    /// Packs a world matrix. Normals are transformed by the inverse transpose
    /// of its linear part; a degenerate (zero scale) matrix keeps them as is.
    pub fn from_world(world: &Matrix4<f32>) -> Self {
        let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
        let normal = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix3::identity);
        Self {
            model: (*world).into(),
            normal: normal.into(),
        }
    }

    pub fn model(&self) -> Matrix4<f32> {
        self.model.into()
    }
}

/**
 * As we store vertex data directly in the GPU memory we need to tell what the bytes refer to:
 *
 * offset: zero as we want to use the full space.
 * stride: length of an instance
 *
 * Stride layout here: the world matrix as 4x4 matrix (hence the four 4d vectors)
 * followed by the 3x3 normal matrix.
 */
impl Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Shaders only advance to the next instance when they start
            // processing a new instance
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}
