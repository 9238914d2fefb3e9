//! Perspective camera, projection and the camera uniform.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

use crate::controls::OrbitControls;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A camera looking from `position` at `target`, with +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }

    /// Screen right in world space.
    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(self.up).normalize()
    }

    /// Screen up in world space.
    pub fn screen_up(&self) -> Vector3<f32> {
        self.right().cross(self.forward())
    }
}

/// Perspective projection with a cached matrix.
///
/// Changing the aspect ratio does not touch the matrix until
/// [`update_projection_matrix`](Self::update_projection_matrix) is called.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
    matrix: Matrix4<f32>,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let mut projection = Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
            matrix: Matrix4::from_scale(1.0),
        };
        projection.update_projection_matrix();
        projection
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_aspect(width.max(1) as f32 / height.max(1) as f32);
        self.update_projection_matrix();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn update_projection_matrix(&mut self) {
        self.matrix =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view = camera.view_matrix();
        self.view_position = camera.position.to_homogeneous().into();
        self.view = view.into();
        self.view_proj = (projection.calc_matrix() * view).into();
    }
}

/// Camera state together with its uniform buffer and bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controls: OrbitControls,
    pub projection: Projection,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        camera: Camera,
        projection: Projection,
        controls: OrbitControls,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controls,
            projection,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Advances the orbit controls by one step and uploads the new matrices.
    pub fn update(&mut self, queue: &wgpu::Queue) {
        self.controls.update(&mut self.camera, &self.projection);
        self.uniform.update_view_proj(&self.camera, &self.projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
