//! The axes helper: three unit lines from the origin, X red, Y green, Z blue.

use wgpu::util::DeviceExt;

use crate::{data_structures::texture::Texture, geometry::Vertex};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AxisVertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl Vertex for AxisVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<AxisVertex>() as wgpu::BufferAddress,
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

pub fn axis_vertices(size: f32) -> [AxisVertex; 6] {
    let line = |end: [f32; 3], color: [f32; 3]| {
        [
            AxisVertex {
                position: [0.0; 3],
                color,
            },
            AxisVertex {
                position: end.map(|c| c * size),
                color,
            },
        ]
    };
    let [x0, x1] = line([1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
    let [y0, y1] = line([0.0, 1.0, 0.0], [0.0, 1.0, 0.0]);
    let [z0, z1] = line([0.0, 0.0, 1.0], [0.0, 0.0, 1.0]);
    [x0, x1, y0, y1, z0, z1]
}

pub struct AxesHelper {
    pub visible: bool,
    vertex_buffer: wgpu::Buffer,
    render_pipeline: wgpu::RenderPipeline,
}

impl AxesHelper {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Axes Vertex Buffer"),
            contents: bytemuck::cast_slice(&axis_vertices(1.0)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Axes Pipeline Layout"),
            bind_group_layouts: &[camera_bind_group_layout],
            push_constant_ranges: &[],
        });
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Axes Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("axes.wgsl").into()),
        };
        let render_pipeline = crate::pipelines::matcap::mk_render_pipeline(
            device,
            &layout,
            color_format,
            Some(wgpu::BlendState::REPLACE),
            Some(Texture::DEPTH_FORMAT),
            wgpu::PrimitiveTopology::LineList,
            &[AxisVertex::desc()],
            shader,
        );

        Self {
            visible: false,
            vertex_buffer,
            render_pipeline,
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        if !self.visible {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..6, 0..1);
    }
}
