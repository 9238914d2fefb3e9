use crate::{
    data_structures::{instance::InstanceRaw, texture::Texture},
    geometry::{ModelVertex, Vertex},
};

/// Layout of a matcap bind group: the matcap texture and its sampler.
pub fn matcap_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("matcap_bind_group_layout"),
    })
}

/// The uploaded matcap set, one bind group per texture.
#[derive(Debug)]
pub struct MatcapLibrary {
    pub layout: wgpu::BindGroupLayout,
    textures: Vec<Texture>,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl MatcapLibrary {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, images: &[image::RgbaImage]) -> Self {
        let layout = matcap_layout(device);
        let sampler_fallback = device.create_sampler(&wgpu::SamplerDescriptor::default());
        let textures: Vec<Texture> = images
            .iter()
            .enumerate()
            .map(|(idx, img)| {
                Texture::from_image(device, queue, img, Some(format!("matcap {}", idx + 1).as_str()))
            })
            .collect();
        let bind_groups = textures
            .iter()
            .map(|texture| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(
                                texture.sampler.as_ref().unwrap_or(&sampler_fallback),
                            ),
                        },
                    ],
                    label: Some("matcap_bind_group"),
                })
            })
            .collect();

        Self {
            layout,
            textures,
            bind_groups,
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn bind_group(&self, index: usize) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(index)
    }
}

pub fn mk_matcap_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    matcap_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Matcap Pipeline Layout"),
        bind_group_layouts: &[matcap_bind_group_layout, camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Matcap Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("matcap.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        color_format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(Texture::DEPTH_FORMAT),
        wgpu::PrimitiveTopology::TriangleList,
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    topology: wgpu::PrimitiveTopology,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);
    // lines have no faces to cull
    let cull_mode = match topology {
        wgpu::PrimitiveTopology::TriangleList | wgpu::PrimitiveTopology::TriangleStrip => {
            Some(wgpu::Face::Back)
        }
        _ => None,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
