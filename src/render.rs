//! Scene rendering and instance batching.
//!
//! Every frame the scene graph is flattened into [`Renderable`]s, which are
//! grouped by geometry and matcap. Each group becomes one [`Instanced`] draw:
//! the geometry's vertex and index buffers, an instance buffer holding the
//! world matrices, and the matcap bind group.
//!
//! Geometry buffers are uploaded the first time a geometry kind shows up and
//! reused afterwards. Instance buffers grow when a group gets larger and are
//! rewritten in place otherwise.

use std::collections::{BTreeMap, HashMap};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        material::MatcapId,
        scene_graph::{Renderable, SceneGraph},
    },
    geometry::{Geometry, GeometryKind},
    pipelines::{
        axes::AxesHelper,
        matcap::{MatcapLibrary, mk_matcap_pipeline},
    },
};

/// Vertex and index buffers of one uploaded geometry.
#[derive(Debug)]
pub struct GeometryBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub num_elements: u32,
}

impl GeometryBuffers {
    pub fn new(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let label = format!("{:?}", geometry.kind());
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            num_elements: geometry.indices().len() as u32,
        }
    }
}

/// Data for one instanced draw call.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub geometry: &'a GeometryBuffers,
    pub matcap: &'a wgpu::BindGroup,
    pub amount: usize,
}

struct InstanceBatch {
    buffer: wgpu::Buffer,
    capacity: usize,
    amount: usize,
}

/// Groups renderables by geometry kind and matcap, keeping scene order inside
/// each group.
pub fn batch_renderables(
    renderables: &[Renderable],
) -> BTreeMap<(GeometryKind, MatcapId), Vec<InstanceRaw>> {
    let mut batches: BTreeMap<_, Vec<InstanceRaw>> = BTreeMap::new();
    for renderable in renderables {
        if renderable.geometry.is_empty() {
            continue;
        }
        let key = (renderable.geometry.kind(), renderable.material.borrow().matcap());
        batches
            .entry(key)
            .or_default()
            .push(InstanceRaw::from_world(&renderable.world));
    }
    batches
}

pub struct SceneRenderer {
    render_pipeline: wgpu::RenderPipeline,
    matcaps: MatcapLibrary,
    axes: AxesHelper,
    geometries: HashMap<GeometryKind, GeometryBuffers>,
    batches: BTreeMap<(GeometryKind, MatcapId), InstanceBatch>,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        matcaps: &[image::RgbaImage],
    ) -> anyhow::Result<Self> {
        if matcaps.is_empty() {
            anyhow::bail!("at least one matcap texture is required");
        }
        let matcaps = MatcapLibrary::new(device, queue, matcaps);
        let render_pipeline =
            mk_matcap_pipeline(device, color_format, &matcaps.layout, camera_bind_group_layout);
        let axes = AxesHelper::new(device, color_format, camera_bind_group_layout);

        Ok(Self {
            render_pipeline,
            matcaps,
            axes,
            geometries: HashMap::new(),
            batches: BTreeMap::new(),
        })
    }

    pub fn matcap_count(&self) -> usize {
        self.matcaps.len()
    }

    pub fn set_axes_visible(&mut self, visible: bool) {
        self.axes.visible = visible;
    }

    /// Uploads new geometries and this frame's instance data.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &SceneGraph) {
        let renderables = scene.renderables();
        for renderable in &renderables {
            let geometry = &renderable.geometry;
            if !geometry.is_empty() && !self.geometries.contains_key(&geometry.kind()) {
                log::debug!(
                    "uploading {:?} geometry with {} triangles",
                    geometry.kind(),
                    geometry.triangle_count()
                );
                self.geometries
                    .insert(geometry.kind(), GeometryBuffers::new(device, geometry));
            }
        }

        for batch in self.batches.values_mut() {
            batch.amount = 0;
        }
        for (key, raw_instances) in batch_renderables(&renderables) {
            match self.batches.get_mut(&key) {
                Some(batch) if batch.capacity >= raw_instances.len() => {
                    queue.write_buffer(&batch.buffer, 0, bytemuck::cast_slice(&raw_instances));
                    batch.amount = raw_instances.len();
                }
                _ => {
                    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Instance Buffer"),
                        contents: bytemuck::cast_slice(&raw_instances),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    });
                    self.batches.insert(
                        key,
                        InstanceBatch {
                            buffer,
                            capacity: raw_instances.len(),
                            amount: raw_instances.len(),
                        },
                    );
                }
            }
        }
    }

    fn instanced(&self) -> Vec<Instanced<'_>> {
        self.batches
            .iter()
            .filter(|(_, batch)| batch.amount > 0)
            .filter_map(|((kind, matcap), batch)| {
                let geometry = self.geometries.get(kind)?;
                let Some(bind_group) = self.matcaps.bind_group(matcap.index()) else {
                    log::warn!("matcap {} is not loaded", matcap.label());
                    return None;
                };
                Some(Instanced {
                    instance: &batch.buffer,
                    geometry,
                    matcap: bind_group,
                    amount: batch.amount,
                })
            })
            .collect()
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(1, camera_bind_group, &[]);
        for instanced in self.instanced() {
            render_pass.set_bind_group(0, instanced.matcap, &[]);
            render_pass.set_vertex_buffer(0, instanced.geometry.vertex.slice(..));
            render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
            render_pass.set_index_buffer(instanced.geometry.index.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(
                0..instanced.geometry.num_elements,
                0,
                0..instanced.amount as u32,
            );
        }
        self.axes.draw(render_pass, camera_bind_group);
    }
}
