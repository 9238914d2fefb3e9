use std::{iter, sync::Arc};

use anyhow::Context as _;
use cgmath::Deg;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::{Camera, CameraResources, Projection},
    config::SceneConfig,
    controls::OrbitControls,
    data_structures::{scene_graph::SceneGraph, texture},
    debug_panel::{DebugPanel, PanelRenderer},
    render::SceneRenderer,
    viewport::{BackingSurface, Viewport},
};

/// The window surface together with its configuration and depth buffer.
#[derive(Debug)]
pub struct SurfaceTarget {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub(crate) depth_texture: texture::Texture,
    device: wgpu::Device,
}

impl SurfaceTarget {
    pub fn new(
        surface: wgpu::Surface<'static>,
        device: wgpu::Device,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        surface.configure(&device, &config);
        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );
        Self {
            surface,
            config,
            depth_texture,
            device,
        }
    }

    pub fn size(&self) -> [u32; 2] {
        [self.config.width, self.config.height]
    }

    /// Configures the surface again with the current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl BackingSurface for SurfaceTarget {
    fn resize_backing(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
    }
}

/// Everything needed to draw a frame: GPU handles, the surface, the camera
/// with its controls, the viewport and the renderers.
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub target: SurfaceTarget,
    pub camera: CameraResources,
    pub viewport: Viewport,
    pub renderer: SceneRenderer,
    pub panel: PanelRenderer,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(
        window: Arc<Window>,
        config: &SceneConfig,
        matcaps: &[image::RgbaImage],
    ) -> anyhow::Result<Self> {
        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let (width, height) = viewport.backing_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to the window")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // matcaps are authored in sRGB
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no texture formats")?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        let target = SurfaceTarget::new(surface, device.clone(), surface_config);

        let camera_config = &config.camera;
        let camera = Camera::new(camera_config.position, camera_config.target);
        let mut projection = Projection::new(
            width,
            height,
            Deg(camera_config.fovy_degrees),
            camera_config.znear,
            camera_config.zfar,
        );
        projection.set_aspect(viewport.aspect());
        projection.update_projection_matrix();
        let mut controls = OrbitControls::new(camera_config.target, camera_config.damping_factor);
        controls.set_viewport_height(viewport.height() as f32);
        controls.set_scale_factor(window.scale_factor());
        let camera = CameraResources::new(&device, camera, projection, controls);

        let renderer = SceneRenderer::new(
            &device,
            &queue,
            surface_format,
            &camera.bind_group_layout,
            matcaps,
        )?;
        let panel = PanelRenderer::new(&window, &device, surface_format);

        Ok(Self {
            window,
            device,
            queue,
            target,
            camera,
            viewport,
            renderer,
            panel,
            clear_colour: config.clear_colour,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Applies a new window size. See [`Viewport::resize`].
    pub fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let resized = self.viewport.resize_physical(
            size,
            scale_factor,
            &mut self.camera.projection,
            &mut self.target,
        );
        self.camera.controls.set_scale_factor(scale_factor);
        if resized {
            self.camera
                .controls
                .set_viewport_height(self.viewport.height() as f32);
        }
    }

    /// Draws the scene and the debug panel into the next surface texture.
    pub fn render(
        &mut self,
        scene: &SceneGraph,
        panel: &mut DebugPanel,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.target.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.set_axes_visible(panel.axes_visible());
        self.renderer.prepare(&self.device, &self.queue, scene);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.target.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.renderer.draw(&mut render_pass, &self.camera.bind_group);
        }

        let panel_commands = self.panel.render(
            panel,
            &self.window,
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            self.target.size(),
            self.viewport.pixel_ratio() as f32,
        );

        self.queue
            .submit(panel_commands.into_iter().chain(iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}
