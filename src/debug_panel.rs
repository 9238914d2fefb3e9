//! The debug panel: a small egui window to tweak the scene while it runs.
//!
//! The window starts collapsed. Its "Text" section holds the axes helper
//! toggle and, once the scene is composed, a selector for the matcap of the
//! shared material.

use std::sync::Arc;

use winit::{event::WindowEvent, window::Window};

use crate::data_structures::material::{MatcapId, SharedMaterial};

pub const PANEL_TITLE: &str = "Debug";
pub const TEXT_FOLDER: &str = "Text";

struct MatcapControl {
    material: SharedMaterial,
    choices: usize,
}

#[derive(Default)]
pub struct DebugPanel {
    axes_visible: bool,
    matcap: Option<MatcapControl>,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axes_visible(&self) -> bool {
        self.axes_visible
    }

    pub fn set_axes_visible(&mut self, visible: bool) {
        self.axes_visible = visible;
    }

    /// Offers the matcaps `1..=choices` for `material`.
    pub fn bind_matcap(&mut self, material: SharedMaterial, choices: usize) {
        self.matcap = Some(MatcapControl { material, choices });
    }

    /// Number of matcaps offered, zero before a material is bound.
    pub fn matcap_choices(&self) -> usize {
        self.matcap.as_ref().map_or(0, |control| control.choices)
    }

    pub fn selected_matcap(&self) -> Option<MatcapId> {
        self.matcap
            .as_ref()
            .map(|control| control.material.borrow().matcap())
    }

    /// Selects the matcap at `index` (zero based) as if picked in the panel.
    pub fn select_matcap(&mut self, index: usize) -> anyhow::Result<()> {
        let control = self
            .matcap
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no material is bound to the matcap control"))?;
        if index >= control.choices {
            anyhow::bail!(
                "matcap {} is out of range, only {} are offered",
                index + 1,
                control.choices
            );
        }
        control.material.borrow_mut().set_matcap(MatcapId::new(index));
        Ok(())
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        egui::Window::new(PANEL_TITLE)
            .default_open(false)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .show(ctx, |ui| {
                egui::CollapsingHeader::new(TEXT_FOLDER)
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.checkbox(&mut self.axes_visible, "visible");
                        if let Some(control) = &self.matcap {
                            let current = control.material.borrow().matcap();
                            let mut selected = current.index();
                            egui::ComboBox::from_label("matcap")
                                .selected_text(current.label())
                                .show_ui(ui, |ui| {
                                    for index in 0..control.choices {
                                        ui.selectable_value(
                                            &mut selected,
                                            index,
                                            MatcapId::new(index).label(),
                                        );
                                    }
                                });
                            if selected != current.index() {
                                log::debug!("matcap {} selected", selected + 1);
                                control.material.borrow_mut().set_matcap(MatcapId::new(selected));
                            }
                        }
                    });
            });
    }
}

/// Draws a [`DebugPanel`] on top of the rendered scene.
pub struct PanelRenderer {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl PanelRenderer {
    pub fn new(window: &Arc<Window>, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns `true` if egui consumed the event.
    pub fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Records the panel into `encoder`, drawing over `view`. Returns extra
    /// command buffers egui needs submitted before the encoder.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        panel: &mut DebugPanel,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        pixels_per_point: f32,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = capped_input(self.state.take_egui_input(window), pixels_per_point);
        let full_output = self.ctx.run(raw_input, |ctx| panel.ui(ctx));
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };
        let command_buffers =
            self.renderer
                .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        command_buffers
    }
}

/// Makes egui lay out and rasterise at `pixels_per_point`, the ratio the
/// surface is actually sized with, instead of the window's native scale.
pub fn capped_input(mut raw_input: egui::RawInput, pixels_per_point: f32) -> egui::RawInput {
    raw_input
        .viewports
        .entry(raw_input.viewport_id)
        .or_default()
        .native_pixels_per_point = Some(pixels_per_point);
    raw_input
}
