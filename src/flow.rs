//! Application lifecycle and the frame loop.
//!
//! [`run`] opens the window and drives the winit event loop:
//!
//! 1. On `resumed` the window is created, the matcaps are loaded and the GPU
//!    context is set up. The font starts loading at the same time.
//! 2. Once the font has loaded the scene is composed, as a continuation of the
//!    font future. Until then frames show an empty scene.
//! 3. Every `RedrawRequested` runs one [`FrameLoop::tick`]: advance the orbit
//!    controls, render, request the next frame.
//! 4. The loop ends when the [`CancellationToken`] is cancelled, by closing the
//!    window, by Ctrl-C (native) or by calling [`CancellationToken::cancel`].
//!
//! Natively futures are driven by a tokio runtime owned by the app. On the web
//! they are spawned with `spawn_local` and report back through the event loop
//! proxy as [`FlowEvent`]s.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::TryFutureExt;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    composer::{self, ComposeOptions},
    config::SceneConfig,
    context::Context,
    data_structures::scene_graph::SceneGraph,
    debug_panel::DebugPanel,
    resources::{AssetProvider, font::Font},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Longest time an idle event loop sleeps before it checks for cancellation.
pub const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Shared flag that stops the frame loop once set.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a frame does, in order.
pub trait Stage {
    /// Advances the orbit control damping by one step.
    fn advance_controls(&mut self);

    fn draw(&mut self) -> Result<(), wgpu::SurfaceError>;

    /// Schedules the next tick for the next display refresh.
    fn request_next_frame(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Cancelled,
}

pub struct FrameLoop {
    clock: Instant,
    frames: u64,
    token: CancellationToken,
}

impl FrameLoop {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            clock: Instant::now(),
            frames: 0,
            token,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// How an idle event loop should wait, or `None` once cancelled.
    ///
    /// A token cancelled from another thread sends no window event, so the
    /// loop wakes every [`CANCEL_CHECK_INTERVAL`] to look at it.
    pub fn idle_control_flow(&self) -> Option<ControlFlow> {
        if self.token.is_cancelled() {
            None
        } else {
            Some(ControlFlow::wait_duration(CANCEL_CHECK_INTERVAL))
        }
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame unless the token is cancelled.
    ///
    /// A failed draw is returned as is and does not schedule another frame.
    pub fn tick<S: Stage + ?Sized>(
        &mut self,
        stage: &mut S,
    ) -> Result<FrameStatus, wgpu::SurfaceError> {
        if self.token.is_cancelled() {
            return Ok(FrameStatus::Cancelled);
        }
        log::trace!("frame {} at {:?}", self.frames, self.clock.elapsed());
        stage.advance_controls();
        stage.draw()?;
        self.frames += 1;
        stage.request_next_frame();
        Ok(FrameStatus::Continue)
    }
}

/// Results of background work, delivered through the event loop.
pub enum FlowEvent {
    Initialized(Box<AppState>),
    FontLoaded(Font),
    Failed(anyhow::Error),
}

pub struct AppState {
    pub(crate) ctx: Context,
    scene: SceneGraph,
    panel: DebugPanel,
}

impl AppState {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            scene: SceneGraph::new(),
            panel: DebugPanel::new(),
        }
    }

    fn resize(&mut self) {
        let window = self.ctx.window().clone();
        self.ctx.resize(window.inner_size(), window.scale_factor());
    }

    fn compose(&mut self, font: &Font, options: &ComposeOptions) -> anyhow::Result<()> {
        composer::compose(font, &mut self.scene, &mut self.panel, options, &mut rand::rng())?;
        Ok(())
    }
}

impl Stage for AppState {
    fn advance_controls(&mut self) {
        self.ctx.camera.update(&self.ctx.queue);
    }

    fn draw(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.render(&self.scene, &mut self.panel)
    }

    fn request_next_frame(&self) {
        self.ctx.window().request_redraw();
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    config: SceneConfig,
    assets: AssetProvider,
    state: Option<AppState>,
    // the font can arrive before the GPU context on the web
    pending_font: Option<Font>,
    frame_loop: FrameLoop,
    started: bool,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        config: SceneConfig,
        token: CancellationToken,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = {
            let runtime = tokio::runtime::Runtime::new()?;
            let token = token.clone();
            runtime.spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("interrupted, shutting down");
                    token.cancel();
                }
            });
            runtime
        };
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            assets: AssetProvider::new(config.asset_root.clone()),
            config,
            state: None,
            pending_font: None,
            frame_loop: FrameLoop::new(token),
            started: false,
            error: None,
        })
    }

    fn install(&mut self, mut state: AppState) {
        state.resize();
        if let Some(font) = self.pending_font.take() {
            self.compose_scene(&mut state, &font);
        }
        state.ctx.window().request_redraw();
        self.state = Some(state);
    }

    fn compose_scene(&mut self, state: &mut AppState, font: &Font) {
        if let Err(e) = state.compose(font, &self.config.compose_options()) {
            self.record_failure(e.context("failed to compose the scene"));
        }
    }

    fn record_failure(&mut self, error: anyhow::Error) {
        log::error!("{error:#}");
        self.frame_loop.token().cancel();
        self.error.get_or_insert(error);
    }

    fn deliver(&self, event: FlowEvent) {
        if self.proxy.send_event(event).is_err() {
            log::warn!("event loop closed before a background task finished");
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(self.config.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.record_failure(anyhow::Error::new(e).context("failed to create the window"));
                event_loop.exit();
                return;
            }
        };

        let init_future = {
            let assets = self.assets.clone();
            let config = self.config.clone();
            async move {
                let matcaps = assets.load_matcaps(&config.matcaps).await?;
                let ctx = Context::new(window, &config, &matcaps).await?;
                anyhow::Ok(AppState::new(ctx))
            }
        };
        // composition continues from this once the font is there
        let font_future = {
            let assets = self.assets.clone();
            let path = self.config.font.clone();
            async move { assets.load_font(&path).await }
                .map_ok(FlowEvent::FontLoaded)
                .unwrap_or_else(FlowEvent::Failed)
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.install(state),
                Err(e) => {
                    self.record_failure(e.context("failed to initialize the renderer"));
                    event_loop.exit();
                    return;
                }
            }
            let event = self.async_runtime.block_on(font_future);
            self.deliver(event);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(state) => FlowEvent::Initialized(Box::new(state)),
                    Err(e) => FlowEvent::Failed(e.context("failed to initialize the renderer")),
                };
                if proxy.send_event(event).is_err() {
                    log::warn!("event loop closed before the renderer was ready");
                }
            });
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if proxy.send_event(font_future.await).is_err() {
                    log::warn!("event loop closed before the font was loaded");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(state) => self.install(*state),
            FlowEvent::FontLoaded(font) => match self.state.take() {
                Some(mut state) => {
                    self.compose_scene(&mut state, &font);
                    self.state = Some(state);
                }
                None => self.pending_font = Some(font),
            },
            FlowEvent::Failed(e) => self.record_failure(e),
        }
        if self.frame_loop.token().is_cancelled() {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            self.frame_loop.token().cancel();
            event_loop.exit();
            return;
        }
        let Some(state) = &mut self.state else {
            return;
        };

        let consumed = state.ctx.panel.handle_window_event(&state.ctx.window, &event);
        if !consumed {
            state.ctx.camera.controls.handle_window_events(&event);
        }

        match event {
            WindowEvent::Resized(size) => {
                let scale_factor = state.ctx.window.scale_factor();
                state.ctx.resize(size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = state.ctx.window.inner_size();
                state.ctx.resize(size, scale_factor);
            }
            WindowEvent::RedrawRequested => match self.frame_loop.tick(state) {
                Ok(FrameStatus::Continue) => {}
                Ok(FrameStatus::Cancelled) => event_loop.exit(),
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    state.ctx.target.reconfigure();
                    state.ctx.window.request_redraw();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    log::warn!("timed out waiting for the next surface texture");
                    state.ctx.window.request_redraw();
                }
                Err(e) => {
                    let error = anyhow::anyhow!("unable to render: {e}");
                    self.record_failure(error);
                    event_loop.exit();
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.frame_loop.idle_control_flow() {
            Some(control_flow) => event_loop.set_control_flow(control_flow),
            None => event_loop.exit(),
        }
    }
}

/// Opens the window and runs the scene until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    run_until_cancelled(config, CancellationToken::new())
}

/// Like [`run`], but also stops once `token` is cancelled.
pub fn run_until_cancelled(config: SceneConfig, token: CancellationToken) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            log::warn!("Could not initialize logger: {e}");
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, token)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
