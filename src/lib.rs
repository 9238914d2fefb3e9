//! matcap-scene
//!
//! A cross-platform (native and WASM) scene built on wgpu: an extruded,
//! bevelled greeting text surrounded by a few hundred randomly placed
//! primitives, all shaded by one shared matcap material. The camera orbits the
//! text with damped mouse controls and a small egui panel toggles an axes
//! helper and switches the matcap.
//!
//! High-level modules
//! - `camera`: camera, projection and the camera uniform
//! - `composer`: builds the text and the random primitives into the scene
//! - `config`: scene configuration and its defaults
//! - `context`: central GPU and window context that owns device/queue/renderers
//! - `controls`: damped orbit controls
//! - `data_structures`: transforms, materials, the scene graph and textures
//! - `debug_panel`: the egui debug panel and its renderer
//! - `flow`: application lifecycle, frame loop and cancellation
//! - `geometry`: primitive shapes and extruded text meshes
//! - `pipelines`: the matcap and axes helper render pipelines
//! - `render`: instance batching and drawing of the scene graph
//! - `resources`: loading of matcap textures and typeface fonts
//! - `viewport`: drawable size and pixel ratio handling
//!

pub mod camera;
pub mod composer;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod debug_panel;
pub mod flow;
pub mod geometry;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use config::SceneConfig;
pub use flow::{CancellationToken, run, run_until_cancelled};
pub use winit::event::WindowEvent;
