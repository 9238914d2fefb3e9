//! Scene configuration. The defaults reproduce the greeting scene.

use crate::{
    composer::ComposeOptions, data_structures::material::MatcapId,
    geometry::text::TextGeometryOptions,
};

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 100.0,
            position: [1.0, 1.0, 2.0],
            target: [0.0, 0.0, 0.0],
            damping_factor: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub text: String,
    pub primitive_count: usize,
    /// Directory (native) or URL path below the page origin (web) that asset
    /// paths are relative to.
    pub asset_root: String,
    pub font: String,
    pub matcaps: Vec<String>,
    /// Zero based index into `matcaps`.
    pub initial_matcap: usize,
    pub text_options: TextGeometryOptions,
    pub camera: CameraConfig,
    pub clear_colour: wgpu::Color,
    pub title: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            text: "Happy Patel".to_string(),
            primitive_count: 250,
            asset_root: "assets".to_string(),
            font: "fonts/block_regular.typeface.json".to_string(),
            matcaps: (1..=8).map(|i| format!("textures/matcaps/{i}.png")).collect(),
            initial_matcap: 7,
            text_options: TextGeometryOptions::default(),
            camera: CameraConfig::default(),
            clear_colour: wgpu::Color::BLACK,
            title: "matcap-scene".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn compose_options(&self) -> ComposeOptions {
        let matcap_count = self.matcaps.len();
        ComposeOptions {
            text: self.text.clone(),
            text_options: self.text_options.clone(),
            primitive_count: self.primitive_count,
            matcap_count,
            initial_matcap: MatcapId::new(self.initial_matcap.min(matcap_count.saturating_sub(1))),
        }
    }
}
