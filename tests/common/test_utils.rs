use std::cell::RefCell;

use cgmath::InnerSpace;
use matcap_scene::{
    flow::Stage,
    geometry::Geometry,
    resources::font::Font,
    viewport::BackingSurface,
};
use rand::{SeedableRng, rngs::StdRng};

/// A tiny font in units of 1/100 with one glyph per outline command.
pub const TEST_FONT: &str = r#"{
    "familyName": "Test",
    "resolution": 100,
    "underlineThickness": 10,
    "boundingBox": { "xMin": 0, "xMax": 60, "yMin": -20, "yMax": 80 },
    "glyphs": {
        "A": { "ha": 60, "o": "m 0 0 l 50 0 l 50 50 l 0 50 z" },
        "B": { "ha": 60, "o": "m 0 0 l 40 0 q 40 40 60 20 l 0 40 z" },
        "C": { "ha": 60, "o": "m 0 0 l 40 0 b 40 40 60 10 60 30 l 0 40 z" },
        "D": { "ha": 60, "o": "m 0 0 l 10 0 l 10 10 l 0 0 z" },
        "O": { "ha": 70, "o": "m 0 0 l 60 0 l 60 60 l 0 60 z m 20 20 l 20 40 l 40 40 l 40 20 z" },
        "?": { "ha": 40, "o": "m 0 0 l 30 0 l 30 30 z" },
        " ": { "ha": 30 }
    }
}"#;

pub const BLOCK_FONT: &str = include_str!("../../assets/fonts/block_regular.typeface.json");

pub fn test_font() -> Font {
    Font::from_json(TEST_FONT).expect("test font parses")
}

pub fn block_font() -> Font {
    Font::from_json(BLOCK_FONT).expect("bundled font parses")
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn assert_unit_normals(geometry: &Geometry) {
    for vertex in geometry.vertices() {
        let length = vertex.normal().magnitude();
        assert!(
            (length - 1.0).abs() < 1e-4,
            "{:?} normal {:?} has length {length}",
            geometry.kind(),
            vertex.normal
        );
    }
}

/// Counter-clockwise triangles must face the same way as their vertex normals.
pub fn assert_winding_matches_normals(geometry: &Geometry) {
    let vertices = geometry.vertices();
    for triangle in geometry.indices().chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| vertices[i as usize]);
        let face = (b.position() - a.position()).cross(c.position() - a.position());
        let normal = a.normal() + b.normal() + c.normal();
        assert!(
            face.dot(normal) >= 0.0,
            "{:?} triangle {triangle:?} is wound against its normals",
            geometry.kind()
        );
    }
}

/// Records every backing resize it receives.
#[derive(Default)]
pub struct RecordingSurface {
    pub sizes: Vec<(u32, u32)>,
}

impl BackingSurface for RecordingSurface {
    fn resize_backing(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }
}

/// A frame loop stage that logs its calls.
#[derive(Default)]
pub struct RecordingStage {
    pub calls: RefCell<Vec<&'static str>>,
    pub fail_with: Option<wgpu::SurfaceError>,
}

impl Stage for RecordingStage {
    fn advance_controls(&mut self) {
        self.calls.borrow_mut().push("advance_controls");
    }

    fn draw(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.calls.borrow_mut().push("draw");
        match self.fail_with.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn request_next_frame(&self) {
        self.calls.borrow_mut().push("request_next_frame");
    }
}
