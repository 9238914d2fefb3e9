//! Scene composition: the greeting text and the field of primitives.
//!
//! Composition runs once, after the font has loaded. It attaches one centred
//! text mesh and `primitive_count` randomly placed primitives to the scene
//! root. Every mesh shares one [`MatcapMaterial`], and the four primitive
//! geometries are built once and shared by all primitives of that shape.

use std::{f32::consts::PI, rc::Rc};

use cgmath::{Euler, Rad, Vector3};
use rand::Rng;

use crate::{
    config::SceneConfig,
    data_structures::{
        instance::Transform,
        material::{MatcapId, MatcapMaterial, SharedMaterial},
        scene_graph::{MeshNode, SceneGraph},
    },
    debug_panel::DebugPanel,
    geometry::{
        Geometry, GeometryKind, primitives,
        text::{TextGeometryOptions, text_geometry},
    },
    resources::font::Font,
};

/// Half the edge length of the cube primitives are scattered in.
pub const SCATTER_EXTENT: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Icosahedron,
    Box,
    Torus,
}

impl ShapeKind {
    /// Maps a roll of a four sided die to a shape. Any value other than
    /// 1, 2 or 3 picks the torus.
    pub fn from_roll(roll: u32) -> Self {
        match roll {
            1 => ShapeKind::Sphere,
            2 => ShapeKind::Icosahedron,
            3 => ShapeKind::Box,
            _ => ShapeKind::Torus,
        }
    }

    pub fn geometry_kind(self) -> GeometryKind {
        match self {
            ShapeKind::Sphere => GeometryKind::Sphere,
            ShapeKind::Icosahedron => GeometryKind::Icosahedron,
            ShapeKind::Box => GeometryKind::Box,
            ShapeKind::Torus => GeometryKind::Torus,
        }
    }
}

/// The four primitive shapes, built once and shared.
#[derive(Clone, Debug)]
pub struct PrimitiveGeometries {
    pub sphere: Rc<Geometry>,
    pub icosahedron: Rc<Geometry>,
    pub cuboid: Rc<Geometry>,
    pub torus: Rc<Geometry>,
}

impl Default for PrimitiveGeometries {
    fn default() -> Self {
        Self {
            sphere: Rc::new(primitives::sphere(0.25, 32, 16)),
            icosahedron: Rc::new(primitives::icosahedron(0.5)),
            cuboid: Rc::new(primitives::cuboid(0.5, 0.5, 0.5)),
            torus: Rc::new(primitives::torus(0.3, 0.2, 20, 45)),
        }
    }
}

impl PrimitiveGeometries {
    pub fn for_shape(&self, shape: ShapeKind) -> &Rc<Geometry> {
        match shape {
            ShapeKind::Sphere => &self.sphere,
            ShapeKind::Icosahedron => &self.icosahedron,
            ShapeKind::Box => &self.cuboid,
            ShapeKind::Torus => &self.torus,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComposeOptions {
    pub text: String,
    pub text_options: TextGeometryOptions,
    pub primitive_count: usize,
    pub matcap_count: usize,
    pub initial_matcap: MatcapId,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        SceneConfig::default().compose_options()
    }
}

/// What composition produced, kept for inspection.
#[derive(Clone, Debug)]
pub struct Composition {
    pub material: SharedMaterial,
    pub text: Rc<Geometry>,
    pub primitives: PrimitiveGeometries,
}

/// Draws one primitive: its shape and a transform inside the scatter cube.
///
/// Rotation around Z stays zero and the scale is uniform.
pub fn random_primitive<R: Rng + ?Sized>(rng: &mut R) -> (ShapeKind, Transform) {
    let shape = ShapeKind::from_roll(rng.random_range(1..=4));
    let mut coordinate = || (rng.random::<f32>() - 0.5) * SCATTER_EXTENT * 2.0;
    let position = Vector3::new(coordinate(), coordinate(), coordinate());
    let rotation = Euler::new(
        Rad(rng.random::<f32>() * PI),
        Rad(rng.random::<f32>() * PI),
        Rad(0.0),
    );
    let transform = Transform {
        position,
        rotation,
        ..Default::default()
    }
    .with_uniform_scale(rng.random::<f32>());
    (shape, transform)
}

/// Builds the text and primitive meshes, attaches them to the root of
/// `scene` and registers the shared material's matcap in the debug panel.
pub fn compose<R: Rng + ?Sized>(
    font: &Font,
    scene: &mut SceneGraph,
    panel: &mut DebugPanel,
    options: &ComposeOptions,
    rng: &mut R,
) -> anyhow::Result<Composition> {
    let material = MatcapMaterial::new(options.initial_matcap).shared();

    let mut text = text_geometry(font, &options.text, &options.text_options)?;
    text.center();
    log::info!("text bounding box: {:?}", text.bounding_box());
    let text = Rc::new(text);
    scene.add(Box::new(MeshNode::new(
        Rc::clone(&text),
        Rc::clone(&material),
        Transform::default(),
    )));

    let primitives = PrimitiveGeometries::default();
    for _ in 0..options.primitive_count {
        let (shape, transform) = random_primitive(rng);
        scene.add(Box::new(MeshNode::new(
            Rc::clone(primitives.for_shape(shape)),
            Rc::clone(&material),
            transform,
        )));
    }
    log::info!(
        "composed scene with {} meshes",
        scene.renderable_count()
    );

    panel.bind_matcap(Rc::clone(&material), options.matcap_count);

    Ok(Composition {
        material,
        text,
        primitives,
    })
}
