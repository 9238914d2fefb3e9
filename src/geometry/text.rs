//! Extruded, bevelled text.
//!
//! Glyph outlines are extruded along +Z. With bevelling enabled the solid is
//! built from a stack of layers: the front bevel rounds from `z = -thickness`
//! towards the body, the body runs from `z = 0` to `z = depth`, and the back
//! bevel mirrors the front one. Neighbouring layers are joined by flat shaded
//! side walls; the first and the last layer are closed by triangulated caps.

use std::f32::consts::FRAC_PI_2;

use anyhow::anyhow;
use cgmath::{InnerSpace, Vector2, Vector3};
use lyon::math::{Point, point};
use lyon::path::Path;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

use super::{Geometry, GeometryKind, ModelVertex, normalize_or};
use crate::resources::font::Font;

/// Sharp corners are not pushed out further than four times the bevel size.
const MITER_LIMIT_COS: f32 = 0.25;

#[derive(Clone, Debug, PartialEq)]
pub struct TextGeometryOptions {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
    pub steps: u32,
}

impl Default for TextGeometryOptions {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 4,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
            steps: 1,
        }
    }
}

/// One slice of the extrusion: its depth and how far the outline is pushed out.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Layer {
    z: f32,
    offset: f32,
}

/// Builds the text mesh. The result is not centred; its origin is the start
/// of the first baseline.
pub fn text_geometry(
    font: &Font,
    text: &str,
    options: &TextGeometryOptions,
) -> anyhow::Result<Geometry> {
    let layers = extrusion_layers(options);
    let front_layers = if options.bevel_enabled {
        options.bevel_segments.max(1) as usize
    } else {
        0
    };
    let back_start = front_layers + options.steps.max(1) as usize;

    let mut mesh = MeshBuilder::default();
    for outline in font.outline_text(text, options.size, options.curve_segments) {
        if outline.contours.is_empty() {
            continue;
        }
        let contours = orient_contours(&outline.contours);
        let directions: Vec<_> = contours.iter().map(|c| offset_directions(c)).collect();

        // both caps sit on a layer with the bevel offset, so they share one triangulation
        let (front, back) = (layers[0], layers[layers.len() - 1]);
        let caps = tessellate_caps(&contours, &directions, front.offset)?;
        mesh.push_cap(&caps, front.z, -Vector3::unit_z());
        mesh.push_cap(&caps, back.z, Vector3::unit_z());

        for (contour, dirs) in contours.iter().zip(&directions) {
            let rings: Vec<Vec<Vector3<f32>>> = layers
                .iter()
                .map(|layer| {
                    contour
                        .iter()
                        .zip(dirs)
                        .map(|(p, d)| {
                            Vector3::new(p.x + d.x * layer.offset, p.y + d.y * layer.offset, layer.z)
                        })
                        .collect()
                })
                .collect();

            for (l, pair) in rings.windows(2).enumerate() {
                let z_hint = if l < front_layers {
                    -1.0
                } else if l >= back_start {
                    1.0
                } else {
                    0.0
                };
                for i in 0..contour.len() {
                    let j = (i + 1) % contour.len();
                    let edge = edge_normal(contour[i], contour[j]);
                    let outward = Vector3::new(edge.x, edge.y, z_hint);
                    mesh.push_quad([pair[0][i], pair[0][j], pair[1][j], pair[1][i]], outward);
                }
            }
        }
    }

    Ok(Geometry::new(GeometryKind::Text, mesh.vertices, mesh.indices))
}

fn extrusion_layers(options: &TextGeometryOptions) -> Vec<Layer> {
    let steps = options.steps.max(1);
    let segments = options.bevel_segments.max(1);
    let bevel = |b: u32| {
        let t = b as f32 / segments as f32 * FRAC_PI_2;
        (
            options.bevel_thickness * t.cos(),
            options.bevel_size * t.sin() + options.bevel_offset,
        )
    };

    let mut layers = Vec::new();
    if options.bevel_enabled {
        layers.extend((0..segments).map(bevel).map(|(z, offset)| Layer { z: -z, offset }));
    }
    let body_offset = if options.bevel_enabled {
        options.bevel_size + options.bevel_offset
    } else {
        0.0
    };
    layers.extend((0..=steps).map(|s| Layer {
        z: options.depth * s as f32 / steps as f32,
        offset: body_offset,
    }));
    if options.bevel_enabled {
        layers.extend((0..segments).rev().map(bevel).map(|(z, offset)| Layer {
            z: options.depth + z,
            offset,
        }));
    }
    layers
}

/// Winds outer contours counter-clockwise and holes clockwise. A contour is a
/// hole when it lies inside an odd number of the glyph's other contours.
fn orient_contours(contours: &[Vec<Point>]) -> Vec<Vec<Point>> {
    contours
        .iter()
        .enumerate()
        .map(|(i, contour)| {
            let nesting = contours
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && contains(other, contour[0]))
                .count();
            let is_hole = nesting % 2 == 1;
            let mut oriented = contour.clone();
            if is_hole == (signed_area(contour) > 0.0) {
                oriented.reverse();
            }
            oriented
        })
        .collect()
}

fn signed_area(contour: &[Point]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

/// Even-odd point in polygon test.
fn contains(polygon: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Right hand normal of the edge `a -> b`, which points out of the filled
/// area for the orientation produced by [`orient_contours`].
fn edge_normal(a: Point, b: Point) -> Vector2<f32> {
    let d = Vector2::new(b.x - a.x, b.y - a.y);
    let n = Vector2::new(d.y, -d.x);
    let length = n.magnitude();
    if length > f32::EPSILON { n / length } else { n }
}

/// Per vertex direction along which the outline grows by one unit of offset.
fn offset_directions(contour: &[Point]) -> Vec<Vector2<f32>> {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let prev = edge_normal(contour[(i + n - 1) % n], contour[i]);
            let next = edge_normal(contour[i], contour[(i + 1) % n]);
            let sum = prev + next;
            if sum.magnitude2() < 1e-12 {
                return next;
            }
            let miter = sum.normalize();
            miter / miter.dot(next).max(MITER_LIMIT_COS)
        })
        .collect()
}

fn tessellate_caps(
    contours: &[Vec<Point>],
    directions: &[Vec<Vector2<f32>>],
    offset: f32,
) -> anyhow::Result<VertexBuffers<Point, u32>> {
    let mut builder = Path::builder();
    for (contour, dirs) in contours.iter().zip(directions) {
        let mut points = contour
            .iter()
            .zip(dirs)
            .map(|(p, d)| point(p.x + d.x * offset, p.y + d.y * offset));
        let Some(first) = points.next() else { continue };
        builder.begin(first);
        for p in points {
            builder.line_to(p);
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::non_zero(),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| vertex.position()),
        )
        .map_err(|e| anyhow!("failed to triangulate glyph caps: {e:?}"))?;
    Ok(buffers)
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<ModelVertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn push_cap(&mut self, caps: &VertexBuffers<Point, u32>, z: f32, normal: Vector3<f32>) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(
            caps.vertices
                .iter()
                .map(|p| ModelVertex::new(Vector3::new(p.x, p.y, z), normal)),
        );
        self.indices.extend(caps.indices.iter().map(|i| base + i));
    }

    /// Adds a flat shaded quad. `outward` only decides which side the face
    /// normal points to.
    fn push_quad(&mut self, corners: [Vector3<f32>; 4], outward: Vector3<f32>) {
        let [a, b, c, d] = corners;
        let normal = (c - a).cross(d - b);
        if normal.magnitude2() < 1e-14 {
            return;
        }
        let mut normal = normalize_or(normal, outward);
        if normal.dot(outward) < 0.0 {
            normal = -normal;
        }
        let base = self.vertices.len() as u32;
        self.vertices.extend(corners.map(|p| ModelVertex::new(p, normal)));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
