//! Parametric primitive shapes.
//!
//! The vertex layouts follow the three.js buffer geometries: smooth normals
//! for the torus and sphere, flat faces for the icosahedron and the box.

use std::f32::consts::{PI, TAU};

use cgmath::{ElementWise, InnerSpace, Vector3};

use super::{Geometry, GeometryKind, ModelVertex, normalize_or};

/// A ring torus in the XY plane.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Geometry {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let mut vertices =
        Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let ring = radius + tube * v.cos();
            let position = Vector3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = normalize_or(position - center, Vector3::unit_z());
            vertices.push(ModelVertex::new(position, normal));
        }
    }

    let stride = tubular_segments + 1;
    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::new(GeometryKind::Torus, vertices, indices)
}

/// A UV sphere with its poles on the Y axis.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut vertices =
        Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let position = Vector3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            );
            let normal = normalize_or(position, Vector3::unit_y());
            vertices.push(ModelVertex::new(position, normal));
        }
    }

    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            // the pole rows collapse to a single triangle per segment
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry::new(GeometryKind::Sphere, vertices, indices)
}

/// A regular icosahedron (subdivision detail 0) with flat shaded faces.
pub fn icosahedron(radius: f32) -> Geometry {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    #[rustfmt::skip]
    let corners = [
        [-1.0, t, 0.0], [1.0, t, 0.0], [-1.0, -t, 0.0], [1.0, -t, 0.0],
        [0.0, -1.0, t], [0.0, 1.0, t], [0.0, -1.0, -t], [0.0, 1.0, -t],
        [t, 0.0, -1.0], [t, 0.0, 1.0], [-t, 0.0, -1.0], [-t, 0.0, 1.0],
    ]
    .map(|c: [f32; 3]| Vector3::from(c).normalize() * radius);
    #[rustfmt::skip]
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    let mut vertices = Vec::with_capacity(faces.len() * 3);
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for face in faces {
        let [a, b, c] = face.map(|i| corners[i]);
        // the centroid of a face of a regular solid points along the face normal
        let normal = normalize_or(a + b + c, Vector3::unit_y());
        let base = vertices.len() as u32;
        vertices.extend([a, b, c].map(|p| ModelVertex::new(p, normal)));
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    Geometry::new(GeometryKind::Icosahedron, vertices, indices)
}

/// An axis aligned box centred on the origin, four vertices per face.
pub fn cuboid(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vector3::new(width, height, depth) * 0.5;
    let faces = [
        (Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
        (-Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
        (Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
        (-Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
        (Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
        (-Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let center = normal.mul_element_wise(half);
        let u = u.mul_element_wise(half);
        let v = v.mul_element_wise(half);
        let base = vertices.len() as u32;
        vertices.extend(
            [center - u - v, center + u - v, center + u + v, center - u + v]
                .map(|p| ModelVertex::new(p, normal)),
        );
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry::new(GeometryKind::Box, vertices, indices)
}
