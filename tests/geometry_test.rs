use cgmath::{InnerSpace, Vector3};
use matcap_scene::geometry::{
    Geometry, GeometryKind, ModelVertex, primitives,
    text::{TextGeometryOptions, text_geometry},
};

mod common;

use common::test_utils::{assert_unit_normals, assert_winding_matches_normals, block_font, test_font};

fn assert_well_formed(geometry: &Geometry) {
    assert!(!geometry.is_empty(), "{:?} is empty", geometry.kind());
    assert_eq!(geometry.indices().len() % 3, 0);
    assert!(
        geometry
            .indices()
            .iter()
            .all(|&i| (i as usize) < geometry.vertices().len())
    );
    assert_unit_normals(geometry);
    assert_winding_matches_normals(geometry);
}

#[test]
fn primitives_are_well_formed() {
    for geometry in [
        primitives::torus(0.3, 0.2, 20, 45),
        primitives::sphere(0.25, 32, 16),
        primitives::icosahedron(0.5),
        primitives::cuboid(0.5, 0.5, 0.5),
    ] {
        assert_well_formed(&geometry);
    }
}

#[test]
fn torus_grid_sizes() {
    let torus = primitives::torus(0.3, 0.2, 20, 45);
    assert_eq!(torus.kind(), GeometryKind::Torus);
    assert_eq!(torus.vertices().len(), 21 * 46);
    assert_eq!(torus.triangle_count(), 20 * 45 * 2);

    let bounds = torus.bounding_box().expect("torus has vertices");
    assert!((bounds.max.x - 0.5).abs() < 1e-4);
    assert!((bounds.max.z - 0.2).abs() < 1e-4);
}

#[test]
fn sphere_has_no_degenerate_pole_triangles() {
    let sphere = primitives::sphere(0.25, 32, 16);
    assert_eq!(sphere.kind(), GeometryKind::Sphere);
    assert_eq!(sphere.triangle_count(), 32 * 16 * 2 - 2 * 32);
    for vertex in sphere.vertices() {
        assert!((vertex.position().magnitude() - 0.25).abs() < 1e-5);
        assert!((vertex.normal() - vertex.position() / 0.25).magnitude() < 1e-4);
    }
}

#[test]
fn icosahedron_is_flat_shaded() {
    let icosahedron = primitives::icosahedron(0.5);
    assert_eq!(icosahedron.kind(), GeometryKind::Icosahedron);
    assert_eq!(icosahedron.triangle_count(), 20);
    for vertex in icosahedron.vertices() {
        assert!((vertex.position().magnitude() - 0.5).abs() < 1e-5);
    }
    for triangle in icosahedron.indices().chunks_exact(3) {
        let normals: Vec<_> = triangle
            .iter()
            .map(|&i| icosahedron.vertices()[i as usize].normal())
            .collect();
        assert!((normals[0] - normals[1]).magnitude() < 1e-6);
        assert!((normals[0] - normals[2]).magnitude() < 1e-6);
    }
}

#[test]
fn cuboid_spans_its_extent() {
    let cuboid = primitives::cuboid(0.5, 0.5, 0.5);
    assert_eq!(cuboid.kind(), GeometryKind::Box);
    assert_eq!(cuboid.triangle_count(), 12);
    let bounds = cuboid.bounding_box().expect("box has vertices");
    assert!((bounds.min - Vector3::new(-0.25, -0.25, -0.25)).magnitude() < 1e-6);
    assert!((bounds.max - Vector3::new(0.25, 0.25, 0.25)).magnitude() < 1e-6);
}

#[test]
fn geometry_fixes_clockwise_triangles() {
    let up = Vector3::unit_z();
    let vertices = vec![
        ModelVertex::new(Vector3::new(0.0, 0.0, 0.0), up),
        ModelVertex::new(Vector3::new(0.0, 1.0, 0.0), up),
        ModelVertex::new(Vector3::new(1.0, 0.0, 0.0), up),
    ];
    let geometry = Geometry::new(GeometryKind::Box, vertices, vec![0, 1, 2]);
    assert_eq!(geometry.indices(), &[0, 2, 1]);
    assert_winding_matches_normals(&geometry);
}

#[test]
fn empty_geometry_has_no_bounds() {
    let mut geometry = Geometry::new(GeometryKind::Text, vec![], vec![]);
    assert!(geometry.is_empty());
    assert!(geometry.bounding_box().is_none());
    assert_eq!(geometry.center(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn greeting_text_is_well_formed() {
    let text = text_geometry(&block_font(), "Happy Patel", &TextGeometryOptions::default())
        .expect("text builds");
    assert_eq!(text.kind(), GeometryKind::Text);
    assert_well_formed(&text);

    let bounds = text.bounding_box().expect("text has vertices");
    assert!((bounds.min.z + 0.03).abs() < 1e-5);
    assert!((bounds.max.z - 0.23).abs() < 1e-5);
    assert!(bounds.size().x > bounds.size().y);
}

#[test]
fn centred_text_has_its_bounds_around_the_origin() {
    let mut text = text_geometry(&block_font(), "Happy Patel", &TextGeometryOptions::default())
        .expect("text builds");
    let before = text.bounding_box().expect("text has vertices");
    let offset = text.center();
    assert!((offset + before.center()).magnitude() < 1e-5);

    let after = text.bounding_box().expect("text has vertices");
    assert!(after.center().magnitude() < 1e-4);
    assert!((after.size() - before.size()).magnitude() < 1e-4);
}

#[test]
fn text_without_bevel_spans_its_depth() {
    let options = TextGeometryOptions {
        bevel_enabled: false,
        ..Default::default()
    };
    let text = text_geometry(&test_font(), "ABC", &options).expect("text builds");
    assert_well_formed(&text);
    let bounds = text.bounding_box().expect("text has vertices");
    assert!(bounds.min.z.abs() < 1e-6);
    assert!((bounds.max.z - 0.2).abs() < 1e-6);
}

fn inside(p: (f32, f32), [a, b, c]: [Vector3<f32>; 3]) -> bool {
    let side = |u: Vector3<f32>, v: Vector3<f32>| (v.x - u.x) * (p.1 - u.y) - (v.y - u.y) * (p.0 - u.x);
    let (d1, d2, d3) = (side(a, b), side(b, c), side(c, a));
    let negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(negative && positive)
}

#[test]
fn caps_leave_holes_open() {
    // one font unit per world unit
    let options = TextGeometryOptions {
        size: 100.0,
        bevel_enabled: false,
        ..Default::default()
    };
    let text = text_geometry(&test_font(), "O", &options).expect("text builds");
    assert_well_formed(&text);

    let front_caps: Vec<[Vector3<f32>; 3]> = text
        .indices()
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]].map(|i| text.vertices()[i as usize]))
        .filter(|t| t.iter().all(|v| (v.normal() + Vector3::unit_z()).magnitude() < 1e-5))
        .map(|t| t.map(|v| v.position()))
        .collect();
    assert!(!front_caps.is_empty());
    assert!(front_caps.iter().all(|t| t.iter().all(|p| p.z.abs() < 1e-5)));
    assert!(front_caps.iter().any(|&t| inside((10.0, 10.0), t)));
    assert!(!front_caps.iter().any(|&t| inside((30.0, 30.0), t)));
}

#[test]
fn blank_text_builds_an_empty_geometry() {
    let text = text_geometry(&test_font(), "  ", &TextGeometryOptions::default())
        .expect("text builds");
    assert!(text.is_empty());
}
