use cgmath::Deg;
use matcap_scene::{
    camera::Projection,
    viewport::{MAX_PIXEL_RATIO, Viewport, clamp_pixel_ratio},
};
use winit::dpi::PhysicalSize;

mod common;

use common::test_utils::RecordingSurface;

fn projection() -> Projection {
    Projection::new(1, 1, Deg(75.0), 0.1, 100.0)
}

#[test]
fn pixel_ratio_is_capped_at_two() {
    assert_eq!(MAX_PIXEL_RATIO, 2.0);
    for (dpr, applied) in [(0.5, 0.5), (1.0, 1.0), (1.5, 1.5), (2.0, 2.0), (2.5, 2.0), (4.0, 2.0)] {
        assert_eq!(clamp_pixel_ratio(dpr), applied, "device pixel ratio {dpr}");
    }
}

#[test]
fn resize_updates_projection_and_backing() {
    let mut viewport = Viewport::new(1.0, 1.0, 1.0);
    let mut projection = projection();
    let mut surface = RecordingSurface::default();

    assert!(viewport.resize(800.0, 600.0, 3.0, &mut projection, &mut surface));
    assert_eq!(viewport.width(), 800.0);
    assert_eq!(viewport.height(), 600.0);
    assert_eq!(viewport.pixel_ratio(), 2.0);
    assert_eq!(viewport.backing_size(), (1600, 1200));
    assert!((projection.aspect() - 4.0 / 3.0).abs() < 1e-6);
    assert_eq!(surface.sizes, vec![(1600, 1200)]);
}

#[test]
fn identical_resizes_are_idempotent() {
    let mut viewport = Viewport::new(1.0, 1.0, 1.0);
    let mut projection = projection();
    let mut surface = RecordingSurface::default();

    viewport.resize(1280.0, 720.0, 1.25, &mut projection, &mut surface);
    let (first_viewport, first_matrix) = (viewport, projection.calc_matrix());

    viewport.resize(1280.0, 720.0, 1.25, &mut projection, &mut surface);
    assert_eq!(viewport, first_viewport);
    assert_eq!(projection.calc_matrix(), first_matrix);
    assert_eq!(surface.sizes, vec![(1600, 900), (1600, 900)]);
}

#[test]
fn zero_sized_resizes_are_ignored() {
    let mut viewport = Viewport::new(640.0, 480.0, 1.0);
    let mut projection = projection();
    projection.set_aspect(viewport.aspect());
    let mut surface = RecordingSurface::default();

    assert!(!viewport.resize(0.0, 480.0, 1.0, &mut projection, &mut surface));
    assert!(!viewport.resize(640.0, 0.0, 1.0, &mut projection, &mut surface));
    assert_eq!(viewport, Viewport::new(640.0, 480.0, 1.0));
    assert!((projection.aspect() - 4.0 / 3.0).abs() < 1e-6);
    assert!(surface.sizes.is_empty());
}

#[test]
fn backing_is_at_least_one_pixel() {
    let viewport = Viewport::new(0.2, 0.2, 1.0);
    assert_eq!(viewport.backing_size(), (1, 1));
}

#[test]
fn physical_sizes_are_converted_to_logical() {
    let viewport = Viewport::from_physical(PhysicalSize::new(3000, 1500), 3.0);
    assert_eq!(viewport.width(), 1000.0);
    assert_eq!(viewport.height(), 500.0);
    assert_eq!(viewport.backing_size(), (2000, 1000));

    let mut viewport = Viewport::new(1.0, 1.0, 1.0);
    let mut projection = projection();
    let mut surface = RecordingSurface::default();
    assert!(viewport.resize_physical(PhysicalSize::new(1024, 768), 1.0, &mut projection, &mut surface));
    assert_eq!(surface.sizes, vec![(1024, 768)]);
    assert!(!viewport.resize_physical(PhysicalSize::new(0, 0), 1.0, &mut projection, &mut surface));
}
