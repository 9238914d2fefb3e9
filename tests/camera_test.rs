use cgmath::{Deg, InnerSpace, MetricSpace, Point3};
use matcap_scene::{
    camera::{Camera, Projection},
    controls::OrbitControls,
};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, ElementState, MouseButton, WindowEvent},
};

fn setup(damping: bool) -> (Camera, Projection, OrbitControls) {
    let camera = Camera::new((1.0, 1.0, 2.0), (0.0, 0.0, 0.0));
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0), 0.05);
    controls.enable_damping = damping;
    controls.set_viewport_height(600.0);
    (camera, projection, controls)
}

#[test]
fn projection_follows_the_aspect() {
    let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
    assert!((projection.aspect() - 4.0 / 3.0).abs() < 1e-6);
    projection.resize(600, 600);
    assert!((projection.aspect() - 1.0).abs() < 1e-6);
    let square = projection.calc_matrix();
    projection.set_aspect(2.0);
    projection.update_projection_matrix();
    assert_ne!(projection.calc_matrix(), square);
}

#[test]
fn idle_controls_keep_the_camera() {
    let (mut camera, projection, mut controls) = setup(true);
    let start = camera.position;
    for _ in 0..10 {
        assert!(!controls.update(&mut camera, &projection));
    }
    assert!(camera.position.distance(start) < 1e-5);
}

#[test]
fn damped_rotation_settles() {
    let (mut camera, projection, mut controls) = setup(true);
    let origin = Point3::new(0.0, 0.0, 0.0);
    let radius = camera.position.distance(origin);

    controls.rotate_left(1.0);
    controls.rotate_up(0.2);

    let mut steps = Vec::new();
    for _ in 0..200 {
        let before = camera.position;
        controls.update(&mut camera, &projection);
        steps.push(camera.position.distance(before));
        assert!((camera.position.distance(origin) - radius).abs() < 1e-4);
    }

    assert!(steps[0] > 0.0);
    for pair in steps.windows(2).take(50) {
        assert!(pair[1] < pair[0], "steps keep shrinking: {pair:?}");
    }
    assert!(steps[199] < steps[0] * 1e-3);
}

#[test]
fn undamped_rotation_applies_at_once() {
    let mut camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0), 0.05);
    controls.enable_damping = false;

    controls.rotate_left(std::f32::consts::FRAC_PI_2);
    assert!(controls.update(&mut camera, &projection));
    assert!(camera.position.distance(Point3::new(-2.0, 0.0, 0.0)) < 1e-4);

    assert!(!controls.update(&mut camera, &projection));
}

#[test]
fn dolly_scales_the_distance() {
    let (mut camera, projection, mut controls) = setup(false);
    let origin = Point3::new(0.0, 0.0, 0.0);
    let radius = camera.position.distance(origin);

    controls.dolly(0.5);
    controls.update(&mut camera, &projection);
    assert!((camera.position.distance(origin) - radius * 0.5).abs() < 1e-4);

    controls.min_distance = 0.75;
    controls.dolly(0.1);
    controls.update(&mut camera, &projection);
    assert!((camera.position.distance(origin) - 0.75).abs() < 1e-4);
}

#[test]
fn pan_moves_camera_and_target_together() {
    let (mut camera, projection, mut controls) = setup(false);
    let offset = camera.position - camera.target;

    controls.pan(100.0, 0.0);
    controls.update(&mut camera, &projection);

    assert!(controls.target.distance(Point3::new(0.0, 0.0, 0.0)) > 1e-3);
    assert_eq!(camera.target, controls.target);
    assert!(((camera.position - camera.target) - offset).magnitude() < 1e-4);
}

#[test]
fn the_camera_looks_at_its_target() {
    let camera = Camera::new((1.0, 1.0, 2.0), (0.0, 0.0, 0.0));
    let forward = camera.forward();
    assert!((forward - (Point3::new(0.0, 0.0, 0.0) - camera.position).normalize()).magnitude() < 1e-6);
    assert!(forward.dot(camera.right()).abs() < 1e-6);
    assert!(forward.dot(camera.screen_up()).abs() < 1e-6);
}

fn press(button: MouseButton, state: ElementState) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: DeviceId::dummy(),
        state,
        button,
    }
}

fn cursor_at(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: DeviceId::dummy(),
        position: PhysicalPosition::new(x, y),
    }
}

#[test]
fn drag_distance_is_measured_in_logical_pixels() {
    let mut camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
    let projection = Projection::new(1600, 1200, Deg(75.0), 0.1, 100.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0), 0.05);
    controls.enable_damping = false;
    controls.set_viewport_height(600.0);
    controls.set_scale_factor(2.0);

    // a quarter of the logical height is 300 physical pixels at scale 2
    assert!(!controls.handle_window_events(&cursor_at(400.0, 400.0)));
    assert!(controls.handle_window_events(&press(MouseButton::Left, ElementState::Pressed)));
    assert!(controls.handle_window_events(&cursor_at(700.0, 400.0)));
    assert!(controls.handle_window_events(&press(MouseButton::Left, ElementState::Released)));

    controls.update(&mut camera, &projection);
    assert!(
        camera.position.distance(Point3::new(-2.0, 0.0, 0.0)) < 1e-4,
        "camera at {:?}",
        camera.position
    );
}

#[test]
fn drag_turn_is_the_same_at_every_scale_factor() {
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
    let positions: Vec<_> = [1.0, 2.0, 3.0]
        .into_iter()
        .map(|scale: f64| {
            let mut camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
            let mut controls = OrbitControls::new((0.0, 0.0, 0.0), 0.05);
            controls.enable_damping = false;
            controls.set_viewport_height(600.0);
            controls.set_scale_factor(scale);
            controls.handle_window_events(&cursor_at(100.0 * scale, 100.0 * scale));
            controls.handle_window_events(&press(MouseButton::Left, ElementState::Pressed));
            controls.handle_window_events(&cursor_at(150.0 * scale, 120.0 * scale));
            controls.update(&mut camera, &projection);
            camera.position
        })
        .collect();
    assert!(positions[0].distance(Point3::new(0.0, 0.0, 2.0)) > 1e-2);
    for position in &positions[1..] {
        assert!(position.distance(positions[0]) < 1e-4, "{position:?} vs {:?}", positions[0]);
    }
}

#[test]
fn moving_without_a_button_does_not_rotate() {
    let (mut camera, projection, mut controls) = setup(false);
    let start = camera.position;
    controls.handle_window_events(&cursor_at(10.0, 10.0));
    assert!(!controls.handle_window_events(&cursor_at(300.0, 200.0)));
    assert!(!controls.update(&mut camera, &projection));
    assert!(camera.position.distance(start) < 1e-6);
}
