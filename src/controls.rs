//! Orbit camera controls.
//!
//! The camera circles a target point on a sphere. Left drag rotates around
//! the target, right drag pans the target, and the mouse wheel moves the
//! camera closer or further away. With damping enabled the motion eases out
//! over several frames: each [`OrbitControls::update`] applies a fraction of
//! the pending motion and keeps the rest for the next frame.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Point3, Vector2, Vector3, Zero};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::{Camera, Projection};

/// Keeps the camera from flipping over the poles.
const POLAR_EPSILON: f32 = 1e-6;
const MOVE_EPSILON: f32 = 1e-6;

/// Spherical coordinates around the target with +Y as the polar axis.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi = self.phi.sin();
        Vector3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    viewport_height: f32,
    scale_factor: f64,
    rotate_delta: Vector2<f32>,
    pan_offset: Vector3<f32>,
    pending_pan: Vector2<f32>,
    scale: f32,
    drag: Option<Drag>,
    cursor: Option<Vector2<f32>>,
}

impl OrbitControls {
    pub fn new<P: Into<Point3<f32>>>(target: P, damping_factor: f32) -> Self {
        Self {
            target: target.into(),
            enable_damping: true,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            viewport_height: 1.0,
            scale_factor: 1.0,
            rotate_delta: Vector2::zero(),
            pan_offset: Vector3::zero(),
            pending_pan: Vector2::zero(),
            scale: 1.0,
            drag: None,
            cursor: None,
        }
    }

    /// Height of the drawable area in logical pixels. A drag over the full
    /// height turns the camera once around the target.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(1.0);
    }

    /// Window scale factor used to turn cursor positions into logical pixels.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor.is_normal() && scale_factor > 0.0 && scale_factor != self.scale_factor {
            self.scale_factor = scale_factor;
            self.cursor = None;
        }
    }

    /// Turns the camera around the vertical axis by `angle` radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.rotate_delta.x -= angle;
    }

    /// Tilts the camera towards the top pole by `angle` radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.rotate_delta.y -= angle;
    }

    /// Queues a pan by a screen space distance in logical pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan += Vector2::new(dx, dy);
    }

    /// Moves the camera closer by `factor` (< 1 moves in).
    pub fn dolly(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Handles mouse input. Returns `true` if the event was used.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let drag = match button {
                    MouseButton::Left => Drag::Rotate,
                    MouseButton::Right => Drag::Pan,
                    _ => return false,
                };
                match state {
                    ElementState::Pressed => self.drag = Some(drag),
                    ElementState::Released if self.drag == Some(drag) => self.drag = None,
                    ElementState::Released => {}
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(self.scale_factor);
                let cursor = Vector2::new(logical.x, logical.y);
                let moved = self.cursor.map(|last| cursor - last);
                self.cursor = Some(cursor);
                match (self.drag, moved) {
                    (Some(drag), Some(delta)) => {
                        self.handle_drag(drag, delta);
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 100.0,
                };
                if steps != 0.0 {
                    self.dolly(self.zoom_scale().powf(steps));
                }
                true
            }
            _ => false,
        }
    }

    fn handle_drag(&mut self, drag: Drag, delta: Vector2<f32>) {
        match drag {
            Drag::Rotate => {
                self.rotate_left(TAU * delta.x / self.viewport_height * self.rotate_speed);
                self.rotate_up(TAU * delta.y / self.viewport_height * self.rotate_speed);
            }
            Drag::Pan => self.pan(delta.x, delta.y),
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Applies one step of the pending motion to `camera`.
    ///
    /// Returns `true` if the camera moved noticeably.
    pub fn update(&mut self, camera: &mut Camera, projection: &Projection) -> bool {
        let previous = camera.position;
        let offset = camera.position - self.target;

        if self.pending_pan != Vector2::zero() {
            let distance = offset.magnitude() * (projection.fovy().0 / 2.0).tan();
            let right = camera.right() * (-2.0 * self.pending_pan.x * distance / self.viewport_height);
            let up = camera.screen_up() * (2.0 * self.pending_pan.y * distance / self.viewport_height);
            self.pan_offset += right + up;
            self.pending_pan = Vector2::zero();
        }

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        let mut spherical = Spherical::from_offset(offset);
        spherical.theta += self.rotate_delta.x * step;
        spherical.phi = (spherical.phi + self.rotate_delta.y * step)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * step;
        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            self.rotate_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.rotate_delta = Vector2::zero();
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.position - previous).magnitude2() > MOVE_EPSILON * MOVE_EPSILON
    }
}
