//! Drawable size and pixel ratio handling.
//!
//! Sizes are tracked in logical pixels. The backing buffer the renderer draws
//! into is the logical size times the applied pixel ratio, which is the device
//! pixel ratio capped at [`MAX_PIXEL_RATIO`] to bound the fill rate on very
//! dense displays.

use winit::dpi::PhysicalSize;

use crate::camera::Projection;

pub const MAX_PIXEL_RATIO: f64 = 2.0;

pub fn clamp_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    device_pixel_ratio.min(MAX_PIXEL_RATIO)
}

/// Something that owns a drawable buffer of a given pixel size.
pub trait BackingSurface {
    fn resize_backing(&mut self, width: u32, height: u32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: clamp_pixel_ratio(device_pixel_ratio),
        }
    }

    /// Builds a viewport from the window's physical size and scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height.max(f64::MIN_POSITIVE)) as f32
    }

    /// Size of the backing buffer in physical pixels, at least 1x1.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            ((self.width * self.pixel_ratio).round() as u32).max(1),
            ((self.height * self.pixel_ratio).round() as u32).max(1),
        )
    }

    /// Applies a resize notification: updates the camera aspect and projection
    /// and resizes the backing surface. Zero sized notifications, as sent for
    /// minimised windows, are ignored and `false` is returned.
    pub fn resize<S: BackingSurface + ?Sized>(
        &mut self,
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
        projection: &mut Projection,
        surface: &mut S,
    ) -> bool {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring resize to {width}x{height}");
            return false;
        }
        *self = Self::new(width, height, device_pixel_ratio);

        projection.set_aspect(self.aspect());
        projection.update_projection_matrix();

        let (backing_width, backing_height) = self.backing_size();
        surface.resize_backing(backing_width, backing_height);
        log::debug!(
            "viewport {width}x{height} at pixel ratio {}, backing {backing_width}x{backing_height}",
            self.pixel_ratio
        );
        true
    }

    /// Like [`resize`](Self::resize), from a physical window size.
    pub fn resize_physical<S: BackingSurface + ?Sized>(
        &mut self,
        size: PhysicalSize<u32>,
        scale_factor: f64,
        projection: &mut Projection,
        surface: &mut S,
    ) -> bool {
        let logical = size.to_logical::<f64>(scale_factor);
        self.resize(logical.width, logical.height, scale_factor, projection, surface)
    }
}
