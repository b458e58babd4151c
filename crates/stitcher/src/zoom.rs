// zoom.rs - Zoom pyramid scaling

use image::imageops::FilterType;
use image::DynamicImage;

use mapstitch_shared::{MAX_ZOOM, MIN_ZOOM, NATIVE_ZOOM};

/// Power-of-two zoom exponent; `NATIVE_ZOOM` keeps source resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomLevel(i32);

impl ZoomLevel {
    pub const NATIVE: ZoomLevel = ZoomLevel(NATIVE_ZOOM);

    pub fn new(level: i32) -> Self {
        Self(level)
    }

    pub fn level(&self) -> i32 {
        self.0
    }

    /// Size factor relative to the native composite
    pub fn scale(&self) -> f64 {
        2f64.powi(self.0 - NATIVE_ZOOM)
    }

    /// Smooth when shrinking or mildly enlarging, blocky beyond that
    pub fn filter(&self) -> FilterType {
        if self.0 <= 1 {
            FilterType::Triangle
        } else {
            FilterType::Nearest
        }
    }

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    /// Icons are only drawn at or above this level
    pub fn shows_icons(&self) -> bool {
        self.0 >= 0
    }
}

/// Levels `min..=max`, clamped to the supported pyramid
pub fn zoom_levels(min: i32, max: i32) -> impl Iterator<Item = ZoomLevel> {
    (min.max(MIN_ZOOM)..=max.min(MAX_ZOOM)).map(ZoomLevel::new)
}

/// Scaled dimension, never below one pixel
fn scaled(length: u32, scale: f64) -> u32 {
    ((length as f64 * scale).round() as u32).max(1)
}

pub fn rescale(image: &DynamicImage, zoom: ZoomLevel) -> DynamicImage {
    if zoom.is_native() {
        return image.clone();
    }
    let scale = zoom.scale();
    image.resize_exact(
        scaled(image.width(), scale),
        scaled(image.height(), scale),
        zoom.filter(),
    )
}
