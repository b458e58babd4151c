// blend.rs - Floor blending with a reserved "no data" color

use image::{imageops, DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

/// Reserved pixel value marking "no data"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorKey(pub Rgb<u8>);

impl ColorKey {
    pub const MAGENTA: ColorKey = ColorKey(Rgb([255, 0, 255]));

    /// Parse `RRGGBB`, with or without a leading `#`
    pub fn parse_hex(text: &str) -> Option<ColorKey> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(ColorKey(Rgb([channel(0)?, channel(2)?, channel(4)?])))
    }

    pub fn matches(&self, pixel: &Rgb<u8>) -> bool {
        pixel == &self.0
    }
}

impl Default for ColorKey {
    fn default() -> Self {
        Self::MAGENTA
    }
}

/// Ground floor: keyed pixels become black background
pub fn key_out_ground(canvas: &mut RgbImage, key: ColorKey) {
    for pixel in canvas.pixels_mut() {
        if key.matches(pixel) {
            *pixel = Rgb([0, 0, 0]);
        }
    }
}

/// Desaturated, blurred, opaque copy of the ground floor
pub fn ground_backdrop(ground: &RgbImage, blur_sigma: f32) -> RgbaImage {
    let gray = imageops::grayscale(ground);
    let gray = if blur_sigma > 0.0 {
        imageops::blur(&gray, blur_sigma)
    } else {
        gray
    };
    DynamicImage::ImageLuma8(gray).to_rgba8()
}

/// Upper floor: keyed pixels turn transparent, the rest opaque, and the
/// result is laid over the backdrop
pub fn blend_upper(canvas: &RgbImage, backdrop: &RgbaImage, key: ColorKey) -> RgbaImage {
    let layer = RgbaImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let pixel = canvas.get_pixel(x, y);
        let alpha = if key.matches(pixel) { 0 } else { 255 };
        Rgba([pixel[0], pixel[1], pixel[2], alpha])
    });

    let mut out = backdrop.clone();
    imageops::overlay(&mut out, &layer, 0, 0);
    out
}

/// Carries the ground-floor backdrop from plane 0 to the planes above it
pub struct PlaneBlender {
    key: ColorKey,
    blur_sigma: f32,
    backdrop: Option<RgbaImage>,
}

impl PlaneBlender {
    pub fn new(key: ColorKey, blur_sigma: f32) -> Self {
        Self {
            key,
            blur_sigma,
            backdrop: None,
        }
    }

    /// Finish the canvas of `plane` out of `planes`. Plane 0 must come first.
    pub fn blend(&mut self, plane: i32, planes: i32, mut canvas: RgbImage) -> DynamicImage {
        if plane == 0 {
            key_out_ground(&mut canvas, self.key);
            self.backdrop = if planes > 1 {
                Some(ground_backdrop(&canvas, self.blur_sigma))
            } else {
                None
            };
            return DynamicImage::ImageRgb8(canvas);
        }

        let (width, height) = canvas.dimensions();
        let backdrop = self.backdrop.get_or_insert_with(|| {
            tracing::warn!("Plane {} blended without a ground backdrop", plane);
            RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
        });
        DynamicImage::ImageRgba8(blend_upper(&canvas, backdrop, self.key))
    }
}
