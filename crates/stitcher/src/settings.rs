// settings.rs - Render settings folded from the configuration file

use anyhow::bail;

use mapstitch_shared::config::Config;
use mapstitch_shared::{MAX_ZOOM, MIN_ZOOM};

use crate::blend::ColorKey;

/// Gaussian sigma applied to the ground-floor backdrop
pub const DEFAULT_BACKDROP_BLUR: f32 = 5.0;

/// Where surface maps open, in game units
pub const DEFAULT_SURFACE_CENTER: [i32; 2] = [2496, 3328];

/// Immutable settings shared by every map of a run
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub color_key: ColorKey,
    pub backdrop_blur: f32,
    pub min_zoom: i32,
    pub max_zoom: i32,
    pub surface_center: [i32; 2],
    pub include_debug_map: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            color_key: ColorKey::MAGENTA,
            backdrop_blur: DEFAULT_BACKDROP_BLUR,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            surface_center: DEFAULT_SURFACE_CENTER,
            include_debug_map: false,
        }
    }
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let color_key = if config.is_set("render", "ColorKey") {
            let text = config.get_string_default("render", "ColorKey", "");
            match ColorKey::parse_hex(&text) {
                Some(key) => key,
                None => bail!("[render] ColorKey must be RRGGBB hex, got {:?}", text),
            }
        } else {
            defaults.color_key
        };

        let backdrop_blur = config.get_float_default("render", "BackdropBlur", defaults.backdrop_blur)?;
        if backdrop_blur < 0.0 {
            bail!("[render] BackdropBlur must not be negative, got {}", backdrop_blur);
        }

        let min_zoom = config.get_int_default("render", "MinZoom", defaults.min_zoom)?;
        let max_zoom = config.get_int_default("render", "MaxZoom", defaults.max_zoom)?;
        for (key, value) in [("MinZoom", min_zoom), ("MaxZoom", max_zoom)] {
            if !(MIN_ZOOM..=MAX_ZOOM).contains(&value) {
                bail!("[render] {} must lie in {}..={}, got {}", key, MIN_ZOOM, MAX_ZOOM, value);
            }
        }
        if min_zoom > max_zoom {
            bail!("[render] MinZoom {} is above MaxZoom {}", min_zoom, max_zoom);
        }

        let surface_center = [
            config.get_int_default("basemap", "SurfaceCenterX", defaults.surface_center[0])?,
            config.get_int_default("basemap", "SurfaceCenterY", defaults.surface_center[1])?,
        ];

        Ok(Self {
            color_key,
            backdrop_blur,
            min_zoom,
            max_zoom,
            surface_center,
            include_debug_map: config.get_bool_default("maps", "IncludeDebug", false),
        })
    }
}
