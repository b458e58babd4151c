// mapstitch - Shared Library
// World geometry and the plumbing (logging, config, filesystem) used by the stitcher

pub mod config;
pub mod log;
pub mod util;

#[doc(hidden)]
pub use tracing;

/// Game units along one edge of a map tile
pub const TILE_UNITS: i32 = 64;

/// Game units along one edge of a chunk
pub const CHUNK_UNITS: i32 = 8;

/// Chunks per tile along each axis
pub const CHUNKS_PER_TILE: i32 = TILE_UNITS / CHUNK_UNITS;

/// Pixels per game unit at native zoom
pub const PIXELS_PER_UNIT: i32 = 4;

/// Pixels along one edge of a source tile at native zoom
pub const TILE_PIXELS: i32 = TILE_UNITS * PIXELS_PER_UNIT;

/// Pixels along one edge of a chunk at native zoom
pub const CHUNK_PIXELS: i32 = CHUNK_UNITS * PIXELS_PER_UNIT;

/// Edge length of every rendered output tile
pub const OUTPUT_TILE_PIXELS: u32 = 256;

/// Border around every map, in game units (one tile)
pub const PADDING_UNITS: i32 = TILE_UNITS;

/// Border around every canvas, in native pixels
pub const PADDING_PIXELS: i32 = PADDING_UNITS * PIXELS_PER_UNIT;

/// Zoom level at which one game unit covers `PIXELS_PER_UNIT` pixels
pub const NATIVE_ZOOM: i32 = 2;

/// Lowest zoom level of the pyramid
pub const MIN_ZOOM: i32 = -3;

/// Highest zoom level of the pyramid
pub const MAX_ZOOM: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_geometry() {
        assert_eq!(TILE_PIXELS, 256);
        assert_eq!(CHUNK_PIXELS, 32);
        assert_eq!(CHUNKS_PER_TILE, 8);
        assert_eq!(PADDING_PIXELS as u32, OUTPUT_TILE_PIXELS);
    }
}
