// cutter.rs - Cuts zoomed composites into fixed-size output tiles

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{imageops, DynamicImage, GenericImageView};

use mapstitch_shared::util::{build_path, ensure_parent_dir, tile_file_name};
use mapstitch_shared::OUTPUT_TILE_PIXELS;

use crate::bounds::MapBounds;
use crate::region::TileRange;
use crate::zoom::ZoomLevel;

/// Slack added before truncating zoomed tile indices
const GRID_EPSILON: f64 = 0.01;

/// Extra reach past the high edge so partial tiles are not lost
const HIGH_EDGE_REACH: f64 = 1.9;

/// Output tile indices covering a map at `zoom`, padding included
pub fn output_grid(bounds: &MapBounds, zoom: ZoomLevel) -> TileRange {
    let s = zoom.scale();
    let index = |v: f64| (v * s + GRID_EPSILON) as i32;
    let t = &bounds.tiles;
    TileRange::new(
        index((t.low_x - 1) as f64),
        index(t.high_x as f64 + HIGH_EDGE_REACH),
        index((t.low_y - 1) as f64),
        index(t.high_y as f64 + HIGH_EDGE_REACH),
    )
}

/// Pixel offset of output index `i` from the padded low edge
fn window_offset(i: i32, low: i32, s: f64) -> i64 {
    ((i as f64 - (low - 1) as f64 * s) * OUTPUT_TILE_PIXELS as f64) as i64
}

/// Square window at `(left, top)`; whatever falls outside the image is black
pub fn crop_padded(image: &DynamicImage, left: i64, top: i64) -> DynamicImage {
    let size = OUTPUT_TILE_PIXELS;
    if left >= 0
        && top >= 0
        && left + size as i64 <= image.width() as i64
        && top + size as i64 <= image.height() as i64
    {
        return image.crop_imm(left as u32, top as u32, size, size);
    }
    let mut tile = DynamicImage::new(size, size, image.color());
    imageops::replace(&mut tile, image, -left, -top);
    tile
}

/// True when every color channel is zero, alpha ignored
pub fn is_blank(tile: &DynamicImage) -> bool {
    tile.pixels().all(|(_, _, p)| p[0] == 0 && p[1] == 0 && p[2] == 0)
}

pub struct OutputTile {
    pub x: i32,
    pub y: i32,
    pub image: DynamicImage,
}

/// Every non-blank output tile of a zoomed composite
pub fn cut_tiles(image: &DynamicImage, bounds: &MapBounds, zoom: ZoomLevel) -> Vec<OutputTile> {
    let s = zoom.scale();
    let grid = output_grid(bounds, zoom);
    let height = image.height() as i64;
    let mut tiles = Vec::new();

    for (x, y) in grid.tiles() {
        let left = window_offset(x, bounds.tiles.low_x, s);
        let bottom = window_offset(y, bounds.tiles.low_y, s);
        let top = height - bottom - OUTPUT_TILE_PIXELS as i64;
        let tile = crop_padded(image, left, top);
        if is_blank(&tile) {
            continue;
        }
        tiles.push(OutputTile { x, y, image: tile });
    }
    tiles
}

/// Writes output tiles under `{root}/{mapId}/{zoom}/`
pub struct TileWriter {
    root: PathBuf,
}

impl TileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_path(&self, map_id: i32, zoom: ZoomLevel, plane: i32, x: i32, y: i32) -> PathBuf {
        build_path(
            &self.root,
            &[
                map_id.to_string().as_str(),
                zoom.level().to_string().as_str(),
                tile_file_name(plane, x, y).as_str(),
            ],
        )
    }

    pub fn write(
        &self,
        map_id: i32,
        zoom: ZoomLevel,
        plane: i32,
        tile: &OutputTile,
    ) -> anyhow::Result<PathBuf> {
        let path = self.tile_path(map_id, zoom, plane, tile.x, tile.y);
        ensure_parent_dir(&path)?;
        tile.image
            .save(&path)
            .with_context(|| format!("Unable to write tile {}", path.display()))?;
        Ok(path)
    }
}
