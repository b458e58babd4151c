// compose.rs - Pastes region imagery into a per-(map, plane) canvas

use image::{imageops, RgbImage};

use mapstitch_shared::{CHUNK_PIXELS, CHUNK_UNITS, CHUNKS_PER_TILE, TILE_UNITS};

use crate::bounds::MapBounds;
use crate::region::{ChunkRect, Placement, Region};
use crate::source::TileSource;

/// Tile counters for one (map, plane) canvas.
///
/// A tile missing on a region's own floor is an absent asset; missing on a
/// floor above it just means that floor has nothing there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositeStats {
    pub pasted: u32,
    pub absent_assets: u32,
    pub no_plane_data: u32,
}

/// Pixel window `(x, y, width, height)` of a chunk rectangle inside a source tile
fn crop_window(crop: &ChunkRect) -> (u32, u32, u32, u32) {
    let x = crop.low_x * CHUNK_PIXELS;
    let y = (CHUNKS_PER_TILE - 1 - crop.high_y) * CHUNK_PIXELS;
    let width = crop.width() * CHUNK_PIXELS;
    let height = crop.height() * CHUNK_PIXELS;
    (x as u32, y as u32, width as u32, height as u32)
}

/// Canvas pixel of the top-left corner where source tile `(tx, ty)` lands
pub(crate) fn destination(bounds: &MapBounds, placement: &Placement, tx: i32, ty: i32) -> (i64, i64) {
    let left = tx * TILE_UNITS + placement.crop.low_x * CHUNK_UNITS + placement.shift.0;
    let top = ty * TILE_UNITS + (placement.crop.high_y + 1) * CHUNK_UNITS + placement.shift.1;
    bounds.unit_to_canvas(left, top)
}

/// Draw one region's tiles for canvas plane `plane`
pub fn paste_region(
    canvas: &mut RgbImage,
    bounds: &MapBounds,
    placement: &Placement,
    plane: i32,
    tiles: &dyn TileSource,
    stats: &mut CompositeStats,
) -> anyhow::Result<()> {
    let source_plane = placement.plane + plane;

    for (tx, ty) in placement.tiles.tiles() {
        let Some(tile) = tiles.load_tile(source_plane, tx, ty)? else {
            if plane == 0 {
                stats.absent_assets += 1;
                tracing::warn!("Missing base tile {}_{}_{}", source_plane, tx, ty);
            } else {
                stats.no_plane_data += 1;
                tracing::trace!("No data on plane {} at {},{}", source_plane, tx, ty);
            }
            continue;
        };

        let (x, y) = destination(bounds, placement, tx, ty);
        if placement.crop.is_full() {
            imageops::replace(canvas, &tile, x, y);
        } else {
            let (cx, cy, cw, ch) = crop_window(&placement.crop);
            let cropped = imageops::crop_imm(&tile, cx, cy, cw, ch).to_image();
            imageops::replace(canvas, &cropped, x, y);
        }
        stats.pasted += 1;
    }
    Ok(())
}

/// Fresh canvas for one plane with every region pasted in list order
pub fn composite_plane(
    regions: &[Region],
    bounds: &MapBounds,
    plane: i32,
    tiles: &dyn TileSource,
) -> anyhow::Result<(RgbImage, CompositeStats)> {
    let (width, height) = bounds.canvas_size();
    let mut canvas = RgbImage::new(width, height);
    let mut stats = CompositeStats::default();

    for region in regions {
        paste_region(&mut canvas, bounds, &region.placement(), plane, tiles, &mut stats)?;
    }
    Ok((canvas, stats))
}
