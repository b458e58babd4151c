// icons.rs - Map icon selection and sprite stamping

use std::path::Path;

use anyhow::Context;
use image::{imageops, DynamicImage};
use serde::Deserialize;

use mapstitch_shared::{PADDING_PIXELS, PIXELS_PER_UNIT, TILE_UNITS};

use crate::bounds::MapBounds;
use crate::definitions::Position;
use crate::error::StitchError;
use crate::region::{Placement, Region};
use crate::source::SpriteSet;
use crate::zoom::ZoomLevel;

/// Sprites sit this many pixels up and left of their centered anchor
const SPRITE_NUDGE: i64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub position: Position,
    pub sprite_id: u32,
}

/// Icon moved to its map position, in game units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedIcon {
    pub x: i32,
    pub y: i32,
    pub sprite_id: u32,
}

pub fn load_icons(path: &Path) -> anyhow::Result<Vec<Icon>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read icons {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid icons in {}", path.display()))
}

/// Icons inside a region's source box, shifted like its tiles.
///
/// The ground floor takes icons from every floor; any other canvas plane
/// only takes icons on the floor it reads.
pub fn icons_in_region(icons: &[Icon], placement: &Placement, plane: i32) -> Vec<PlacedIcon> {
    let source_plane = placement.plane + plane;
    let area = placement.source_box();
    let (dx, dy) = placement.shift;

    icons
        .iter()
        .filter(|icon| plane == 0 || icon.position.z == source_plane)
        .filter(|icon| area.contains(icon.position.x, icon.position.y))
        .map(|icon| PlacedIcon {
            x: icon.position.x + dx,
            y: icon.position.y + dy,
            sprite_id: icon.sprite_id,
        })
        .collect()
}

/// Icons of every region for one canvas plane, in region order
pub fn collect_icons(icons: &[Icon], regions: &[Region], plane: i32) -> Vec<PlacedIcon> {
    regions
        .iter()
        .flat_map(|region| icons_in_region(icons, &region.placement(), plane))
        .collect()
}

/// Draw icons onto a zoomed composite. Sprites keep their own size at every
/// level; levels below zero get no icons.
pub fn stamp_icons(
    image: &mut DynamicImage,
    icons: &[PlacedIcon],
    sprites: &SpriteSet,
    bounds: &MapBounds,
    zoom: ZoomLevel,
) -> Result<(), StitchError> {
    if !zoom.shows_icons() {
        return Ok(());
    }

    let scale = zoom.scale() * PIXELS_PER_UNIT as f64;
    let pad = (PADDING_PIXELS as f64 * zoom.scale()).round() as i64;
    let origin_x = bounds.tiles.low_x * TILE_UNITS;
    let origin_y = (bounds.tiles.high_y + 1) * TILE_UNITS;

    for icon in icons {
        let sprite = sprites.get(icon.sprite_id)?;
        let (width, height) = sprite.dimensions();
        let x = ((icon.x - origin_x) as f64 * scale).round() as i64 - (width / 2) as i64;
        let y = ((origin_y - icon.y) as f64 * scale).round() as i64 - (height / 2) as i64;
        imageops::overlay(image, sprite, x - SPRITE_NUDGE + pad, y - SPRITE_NUDGE + pad);
    }
    Ok(())
}
