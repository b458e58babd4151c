// pipeline.rs - Per-map rendering: composite, blend, zoom, stamp, cut
//
// Maps are processed one after another, each plane from the ground up so the
// ground backdrop exists before any upper floor is blended. Everything read
// across maps lives in `RenderContext` and is never mutated.

use mapstitch_shared::{basic_log, detail_log};

use crate::basemap::BaseMap;
use crate::blend::PlaneBlender;
use crate::bounds::MapBounds;
use crate::compose::{composite_plane, CompositeStats};
use crate::cutter::{cut_tiles, TileWriter};
use crate::definitions::MapDefinition;
use crate::error::StitchError;
use crate::icons::{collect_icons, stamp_icons, Icon};
use crate::settings::RenderSettings;
use crate::source::{SpriteSet, TileSource};
use crate::zoom::{rescale, zoom_levels};

pub struct RenderContext<'a> {
    pub icons: &'a [Icon],
    pub sprites: &'a SpriteSet,
    pub tiles: &'a dyn TileSource,
    pub settings: &'a RenderSettings,
    pub writer: &'a TileWriter,
}

/// Totals for one rendered map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapReport {
    pub planes: i32,
    pub tiles_written: u32,
    pub icons_placed: usize,
    pub composite: CompositeStats,
}

impl MapReport {
    fn add_composite(&mut self, stats: &CompositeStats) {
        self.composite.pasted += stats.pasted;
        self.composite.absent_assets += stats.absent_assets;
        self.composite.no_plane_data += stats.no_plane_data;
    }
}

/// Bounds of a definition, warning about direct remaps whose extents differ
pub fn map_bounds(definition: &MapDefinition) -> Result<MapBounds, StitchError> {
    for region in &definition.region_list {
        if let Some(mismatch) = region.remap_mismatch() {
            tracing::warn!(
                "Map {} ({}): direct remap {:?} -> {:?} changes size, extra columns are dropped",
                definition.id(),
                definition.name,
                mismatch.old,
                mismatch.new
            );
        }
    }
    MapBounds::from_regions(&definition.region_list)
        .ok_or(StitchError::EmptyRegionList(definition.id()))
}

/// Keep only the listed map ids; an empty filter keeps everything
pub fn select_maps(definitions: Vec<MapDefinition>, only: &[i32]) -> Vec<MapDefinition> {
    if only.is_empty() {
        return definitions;
    }
    definitions
        .into_iter()
        .filter(|d| only.contains(&d.id()))
        .collect()
}

pub fn render_map(ctx: &RenderContext, definition: &MapDefinition) -> anyhow::Result<(BaseMap, MapReport)> {
    let map_id = definition.id();
    let bounds = map_bounds(definition)?;
    let (width, height) = bounds.canvas_size();
    basic_log!(
        "Rendering map {} ({}): tiles {:?}, {} plane(s), canvas {}x{}",
        map_id,
        definition.name,
        bounds.tiles,
        bounds.planes,
        width,
        height
    );

    let settings = ctx.settings;
    let mut blender = PlaneBlender::new(settings.color_key, settings.backdrop_blur);
    let mut report = MapReport {
        planes: bounds.planes,
        ..MapReport::default()
    };

    for plane in 0..bounds.planes {
        let (canvas, stats) = composite_plane(&definition.region_list, &bounds, plane, ctx.tiles)?;
        detail_log!(
            "Map {} plane {}: {} tiles pasted, {} absent, {} without plane data",
            map_id,
            plane,
            stats.pasted,
            stats.absent_assets,
            stats.no_plane_data
        );
        report.add_composite(&stats);

        let blended = blender.blend(plane, bounds.planes, canvas);
        let icons = collect_icons(ctx.icons, &definition.region_list, plane);
        report.icons_placed += icons.len();

        for zoom in zoom_levels(settings.min_zoom, settings.max_zoom) {
            let mut zoomed = rescale(&blended, zoom);
            stamp_icons(&mut zoomed, &icons, ctx.sprites, &bounds, zoom)?;

            let tiles = cut_tiles(&zoomed, &bounds, zoom);
            for tile in &tiles {
                ctx.writer.write(map_id, zoom, plane, tile)?;
            }
            detail_log!("Map {} plane {} zoom {}: {} tiles", map_id, plane, zoom.level(), tiles.len());
            report.tiles_written += tiles.len() as u32;
        }
    }

    if report.composite.absent_assets > 0 {
        tracing::warn!(
            "Map {} ({}): {} base tiles missing",
            map_id,
            definition.name,
            report.composite.absent_assets
        );
    }
    basic_log!(
        "Map {} done: {} plane(s), {} tiles written, {} icons placed",
        map_id,
        report.planes,
        report.tiles_written,
        report.icons_placed
    );

    let base_map = BaseMap::new(definition, &bounds, settings.surface_center);
    Ok((base_map, report))
}

/// Render every map in order and return the index entries
pub fn render_all(ctx: &RenderContext, definitions: &[MapDefinition]) -> anyhow::Result<Vec<BaseMap>> {
    let mut index = Vec::with_capacity(definitions.len());
    let mut total_tiles = 0;
    for definition in definitions {
        let (base_map, report) = render_map(ctx, definition)?;
        total_tiles += report.tiles_written;
        index.push(base_map);
    }
    basic_log!("Rendered {} map(s), {} tiles", index.len(), total_tiles);
    Ok(index)
}

/// Index entries without rendering anything
pub fn index_all(definitions: &[MapDefinition], settings: &RenderSettings) -> anyhow::Result<Vec<BaseMap>> {
    definitions
        .iter()
        .map(|definition| -> anyhow::Result<BaseMap> {
            let bounds = map_bounds(definition)?;
            Ok(BaseMap::new(definition, &bounds, settings.surface_center))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Position;
    use crate::region::tests::plain;
    use crate::source::tests::{solid_tile, MemoryTileSource};
    use image::{Rgb, Rgba, RgbaImage};
    use std::path::Path;

    fn definition(map_id: i32, regions: Vec<crate::region::Region>) -> MapDefinition {
        MapDefinition {
            map_id: Some(map_id),
            file_id: None,
            name: format!("map {map_id}"),
            region_list: regions,
            position: None,
        }
    }

    fn files_under(root: &Path) -> Vec<std::path::PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        files.sort();
        files
    }

    #[test]
    fn test_single_red_tile_scenario() {
        let out = tempfile::tempdir().unwrap();
        let source = MemoryTileSource::default().with_tile(0, 50, 50, solid_tile([255, 0, 0]));
        let settings = RenderSettings::default();
        let writer = TileWriter::new(out.path());
        let ctx = RenderContext {
            icons: &[],
            sprites: &SpriteSet::new(),
            tiles: &source,
            settings: &settings,
            writer: &writer,
        };
        let def = definition(5, vec![plain(50, 50, 50, 50, 1)]);

        let (base_map, report) = render_map(&ctx, &def).unwrap();
        assert_eq!(base_map.bounds, [[3136, 3136], [3328, 3328]]);
        assert_eq!(base_map.center, [3232, 3232]);
        assert_eq!(report.planes, 1);

        let native: Vec<_> = files_under(&out.path().join("5").join("2"));
        assert_eq!(native, vec![out.path().join("5").join("2").join("0_50_50.png")]);
        let tile = image::open(&native[0]).unwrap().to_rgb8();
        assert!(tile.pixels().all(|p| p == &Rgb([255, 0, 0])));
    }

    #[test]
    fn test_missing_sprite_aborts_map() {
        let out = tempfile::tempdir().unwrap();
        let source = MemoryTileSource::default().with_tile(0, 50, 50, solid_tile([0, 90, 0]));
        let settings = RenderSettings::default();
        let writer = TileWriter::new(out.path());
        let icons = [Icon {
            position: Position { x: 3232, y: 3232, z: 0 },
            sprite_id: 404,
        }];
        let ctx = RenderContext {
            icons: &icons,
            sprites: &SpriteSet::new(),
            tiles: &source,
            settings: &settings,
            writer: &writer,
        };

        let err = render_map(&ctx, &definition(5, vec![plain(50, 50, 50, 50, 1)])).unwrap_err();
        assert!(matches!(err.downcast_ref::<StitchError>(), Some(StitchError::SpriteNotFound(404))));
    }

    #[test]
    fn test_empty_region_list_is_an_error() {
        let err = index_all(&[definition(9, Vec::new())], &RenderSettings::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<StitchError>(), Some(StitchError::EmptyRegionList(9))));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let out = tempfile::tempdir().unwrap();
        let source = MemoryTileSource::default()
            .with_tile(0, 50, 50, solid_tile([40, 80, 120]))
            .with_tile(1, 50, 50, solid_tile([255, 0, 255]))
            .with_tile(0, 51, 50, solid_tile([200, 10, 10]));
        let mut sprites = SpriteSet::new();
        sprites.insert(3, RgbaImage::from_pixel(9, 9, Rgba([255, 255, 0, 255])));
        let icons = [Icon {
            position: Position { x: 3240, y: 3230, z: 1 },
            sprite_id: 3,
        }];
        let settings = RenderSettings::default();
        let writer = TileWriter::new(out.path().join("rendered"));
        let ctx = RenderContext {
            icons: &icons,
            sprites: &sprites,
            tiles: &source,
            settings: &settings,
            writer: &writer,
        };
        let defs = vec![definition(3, vec![plain(50, 51, 50, 50, 2)])];
        let index_path = out.path().join("basemaps.json");

        let snapshot = || {
            let index = render_all(&ctx, &defs).unwrap();
            crate::basemap::write_index(&index_path, &index).unwrap();
            files_under(out.path())
                .into_iter()
                .map(|path| {
                    let bytes = std::fs::read(&path).unwrap();
                    (path, bytes)
                })
                .collect::<Vec<_>>()
        };

        let first = snapshot();
        let second = snapshot();
        assert!(first.len() > 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_maps() {
        let defs = vec![
            definition(1, vec![plain(1, 1, 1, 1, 1)]),
            definition(2, vec![plain(1, 1, 1, 1, 1)]),
        ];
        assert_eq!(select_maps(defs.clone(), &[]).len(), 2);
        let only = select_maps(defs, &[2, 8]);
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id(), 2);
    }
}
