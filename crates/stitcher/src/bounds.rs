// bounds.rs - Tile-space extent of a map and the geometry derived from it

use mapstitch_shared::{PADDING_PIXELS, PADDING_UNITS, PIXELS_PER_UNIT, TILE_PIXELS, TILE_UNITS};

use crate::region::{Region, TileRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapBounds {
    pub tiles: TileRange,
    pub planes: i32,
}

impl MapBounds {
    /// Union of every region's extent and the largest plane count.
    /// `None` for an empty region list.
    pub fn from_regions(regions: &[Region]) -> Option<MapBounds> {
        let mut iter = regions.iter();
        let first = iter.next()?;
        let mut bounds = MapBounds {
            tiles: first.extent(),
            planes: first.number_of_planes(),
        };
        for region in iter {
            bounds.tiles = bounds.tiles.union(&region.extent());
            bounds.planes = bounds.planes.max(region.number_of_planes());
        }
        Some(bounds)
    }

    /// Native-resolution canvas size including the padding border
    pub fn canvas_size(&self) -> (u32, u32) {
        let width = self.tiles.width() * TILE_PIXELS + 2 * PADDING_PIXELS;
        let height = self.tiles.height() * TILE_PIXELS + 2 * PADDING_PIXELS;
        (width as u32, height as u32)
    }

    /// Canvas pixel of the top-left corner of a game-unit position
    pub fn unit_to_canvas(&self, x: i32, y_top: i32) -> (i64, i64) {
        let px = (x - self.tiles.low_x * TILE_UNITS) * PIXELS_PER_UNIT + PADDING_PIXELS;
        let py = ((self.tiles.high_y + 1) * TILE_UNITS - y_top) * PIXELS_PER_UNIT + PADDING_PIXELS;
        (px as i64, py as i64)
    }

    /// Padded game-unit corners published in the basemap index
    pub fn unit_bounds(&self) -> [[i32; 2]; 2] {
        [
            [
                self.tiles.low_x * TILE_UNITS - PADDING_UNITS,
                self.tiles.low_y * TILE_UNITS - PADDING_UNITS,
            ],
            [
                (self.tiles.high_x + 1) * TILE_UNITS + PADDING_UNITS,
                (self.tiles.high_y + 1) * TILE_UNITS + PADDING_UNITS,
            ],
        ]
    }

    /// Game-unit midpoint of the unpadded extent
    pub fn midpoint(&self) -> [i32; 2] {
        let half = TILE_UNITS / 2;
        [
            (self.tiles.low_x + self.tiles.high_x + 1) * half,
            (self.tiles.low_y + self.tiles.high_y + 1) * half,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::tests::{chunk_remap_json, plain};
    use crate::region::MAX_TILE_COORD;

    #[test]
    fn test_empty_region_list() {
        assert_eq!(MapBounds::from_regions(&[]), None);
    }

    #[test]
    fn test_union_and_planes() {
        let regions = vec![
            plain(50, 50, 50, 50, 1),
            plain(48, 49, 52, 53, 3),
            Region::try_from(chunk_remap_json()).unwrap(),
        ];
        let bounds = MapBounds::from_regions(&regions).unwrap();
        assert_eq!(bounds.tiles, TileRange::new(48, 50, 50, 53));
        assert_eq!(bounds.planes, 3);
    }

    #[test]
    fn test_single_tile_geometry() {
        let bounds = MapBounds::from_regions(&[plain(50, 50, 50, 50, 1)]).unwrap();
        assert_eq!(bounds.canvas_size(), (768, 768));
        assert_eq!(bounds.unit_bounds(), [[3136, 3136], [3328, 3328]]);
        assert_eq!(bounds.midpoint(), [3232, 3232]);

        // top-left of the tile sits right inside the padding
        assert_eq!(bounds.unit_to_canvas(50 * 64, 51 * 64), (256, 256));
        // bottom-right corner of the tile
        assert_eq!(bounds.unit_to_canvas(51 * 64, 50 * 64), (512, 512));
    }

    #[test]
    fn test_extreme_coordinates_stay_in_range() {
        let regions = vec![plain(-MAX_TILE_COORD, MAX_TILE_COORD, -MAX_TILE_COORD, MAX_TILE_COORD, 1)];
        let bounds = MapBounds::from_regions(&regions).unwrap();
        let span = (2 * MAX_TILE_COORD + 1) as u32;
        assert_eq!(bounds.canvas_size(), (span * 256 + 512, span * 256 + 512));
        assert_eq!(
            bounds.unit_bounds(),
            [
                [-MAX_TILE_COORD * 64 - 64, -MAX_TILE_COORD * 64 - 64],
                [(MAX_TILE_COORD + 1) * 64 + 64, (MAX_TILE_COORD + 1) * 64 + 64],
            ]
        );
        assert_eq!(bounds.midpoint(), [32, 32]);
    }
}
