// region.rs - Region encodings of a map definition
//
// A region arrives as a loose JSON object; which keys it carries decides how
// its source tiles are laid out on the map. Decoding turns that key probing
// into a closed enum, and `Region::placement` reduces every variant to one
// normalized `Placement` the compositor and the icon filter both consume.

use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;
use serde_json::Value;

use mapstitch_shared::{CHUNKS_PER_TILE, CHUNK_UNITS, TILE_UNITS};

use crate::error::StitchError;

/// Largest tile coordinate magnitude a region may name; keeps unit and pixel
/// arithmetic inside `i32`
pub const MAX_TILE_COORD: i32 = 1 << 20;

/// Inclusive range of tile coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
    pub low_x: i32,
    pub high_x: i32,
    pub low_y: i32,
    pub high_y: i32,
}

impl TileRange {
    pub fn new(low_x: i32, high_x: i32, low_y: i32, high_y: i32) -> Self {
        Self { low_x, high_x, low_y, high_y }
    }

    pub fn single(x: i32, y: i32) -> Self {
        Self::new(x, x, y, y)
    }

    pub fn width(&self) -> i32 {
        self.high_x - self.low_x + 1
    }

    pub fn height(&self) -> i32 {
        self.high_y - self.low_y + 1
    }

    pub fn union(&self, other: &TileRange) -> TileRange {
        TileRange {
            low_x: self.low_x.min(other.low_x),
            high_x: self.high_x.max(other.high_x),
            low_y: self.low_y.min(other.low_y),
            high_y: self.high_y.max(other.high_y),
        }
    }

    /// Every tile in the range, column by column
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.low_x..=self.high_x).flat_map(move |x| (self.low_y..=self.high_y).map(move |y| (x, y)))
    }
}

/// Inclusive range of chunk coordinates inside one tile (0..=7 per axis)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRect {
    pub low_x: i32,
    pub high_x: i32,
    pub low_y: i32,
    pub high_y: i32,
}

impl ChunkRect {
    pub const FULL: ChunkRect = ChunkRect {
        low_x: 0,
        high_x: CHUNKS_PER_TILE - 1,
        low_y: 0,
        high_y: CHUNKS_PER_TILE - 1,
    };

    pub fn new(low_x: i32, high_x: i32, low_y: i32, high_y: i32) -> Self {
        Self { low_x, high_x, low_y, high_y }
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    pub fn width(&self) -> i32 {
        self.high_x - self.low_x + 1
    }

    pub fn height(&self) -> i32 {
        self.high_y - self.low_y + 1
    }
}

/// Inclusive box in absolute game units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitBox {
    pub low_x: i32,
    pub high_x: i32,
    pub low_y: i32,
    pub high_y: i32,
}

impl UnitBox {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.low_x && x <= self.high_x && y >= self.low_y && y <= self.high_y
    }
}

/// Where a region's source imagery comes from and where it lands.
///
/// Each tile of `tiles` on floor `plane + p` is cropped to `crop` and moved
/// by `shift` game units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub tiles: TileRange,
    pub plane: i32,
    pub crop: ChunkRect,
    pub shift: (i32, i32),
}

impl Placement {
    /// Game-unit box covered by the source imagery before shifting
    pub fn source_box(&self) -> UnitBox {
        UnitBox {
            low_x: self.tiles.low_x * TILE_UNITS + self.crop.low_x * CHUNK_UNITS,
            high_x: self.tiles.high_x * TILE_UNITS + self.crop.high_x * CHUNK_UNITS + CHUNK_UNITS - 1,
            low_y: self.tiles.low_y * TILE_UNITS + self.crop.low_y * CHUNK_UNITS,
            high_y: self.tiles.high_y * TILE_UNITS + self.crop.high_y * CHUNK_UNITS + CHUNK_UNITS - 1,
        }
    }
}

/// Tile range remapped from an old to a new location, whole tiles at a time
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DirectRemap {
    #[serde(rename = "xLowerLeft")]
    pub old_low_x: i32,
    #[serde(rename = "xLowerRight")]
    pub old_high_x: i32,
    #[serde(rename = "yLowerLeft")]
    pub old_low_y: i32,
    #[serde(rename = "yUpperLeft")]
    pub old_high_y: i32,
    #[serde(rename = "xUpperLeft")]
    pub new_low_x: i32,
    #[serde(rename = "xUpperRight")]
    pub new_high_x: i32,
    #[serde(rename = "yLowerRight")]
    pub new_low_y: i32,
    #[serde(rename = "yUpperRight")]
    pub new_high_y: i32,
    pub plane: i32,
    #[serde(rename = "numberOfPlanes")]
    pub number_of_planes: i32,
}

impl DirectRemap {
    pub fn old_range(&self) -> TileRange {
        TileRange::new(self.old_low_x, self.old_high_x, self.old_low_y, self.old_high_y)
    }

    pub fn new_range(&self) -> TileRange {
        TileRange::new(self.new_low_x, self.new_high_x, self.new_low_y, self.new_high_y)
    }
}

/// Chunk window of one tile moved to another tile and chunk offset
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRemap {
    pub old_x: i32,
    pub old_y: i32,
    pub new_x: i32,
    pub new_y: i32,
    pub old_plane: i32,
    pub number_of_planes: i32,
    #[serde(rename = "chunk_oldXLow")]
    pub chunk_old_x_low: i32,
    #[serde(rename = "chunk_oldXHigh")]
    pub chunk_old_x_high: i32,
    #[serde(rename = "chunk_oldYLow")]
    pub chunk_old_y_low: i32,
    #[serde(rename = "chunk_oldYHigh")]
    pub chunk_old_y_high: i32,
    #[serde(rename = "chunk_newXLow")]
    pub chunk_new_x_low: i32,
    #[serde(rename = "chunk_newXHigh")]
    pub chunk_new_x_high: i32,
    #[serde(rename = "chunk_newYLow")]
    pub chunk_new_y_low: i32,
    #[serde(rename = "chunk_newYHigh")]
    pub chunk_new_y_high: i32,
}

impl ChunkRemap {
    pub fn old_chunks(&self) -> ChunkRect {
        ChunkRect::new(
            self.chunk_old_x_low,
            self.chunk_old_x_high,
            self.chunk_old_y_low,
            self.chunk_old_y_high,
        )
    }

    pub fn new_chunks(&self) -> ChunkRect {
        ChunkRect::new(
            self.chunk_new_x_low,
            self.chunk_new_x_high,
            self.chunk_new_y_low,
            self.chunk_new_y_high,
        )
    }
}

/// Chunk window of a tile kept in place
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSubset {
    pub x_low: i32,
    pub x_high: i32,
    pub y_low: i32,
    pub y_high: i32,
    #[serde(alias = "plane")]
    pub old_plane: i32,
    pub number_of_planes: i32,
    #[serde(rename = "chunk_xLow")]
    pub chunk_x_low: i32,
    #[serde(rename = "chunk_xHigh")]
    pub chunk_x_high: i32,
    #[serde(rename = "chunk_yLow")]
    pub chunk_y_low: i32,
    #[serde(rename = "chunk_yHigh")]
    pub chunk_y_high: i32,
}

impl ChunkSubset {
    pub fn chunks(&self) -> ChunkRect {
        ChunkRect::new(self.chunk_x_low, self.chunk_x_high, self.chunk_y_low, self.chunk_y_high)
    }
}

/// Tile range drawn where it is
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainRegion {
    pub x_low: i32,
    pub x_high: i32,
    pub y_low: i32,
    pub y_high: i32,
    pub plane: i32,
    pub number_of_planes: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Region {
    DirectRemap(DirectRemap),
    ChunkRemap(ChunkRemap),
    ChunkSubset(ChunkSubset),
    Plain(PlainRegion),
}

/// Difference between the old and new extents of a direct remap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemapMismatch {
    pub old: TileRange,
    pub new: TileRange,
}

impl Region {
    pub fn shape_name(&self) -> &'static str {
        match self {
            Region::DirectRemap(_) => "direct remap",
            Region::ChunkRemap(_) => "chunk remap",
            Region::ChunkSubset(_) => "chunk subset",
            Region::Plain(_) => "plain",
        }
    }

    pub fn number_of_planes(&self) -> i32 {
        match self {
            Region::DirectRemap(r) => r.number_of_planes,
            Region::ChunkRemap(r) => r.number_of_planes,
            Region::ChunkSubset(r) => r.number_of_planes,
            Region::Plain(r) => r.number_of_planes,
        }
    }

    /// Destination tiles this region contributes to the map bounds
    pub fn extent(&self) -> TileRange {
        match self {
            // Only X is remapped when pasting, so Y keeps the old rows
            Region::DirectRemap(r) => {
                TileRange::new(r.new_low_x, r.new_high_x, r.old_low_y, r.old_high_y)
            }
            Region::ChunkRemap(r) => TileRange::single(r.new_x, r.new_y),
            Region::ChunkSubset(r) => TileRange::new(r.x_low, r.x_high, r.y_low, r.y_high),
            Region::Plain(r) => TileRange::new(r.x_low, r.x_high, r.y_low, r.y_high),
        }
    }

    /// Old and new extents of a direct remap whose sizes disagree
    pub fn remap_mismatch(&self) -> Option<RemapMismatch> {
        let Region::DirectRemap(r) = self else {
            return None;
        };
        let (old, new) = (r.old_range(), r.new_range());
        if old.width() != new.width() || old.height() != new.height() {
            Some(RemapMismatch { old, new })
        } else {
            None
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Region::DirectRemap(r) => {
                let old = r.old_range();
                // Columns beyond the narrower extent have nowhere to land
                let width = old.width().min(r.new_range().width());
                Placement {
                    tiles: TileRange::new(old.low_x, old.low_x + width - 1, old.low_y, old.high_y),
                    plane: r.plane,
                    crop: ChunkRect::FULL,
                    shift: ((r.new_low_x - r.old_low_x) * TILE_UNITS, 0),
                }
            }
            // Rows anchor on the high chunk edge, so a resized window keeps its top
            Region::ChunkRemap(r) => Placement {
                tiles: TileRange::single(r.old_x, r.old_y),
                plane: r.old_plane,
                crop: r.old_chunks(),
                shift: (
                    (r.new_x - r.old_x) * TILE_UNITS
                        + (r.chunk_new_x_low - r.chunk_old_x_low) * CHUNK_UNITS,
                    (r.new_y - r.old_y) * TILE_UNITS
                        + (r.chunk_new_y_high - r.chunk_old_y_high) * CHUNK_UNITS,
                ),
            },
            Region::ChunkSubset(r) => Placement {
                tiles: TileRange::single(r.x_low, r.y_low),
                plane: r.old_plane,
                crop: r.chunks(),
                shift: (0, 0),
            },
            Region::Plain(r) => Placement {
                tiles: TileRange::new(r.x_low, r.x_high, r.y_low, r.y_high),
                plane: r.plane,
                crop: ChunkRect::FULL,
                shift: (0, 0),
            },
        }
    }

    fn validate(self) -> Result<Self, String> {
        let ranges: Vec<TileRange> = match &self {
            Region::DirectRemap(r) => vec![r.old_range(), r.new_range()],
            Region::ChunkRemap(r) => {
                vec![TileRange::single(r.old_x, r.old_y), TileRange::single(r.new_x, r.new_y)]
            }
            Region::ChunkSubset(r) => vec![TileRange::new(r.x_low, r.x_high, r.y_low, r.y_high)],
            Region::Plain(r) => vec![TileRange::new(r.x_low, r.x_high, r.y_low, r.y_high)],
        };
        let chunks: Vec<ChunkRect> = match &self {
            Region::ChunkRemap(r) => vec![r.old_chunks(), r.new_chunks()],
            Region::ChunkSubset(r) => vec![r.chunks()],
            _ => Vec::new(),
        };

        let in_limits = |v: i32| (-MAX_TILE_COORD..=MAX_TILE_COORD).contains(&v);
        for r in &ranges {
            if !(in_limits(r.low_x) && in_limits(r.high_x) && in_limits(r.low_y) && in_limits(r.high_y)) {
                return Err(format!("tile range {:?} exceeds +/-{}", r, MAX_TILE_COORD));
            }
        }
        if ranges.iter().any(|r| r.width() < 1 || r.height() < 1) {
            return Err("tile range is inverted".to_string());
        }
        for c in &chunks {
            let in_tile = |v: i32| (0..CHUNKS_PER_TILE).contains(&v);
            if !(in_tile(c.low_x) && in_tile(c.high_x) && in_tile(c.low_y) && in_tile(c.high_y)) {
                return Err(format!("chunk range {:?} leaves the tile", c));
            }
            if c.width() < 1 || c.height() < 1 {
                return Err(format!("chunk range {:?} is inverted", c));
            }
        }
        if self.number_of_planes() < 1 {
            return Err("numberOfPlanes must be at least 1".to_string());
        }
        Ok(self)
    }
}

fn decode<T: DeserializeOwned>(shape: &'static str, value: &Value) -> Result<T, StitchError> {
    T::deserialize(value).map_err(|source| StitchError::MalformedRegion {
        shape,
        region: value.clone(),
        source,
    })
}

impl TryFrom<Value> for Region {
    type Error = StitchError;

    /// Probe order matters: chunk subsets also carry `xLow`.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let has = |key: &str| value.as_object().is_some_and(|o| o.contains_key(key));

        let region = if has("xLowerLeft") {
            Region::DirectRemap(decode("direct remap", &value)?)
        } else if has("chunk_oldXLow") {
            Region::ChunkRemap(decode("chunk remap", &value)?)
        } else if has("chunk_xLow") {
            Region::ChunkSubset(decode("chunk subset", &value)?)
        } else if has("xLow") {
            Region::Plain(decode("plain", &value)?)
        } else {
            return Err(StitchError::UnrecognizedRegionShape(value));
        };

        let shape = region.shape_name();
        region
            .validate()
            .map_err(|msg| StitchError::MalformedRegion {
                shape,
                region: value,
                source: serde_json::Error::custom(msg),
            })
    }
}
