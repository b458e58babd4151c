// source.rs - Source tile and sprite access

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{RgbImage, RgbaImage};

use mapstitch_shared::util::{parse_tile_stem, tile_file_name};

use crate::error::StitchError;
use crate::region::{TileRange, MAX_TILE_COORD};

/// Read access to base tiles keyed by `(plane, tileX, tileY)`
pub trait TileSource {
    /// `Ok(None)` when no tile exists for that key
    fn load_tile(&self, plane: i32, x: i32, y: i32) -> anyhow::Result<Option<RgbImage>>;
}

/// Base tiles stored as `{plane}_{x}_{y}.png` in one directory
pub struct DirTileSource {
    root: PathBuf,
}

impl DirTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extent of every tile present on disk, any plane
    pub fn scan_extent(&self) -> anyhow::Result<Option<TileRange>> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("Unable to list tiles in {}", self.root.display()))?;

        let mut extent: Option<TileRange> = None;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let Some((_, x, y)) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(parse_tile_stem)
            else {
                continue;
            };
            let in_limits = |v: i32| (-MAX_TILE_COORD..=MAX_TILE_COORD).contains(&v);
            if !(in_limits(x) && in_limits(y)) {
                tracing::warn!("Ignoring out-of-range base tile {}", path.display());
                continue;
            }
            let tile = TileRange::single(x, y);
            extent = Some(match extent {
                Some(e) => e.union(&tile),
                None => tile,
            });
        }
        Ok(extent)
    }
}

impl TileSource for DirTileSource {
    fn load_tile(&self, plane: i32, x: i32, y: i32) -> anyhow::Result<Option<RgbImage>> {
        let path = self.root.join(tile_file_name(plane, x, y));
        if !path.exists() {
            return Ok(None);
        }
        let image = image::open(&path)
            .with_context(|| format!("Unable to decode tile {}", path.display()))?;
        Ok(Some(image.to_rgb8()))
    }
}

/// Icon sprites keyed by sprite id
#[derive(Default)]
pub struct SpriteSet {
    sprites: HashMap<u32, RgbaImage>,
}

impl SpriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `{spriteId}.png` of a directory. A missing directory
    /// yields an empty set.
    pub fn load_dir(dir: &Path) -> anyhow::Result<Self> {
        let mut set = Self::new();
        if !dir.is_dir() {
            tracing::warn!("Sprite directory {} not found, no icons can be drawn", dir.display());
            return Ok(set);
        }

        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Unable to list sprites in {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            else {
                continue;
            };
            let sprite = image::open(&path)
                .with_context(|| format!("Unable to decode sprite {}", path.display()))?;
            tracing::trace!("Loaded sprite {} from {}", id, path.display());
            set.insert(id, sprite.to_rgba8());
        }
        Ok(set)
    }

    pub fn insert(&mut self, id: u32, sprite: RgbaImage) {
        self.sprites.insert(id, sprite);
    }

    pub fn get(&self, id: u32) -> Result<&RgbaImage, StitchError> {
        self.sprites.get(&id).ok_or(StitchError::SpriteNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
