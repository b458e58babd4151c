// definitions.rs - World map definitions and user overrides

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::region::{PlainRegion, Region};

/// Identifier given to maps that carry neither `mapId` nor `fileId`
pub const UNKNOWN_MAP_ID: i32 = -1;

/// Planes rendered for the synthetic debug map
const DEBUG_MAP_PLANES: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: i32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDefinition {
    #[serde(default)]
    pub map_id: Option<i32>,
    #[serde(default)]
    pub file_id: Option<i32>,
    pub name: String,
    pub region_list: Vec<Region>,
    #[serde(default)]
    pub position: Option<Position>,
}

impl MapDefinition {
    /// `mapId` when present, else `fileId`
    pub fn id(&self) -> i32 {
        self.map_id.or(self.file_id).unwrap_or(UNKNOWN_MAP_ID)
    }
}

pub fn load_definitions(path: &Path) -> anyhow::Result<Vec<MapDefinition>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read map definitions {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid map definitions in {}", path.display()))
}

/// Apply user overrides: a matching identifier replaces the region list of
/// the base entry, anything else is appended in override order.
pub fn merge_overrides(
    mut base: Vec<MapDefinition>,
    overrides: Vec<MapDefinition>,
) -> Vec<MapDefinition> {
    for user_def in overrides {
        match base.iter_mut().find(|d| d.id() == user_def.id()) {
            Some(existing) => {
                tracing::debug!(
                    "Override replaces regions of map {} ({})",
                    existing.id(),
                    existing.name
                );
                existing.region_list = user_def.region_list;
            }
            None => base.push(user_def),
        }
    }
    base
}

/// Map spanning every base tile found on disk, all floors
pub fn debug_definition(low_x: i32, high_x: i32, low_y: i32, high_y: i32) -> MapDefinition {
    MapDefinition {
        map_id: Some(UNKNOWN_MAP_ID),
        file_id: None,
        name: "debug".to_string(),
        region_list: vec![Region::Plain(PlainRegion {
            x_low: low_x,
            x_high: high_x,
            y_low: low_y,
            y_high: high_y,
            plane: 0,
            number_of_planes: DEBUG_MAP_PLANES,
        })],
        position: None,
    }
}
