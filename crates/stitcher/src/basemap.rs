// basemap.rs - Basemap index entries

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use mapstitch_shared::util::ensure_parent_dir;

use crate::bounds::MapBounds;
use crate::definitions::MapDefinition;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMap {
    pub map_id: i32,
    pub name: String,
    pub bounds: [[i32; 2]; 2],
    pub center: [i32; 2],
}

impl BaseMap {
    pub fn new(definition: &MapDefinition, bounds: &MapBounds, surface_center: [i32; 2]) -> Self {
        Self {
            map_id: definition.id(),
            name: definition.name.clone(),
            bounds: bounds.unit_bounds(),
            center: map_center(definition, bounds, surface_center),
        }
    }
}

/// Surface maps (id below 1) open on the configured surface center; others
/// use their declared position, falling back to the middle of their tiles.
pub fn map_center(definition: &MapDefinition, bounds: &MapBounds, surface_center: [i32; 2]) -> [i32; 2] {
    if definition.id() < 1 {
        return surface_center;
    }
    match definition.position {
        Some(position) => [position.x, position.y],
        None => bounds.midpoint(),
    }
}

pub fn write_index(path: &Path, maps: &[BaseMap]) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(maps).context("Unable to serialize basemap index")?;
    std::fs::write(path, json)
        .with_context(|| format!("Unable to write basemap index {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Position;
    use crate::region::tests::plain;

    const SURFACE: [i32; 2] = [2496, 3328];

    fn definition(map_id: i32, position: Option<Position>) -> MapDefinition {
        MapDefinition {
            map_id: Some(map_id),
            file_id: None,
            name: format!("map {map_id}"),
            region_list: vec![plain(50, 50, 50, 50, 1)],
            position,
        }
    }

    #[test]
    fn test_center_selection() {
        let bounds = MapBounds::from_regions(&[plain(50, 50, 50, 50, 1)]).unwrap();
        let at = Some(Position { x: 3000, y: 3100, z: 0 });

        assert_eq!(map_center(&definition(0, at), &bounds, SURFACE), SURFACE);
        assert_eq!(map_center(&definition(-1, None), &bounds, SURFACE), SURFACE);
        assert_eq!(map_center(&definition(5, at), &bounds, SURFACE), [3000, 3100]);
        assert_eq!(map_center(&definition(5, None), &bounds, SURFACE), [3232, 3232]);
    }

    #[test]
    fn test_index_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basemaps.json");
        let def = definition(7, None);
        let bounds = MapBounds::from_regions(&def.region_list).unwrap();
        let maps = vec![BaseMap::new(&def, &bounds, SURFACE)];

        write_index(&path, &maps).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["mapId"], 7);
        assert_eq!(raw[0]["bounds"], serde_json::json!([[3136, 3136], [3328, 3328]]));
        let parsed: Vec<BaseMap> = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed, maps);
    }
}
