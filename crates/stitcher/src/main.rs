// stitcher - Game map tile stitcher
// Composites per-region base tiles into padded per-map canvases, blends the
// floors, stamps map icons and cuts a zoom pyramid of 256px web-map tiles
// plus a basemap index.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

mod basemap;
mod blend;
mod bounds;
mod compose;
mod cutter;
mod definitions;
mod error;
mod icons;
mod pipeline;
mod region;
mod settings;
mod source;
mod zoom;

use mapstitch_shared::basic_log;
use mapstitch_shared::config::{Config, ENV_PREFIX};
use mapstitch_shared::log::{initialize_logging, map_log_level, WorkerGuard};
use mapstitch_shared::util::build_path;

use crate::basemap::write_index;
use crate::cutter::TileWriter;
use crate::definitions::{debug_definition, load_definitions, merge_overrides, MapDefinition};
use crate::icons::load_icons;
use crate::pipeline::{index_all, render_all, select_maps, RenderContext};
use crate::settings::RenderSettings;
use crate::source::{DirTileSource, SpriteSet};

/// Console level used when neither the CLI nor the config picks one
const DEFAULT_LOG_LEVEL: i32 = 2;

const DEFINITIONS_FILE: &str = "worldMapDefinitions.json";
const ICONS_FILE: &str = "minimapIcons.json";
const SPRITES_DIR: &str = "icons";
const INDEX_FILE: &str = "basemaps.json";

#[derive(Parser, Debug)]
#[command(name = "stitcher")]
#[command(about = "Stitches game map tiles into a zoomable basemap pyramid")]
#[command(version)]
struct Cli {
    /// Console log level override (0=Errors, 1=Warnings, 2=Detail, 3=Debug, 4=Trace)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<i32>,

    /// INI configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render tiles for every selected map and write the basemap index
    Render(MapArgs),
    /// Only resolve definitions and write the basemap index
    Index(MapArgs),
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Version directory holding definitions, icons and base tiles
    #[arg(short = 'd', long = "data")]
    data_dir: PathBuf,

    /// User definitions that replace or extend the world map definitions
    #[arg(long = "overrides", value_name = "FILE")]
    overrides: Option<PathBuf>,

    /// Rendered tile root (default: <data>/tiles/rendered)
    #[arg(short = 'o', long = "output")]
    output_dir: Option<PathBuf>,

    /// Basemap index file (default: <data>/basemaps.json)
    #[arg(long = "index", value_name = "FILE")]
    index_file: Option<PathBuf>,

    /// Only process these map ids (repeatable)
    #[arg(short = 'm', long = "map", value_name = "ID", allow_negative_numbers = true)]
    maps: Vec<i32>,

    /// Add a map spanning every base tile on disk
    #[arg(long = "debug-map")]
    debug_map: bool,
}

impl MapArgs {
    fn tiles_dir(&self) -> PathBuf {
        build_path(&self.data_dir, &["tiles", "base"])
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| build_path(&self.data_dir, &["tiles", "rendered"]))
    }

    fn index_file(&self) -> PathBuf {
        self.index_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(INDEX_FILE))
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path, ENV_PREFIX),
        None => Ok(Config::default()),
    }
}

fn init_logging(cli_level: Option<i32>, config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let level = match cli_level {
        Some(level) => level,
        None => config.get_int_default("logging", "Level", DEFAULT_LOG_LEVEL)?,
    };
    let dir = config.get_string_default("logging", "Dir", "");
    let log_dir = if dir.is_empty() { None } else { Some(dir) };
    Ok(initialize_logging(log_dir.as_deref(), map_log_level(level)))
}

/// Base definitions, user overrides, optional debug map, then the id filter
fn resolve_definitions(
    args: &MapArgs,
    tiles: &DirTileSource,
    settings: &RenderSettings,
) -> anyhow::Result<Vec<MapDefinition>> {
    let mut definitions = load_definitions(&args.data_dir.join(DEFINITIONS_FILE))?;
    if let Some(path) = &args.overrides {
        let overrides = load_definitions(path)?;
        basic_log!("Applying {} override definition(s) from {}", overrides.len(), path.display());
        definitions = merge_overrides(definitions, overrides);
    }

    if args.debug_map || settings.include_debug_map {
        match tiles.scan_extent()? {
            Some(extent) => definitions.push(debug_definition(
                extent.low_x,
                extent.high_x,
                extent.low_y,
                extent.high_y,
            )),
            None => tracing::warn!("No base tiles in {}, debug map skipped", tiles.root().display()),
        }
    }

    let definitions = select_maps(definitions, &args.maps);
    if definitions.is_empty() {
        tracing::warn!("No map definitions selected");
    }
    Ok(definitions)
}

fn run_render(args: MapArgs, settings: &RenderSettings) -> anyhow::Result<()> {
    let tiles = DirTileSource::new(args.tiles_dir());
    let definitions = resolve_definitions(&args, &tiles, settings)?;
    let icons = load_icons(&args.data_dir.join(ICONS_FILE))?;
    let sprites = SpriteSet::load_dir(&args.data_dir.join(SPRITES_DIR))?;
    if sprites.is_empty() && !icons.is_empty() {
        tracing::warn!("{} icons but no sprites, rendering will fail on the first icon", icons.len());
    }
    let writer = TileWriter::new(args.output_dir());
    basic_log!(
        "Render: {} map(s), {} icons, {} sprites, tiles {} -> {}",
        definitions.len(),
        icons.len(),
        sprites.len(),
        tiles.root().display(),
        writer.root().display()
    );

    let ctx = RenderContext {
        icons: &icons,
        sprites: &sprites,
        tiles: &tiles,
        settings,
        writer: &writer,
    };
    let index = render_all(&ctx, &definitions)?;

    let index_file = args.index_file();
    write_index(&index_file, &index)?;
    basic_log!("Wrote {} basemap(s) to {}", index.len(), index_file.display());
    Ok(())
}

fn run_index(args: MapArgs, settings: &RenderSettings) -> anyhow::Result<()> {
    let tiles = DirTileSource::new(args.tiles_dir());
    let definitions = resolve_definitions(&args, &tiles, settings)?;
    let index = index_all(&definitions, settings)?;

    let index_file = args.index_file();
    write_index(&index_file, &index)?;
    basic_log!("Wrote {} basemap(s) to {}", index.len(), index_file.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let _log_guard = init_logging(cli.log_level, &config)?;
    if let Some(path) = &cli.config {
        tracing::info!("Using configuration file: {}", path.display());
    }

    let settings = RenderSettings::from_config(&config).context("Invalid render settings")?;
    tracing::debug!("{:?}", settings);

    match cli.command {
        Command::Render(args) => run_render(args, &settings),
        Command::Index(args) => run_index(args, &settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Region, TileRange};
    use serde_json::json;

    fn plain_json(x: i32, y: i32) -> serde_json::Value {
        json!({ "xLow": x, "xHigh": x, "yLow": y, "yHigh": y, "plane": 0, "numberOfPlanes": 1 })
    }

    fn map_args(data_dir: &Path, overrides: Option<PathBuf>, maps: Vec<i32>, debug_map: bool) -> MapArgs {
        MapArgs {
            data_dir: data_dir.to_path_buf(),
            overrides,
            output_dir: None,
            index_file: None,
            maps,
            debug_map,
        }
    }

    fn data_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let base = json!([
            { "fileId": 1, "name": "Surface", "regionList": [plain_json(50, 50)] },
            { "fileId": 2, "name": "Dungeon", "regionList": [plain_json(60, 60)] },
        ]);
        std::fs::write(dir.path().join(DEFINITIONS_FILE), base.to_string()).unwrap();

        let overrides = json!([
            { "fileId": 1, "name": "ignored", "regionList": [plain_json(51, 52)] },
            { "fileId": 7, "name": "Custom", "regionList": [plain_json(70, 70)] },
        ]);
        let overrides_path = dir.path().join("user.json");
        std::fs::write(&overrides_path, overrides.to_string()).unwrap();

        let tiles = build_path(dir.path(), &["tiles", "base"]);
        std::fs::create_dir_all(&tiles).unwrap();
        std::fs::write(tiles.join("0_10_20.png"), b"").unwrap();
        std::fs::write(tiles.join("2_12_21.png"), b"").unwrap();
        (dir, overrides_path)
    }

    #[test]
    fn test_overrides_debug_map_then_filter() {
        let (dir, overrides) = data_dir();
        let args = map_args(dir.path(), Some(overrides), vec![-1, 1], true);
        let tiles = DirTileSource::new(args.tiles_dir());

        let defs = resolve_definitions(&args, &tiles, &RenderSettings::default()).unwrap();
        let ids: Vec<i32> = defs.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![1, -1]);

        assert_eq!(defs[0].name, "Surface");
        assert_eq!(defs[0].region_list[0].extent(), TileRange::single(51, 52));
        let Region::Plain(debug) = &defs[1].region_list[0] else {
            panic!("debug map should be a plain region");
        };
        assert_eq!((debug.x_low, debug.x_high, debug.y_low, debug.y_high), (10, 12, 20, 21));
    }

    #[test]
    fn test_debug_map_from_settings_and_no_filter() {
        let (dir, _) = data_dir();
        let args = map_args(dir.path(), None, Vec::new(), false);
        let tiles = DirTileSource::new(args.tiles_dir());

        let plain_run = resolve_definitions(&args, &tiles, &RenderSettings::default()).unwrap();
        let ids: Vec<i32> = plain_run.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![1, 2]);

        let settings = RenderSettings {
            include_debug_map: true,
            ..RenderSettings::default()
        };
        let with_debug = resolve_definitions(&args, &tiles, &settings).unwrap();
        let ids: Vec<i32> = with_debug.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![1, 2, -1]);
    }
}
