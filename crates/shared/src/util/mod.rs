// Filesystem helpers shared by the pipeline stages

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Create a directory (and its parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Could not create directory {}", path.display()))?;
    }
    Ok(())
}

/// Create the parent directory of a file path
pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Join path components, skipping empty ones
pub fn build_path(base: &Path, parts: &[&str]) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in parts {
        if !part.is_empty() {
            path.push(part);
        }
    }
    path
}

/// Split a `{plane}_{x}_{y}` file stem into its three integers
pub fn parse_tile_stem(stem: &str) -> Option<(i32, i32, i32)> {
    let mut parts = stem.split('_');
    let plane = parts.next()?.parse().ok()?;
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((plane, x, y))
}

/// File name of a tile keyed by plane and tile coordinates
pub fn tile_file_name(plane: i32, x: i32, y: i32) -> String {
    format!("{}_{}_{}.png", plane, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path_skips_empty_parts() {
        let path = build_path(Path::new("out"), &["tiles", "", "base"]);
        assert_eq!(path, Path::new("out").join("tiles").join("base"));
    }

    #[test]
    fn test_parse_tile_stem() {
        assert_eq!(parse_tile_stem("0_50_50"), Some((0, 50, 50)));
        assert_eq!(parse_tile_stem("3_-1_12"), Some((3, -1, 12)));
        assert_eq!(parse_tile_stem("0_50"), None);
        assert_eq!(parse_tile_stem("0_50_50_1"), None);
        assert_eq!(parse_tile_stem("a_b_c"), None);
    }

    #[test]
    fn test_tile_file_name_round_trips_stem() {
        let name = tile_file_name(1, 48, 52);
        assert_eq!(name, "1_48_52.png");
        assert_eq!(parse_tile_stem(name.trim_end_matches(".png")), Some((1, 48, 52)));
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("12").join("2").join("0_1_1.png");
        ensure_parent_dir(&file).unwrap();
        assert!(file.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new("bare.png")).unwrap();
    }
}
