//! Tile map used for the hero's water checks.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use survivor_core::{WaterMap, MAP_TILES};

/// Tile ids drawn as water.
const WATER_TILES: std::ops::RangeInclusive<u32> = 14..=22;

/// Rows of tile ids; anything outside the grid counts as water.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TileMap {
    width: usize,
    tiles: Vec<Vec<u32>>,
}

impl TileMap {
    /// A map of the default size without any water.
    pub(crate) fn open_field() -> Self {
        let side = MAP_TILES as usize;
        Self {
            width: side,
            tiles: vec![vec![0; side]; side],
        }
    }

    /// Reads a tile map file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read tile map at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid tile map at {}", path.display()))
    }

    /// Parses the map format: `<label> <width>`, `<label> <height>`, three
    /// ignored lines, then one comma separated row of tile ids per line.
    ///
    /// Short rows and missing rows are filled with tile 0.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents.lines();
        let width = header(lines.next(), "width")?;
        let height = header(lines.next(), "height")?;
        for _ in 0..3 {
            let _ = lines.next();
        }

        let mut tiles = vec![vec![0; width]; height];
        for (row, line) in tiles.iter_mut().zip(lines) {
            let ids = line
                .split(|c: char| !c.is_ascii_digit())
                .filter(|token| !token.is_empty());
            for (cell, id) in row.iter_mut().zip(ids) {
                *cell = id
                    .parse()
                    .with_context(|| format!("tile id `{id}` is out of range"))?;
            }
        }

        Ok(Self { width, tiles })
    }

    /// Number of water tiles on the map.
    pub(crate) fn water_count(&self) -> usize {
        self.tiles
            .iter()
            .flatten()
            .filter(|id| WATER_TILES.contains(*id))
            .count()
    }
}

impl WaterMap for TileMap {
    fn is_water(&self, row: i32, col: i32) -> bool {
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            return true;
        };
        if col >= self.width {
            return true;
        }
        self.tiles
            .get(row)
            .map_or(true, |tiles| WATER_TILES.contains(&tiles[col]))
    }
}

fn header(line: Option<&str>, name: &str) -> Result<usize> {
    let Some(line) = line else {
        bail!("missing {name} header");
    };
    let value = line
        .split_whitespace()
        .nth(1)
        .with_context(|| format!("{name} header has no value"))?;
    let value: usize = value
        .parse()
        .with_context(|| format!("{name} `{value}` is not a tile count"))?;
    if value == 0 {
        bail!("{name} must be positive");
    }
    Ok(value)
}
