//! World grid storage and the read-only query surface used by every subsystem
//!
//! The core never generates terrain. A host hands over a finished grid, either
//! tile by tile or through the compact ASCII form accepted by `from_ascii`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{GameError, Result};
use crate::grid::hex::HexCoord;
use crate::grid::terrain::{Feature, ResourceKind, Terrain};
use crate::grid::tile::Tile;

/// Read access to a grid supplied by world generation
pub trait GridProvider {
    fn tile_at(&self, coord: HexCoord) -> Option<&Tile>;

    /// Existing tiles adjacent to `coord` (up to 6)
    fn neighbors(&self, coord: HexCoord) -> Vec<&Tile> {
        coord
            .neighbors()
            .into_iter()
            .filter_map(|n| self.tile_at(n))
            .collect()
    }

    fn distance(&self, a: HexCoord, b: HexCoord) -> i32 {
        a.distance(&b)
    }
}

/// The tile store owned by the game state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldGrid {
    #[serde(with = "crate::core::serde_pairs")]
    tiles: BTreeMap<HexCoord, Tile>,
}

impl GridProvider for WorldGrid {
    fn tile_at(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }
}

impl WorldGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        Self {
            tiles: tiles.into_iter().map(|t| (t.coord, t)).collect(),
        }
    }

    /// Filled parallelogram of one terrain, q in `0..width`, r in `0..height`
    pub fn filled(width: i32, height: i32, terrain: Terrain) -> Self {
        let mut grid = Self::new();
        for r in 0..height {
            for q in 0..width {
                grid.insert(Tile::new(HexCoord::new(q, r), terrain));
            }
        }
        grid
    }

    pub fn insert(&mut self, tile: Tile) {
        self.tiles.insert(tile.coord, tile);
    }

    pub fn tile_at_mut(&mut self, coord: HexCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.values_mut()
    }

    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.tiles.keys().copied()
    }

    /// Parse a grid from whitespace-separated tokens, one row per line.
    ///
    /// Row index is `r`, token index is `q`. A token is a terrain letter
    /// (`g p d t s h m c l o`) followed by optional markers: `F` forest,
    /// `J` jungle, `M` marsh, `R` river, `V` village, and `:name` for a
    /// resource, e.g. `hF:iron`.
    pub fn from_ascii(text: &str) -> Result<Self> {
        let mut grid = Self::new();
        let rows = text.lines().map(str::trim).filter(|l| !l.is_empty());
        for (r, line) in rows.enumerate() {
            for (q, token) in line.split_whitespace().enumerate() {
                let coord = HexCoord::new(q as i32, r as i32);
                grid.insert(parse_tile_token(coord, token)?);
            }
        }
        Ok(grid)
    }
}

fn parse_tile_token(coord: HexCoord, token: &str) -> Result<Tile> {
    let (body, resource) = match token.split_once(':') {
        Some((body, name)) => {
            let resource = ResourceKind::from_name(name)
                .ok_or_else(|| GameError::MapParse(format!("unknown resource '{}' at {:?}", name, coord)))?;
            (body, Some(resource))
        }
        None => (token, None),
    };

    let mut chars = body.chars();
    let terrain = chars
        .next()
        .and_then(Terrain::from_char)
        .ok_or_else(|| GameError::MapParse(format!("bad terrain token '{}' at {:?}", token, coord)))?;

    let mut tile = Tile::new(coord, terrain);
    tile.resource = resource;
    for marker in chars {
        match marker {
            'F' => tile.feature = Some(Feature::Forest),
            'J' => tile.feature = Some(Feature::Jungle),
            'M' => tile.feature = Some(Feature::Marsh),
            'R' => tile.river_edges.extend([0u8, 1, 2]),
            'V' => tile.village = true,
            other => {
                return Err(GameError::MapParse(format!(
                    "unknown marker '{}' in '{}' at {:?}",
                    other, token, coord
                )))
            }
        }
    }
    Ok(tile)
}
