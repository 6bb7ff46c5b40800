//! # Map Module
//!
//! Terrain tiles and the read-only view movement code needs of them.

use crate::{DelverError, DelverResult, Position};
use serde::{Deserialize, Serialize};

/// Read access to the terrain that movement is checked against.
///
/// Coordinates outside `0..width` x `0..height` are never walkable; the
/// provided `is_blocked` treats them as blocked so that no move is ever
/// committed off the map.
pub trait MapView {
    /// Width of the map in tiles.
    fn width(&self) -> u32;

    /// Height of the map in tiles.
    fn height(&self) -> u32;

    /// Whether the in-bounds tile at `(x, y)` blocks movement.
    fn tile_blocked(&self, x: i32, y: i32) -> bool;

    /// Whether the in-bounds tile at `(x, y)` blocks line of sight.
    fn tile_blocks_sight(&self, x: i32, y: i32) -> bool;

    /// Whether `(x, y)` lies on the map.
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Whether terrain prevents entering `(x, y)`.
    fn is_blocked(&self, x: i32, y: i32) -> bool {
        !self.in_bounds(x, y) || self.tile_blocked(x, y)
    }
}

/// A single terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Blocks movement
    pub blocked: bool,
    /// Blocks line of sight
    pub block_sight: bool,
}

impl Tile {
    /// Creates a tile. A tile that blocks movement also blocks sight unless
    /// `block_sight` says otherwise.
    pub fn new(blocked: bool, block_sight: Option<bool>) -> Self {
        Self {
            blocked,
            block_sight: block_sight.unwrap_or(blocked),
        }
    }

    /// Open floor.
    pub fn floor() -> Self {
        Self::new(false, None)
    }

    /// Solid wall.
    pub fn wall() -> Self {
        Self::new(true, None)
    }

    /// Blocks movement but not sight, like a window or a chasm.
    pub fn window() -> Self {
        Self::new(true, Some(false))
    }

    /// Map glyph for this tile.
    pub fn glyph(&self) -> char {
        match (self.blocked, self.block_sight) {
            (false, _) => '.',
            (true, true) => '#',
            (true, false) => '=',
        }
    }
}

/// A rectangular dungeon level's terrain.
///
/// # Examples
///
/// ```
/// use delver::{GameMap, MapView};
///
/// let map = GameMap::from_rows(&[
///     "#####",
///     "#...#",
///     "#####",
/// ]).unwrap();
/// assert_eq!(map.width(), 5);
/// assert!(map.is_blocked(0, 0));
/// assert!(!map.is_blocked(2, 1));
/// assert!(map.is_blocked(-1, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    pub width: u32,
    pub height: u32,
    /// Row-major tiles, indexed `tiles[y][x]`
    pub tiles: Vec<Vec<Tile>>,
}

impl GameMap {
    /// Creates a map of open floor.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Tile::floor())
    }

    /// Creates a map with every tile set to `tile`.
    pub fn filled(width: u32, height: u32, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![tile; width as usize]; height as usize],
        }
    }

    /// Parses a map from text rows: `#` wall, `=` window, `.` floor.
    ///
    /// Every row must have the same length.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> DelverResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(DelverError::InvalidMap("map has no tiles".to_string()));
        }

        let mut tiles = Vec::with_capacity(height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(DelverError::InvalidMap(format!(
                    "row {} has {} tiles, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }

            let parsed = row
                .chars()
                .enumerate()
                .map(|(x, glyph)| match glyph {
                    '.' => Ok(Tile::floor()),
                    '#' => Ok(Tile::wall()),
                    '=' => Ok(Tile::window()),
                    other => Err(DelverError::InvalidMap(format!(
                        "unknown tile '{}' at ({}, {})",
                        other, x, y
                    ))),
                })
                .collect::<DelverResult<Vec<Tile>>>()?;
            tiles.push(parsed);
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            tiles,
        })
    }

    /// Gets the tile at a position.
    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        if !self.in_bounds(pos.x, pos.y) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    /// Gets the tile at a position mutably.
    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.in_bounds(pos.x, pos.y) {
            return None;
        }
        self.tiles
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
    }

    /// Replaces the tile at a position.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> DelverResult<()> {
        let slot = self
            .get_tile_mut(pos)
            .ok_or_else(|| DelverError::InvalidMap(format!("position {} is off the map", pos)))?;
        *slot = tile;
        Ok(())
    }

    /// Renders the terrain as text rows.
    pub fn to_rows(&self) -> Vec<String> {
        self.tiles
            .iter()
            .map(|row| row.iter().map(Tile::glyph).collect())
            .collect()
    }
}

impl MapView for GameMap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tile_blocked(&self, x: i32, y: i32) -> bool {
        self.get_tile(Position::new(x, y))
            .map(|tile| tile.blocked)
            .unwrap_or(true)
    }

    fn tile_blocks_sight(&self, x: i32, y: i32) -> bool {
        self.get_tile(Position::new(x, y))
            .map(|tile| tile.block_sight)
            .unwrap_or(true)
    }
}
