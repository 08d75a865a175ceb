// ──────────────────────────────────────────────────────────────────────────
// world/grid.rs
//
//  *   rows of map symbols          ──╮
//  *   symbol registry                │   --->  validated Grid with tile →
//  *   TextureSet (read-only)         │         TextureId resolved up front
//                                     ╯
// ──────────────────────────────────────────────────────────────────────────

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::world::texture::{FALLBACK, TextureId, TextureSet};

/// Closed set of tile kinds a map cell can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    /// Solid wall, variant index picks the texture.
    Wall(u8),
    /// Rendered as a wall with its own texture; open/close state is game
    /// logic and lives outside the renderer.
    Door,
}

impl Tile {
    /// A ray stops on any non-empty tile.
    #[inline]
    pub fn is_solid(self) -> bool {
        !matches!(self, Tile::Empty)
    }
}

/// Tile returned for every out-of-bounds query, so the map boundary acts
/// as an implicit wall and the raycaster needs no edge special-casing.
pub const BOUNDARY: Tile = Tile::Wall(0);

/// What a map symbol means: the tile kind plus the texture name that must
/// exist in the [`TextureSet`] at load time.
#[derive(Clone, Copy, Debug)]
pub struct TileDef {
    pub tile: Tile,
    pub texture: &'static str,
}

/// Built-in symbol registry used by the demo maps.
/// Callers with custom worlds pass their own table to [`Grid::load`].
pub static DEFAULT_TILESET: Lazy<HashMap<char, TileDef>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        ' ',
        TileDef {
            tile: Tile::Empty,
            texture: "FLOOR",
        },
    );
    map.insert(
        '#',
        TileDef {
            tile: Tile::Wall(0),
            texture: "BRICK",
        },
    );
    map.insert(
        '%',
        TileDef {
            tile: Tile::Wall(1),
            texture: "STONE",
        },
    );
    map.insert(
        '+',
        TileDef {
            tile: Tile::Door,
            texture: "DOOR",
        },
    );
    map
});

/*──────────────────────────── Error type ───────────────────────────*/

/// Fail-fast construction errors. Once a [`Grid`] exists, rendering
/// against it cannot fail.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadError {
    #[error("map is not rectangular: row {row} has {found} tiles, expected {expected}")]
    MalformedDimensions {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile symbol `{symbol}` at ({x}, {y})")]
    UnknownTileId { symbol: char, x: usize, y: usize },

    #[error("tile {tile:?} references texture `{name}` which is not loaded")]
    MissingTexture { tile: Tile, name: String },

    #[error("map is empty")]
    Empty,
}

/*====================================================================*/
/*                              Grid                                  */
/*====================================================================*/

/// Immutable tile map. Dimensions are fixed at load; every non-empty tile
/// kind resolved to a direct [`TextureId`] exactly once, so the per-pixel
/// render path does no name or tag dispatch.
#[derive(Debug)]
pub struct Grid {
    w: usize,
    h: usize,
    tiles: Vec<Tile>,
    textures: HashMap<Tile, TextureId>,
}

impl Grid {
    /// Validate `rows` against `registry` and resolve textures from `set`.
    ///
    /// Fails with a descriptive [`LoadError`] on the first ragged row,
    /// unknown symbol, or missing texture; a partially valid map never
    /// constructs.
    pub fn load(
        rows: &[&str],
        registry: &HashMap<char, TileDef>,
        set: &TextureSet,
    ) -> Result<Self, LoadError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(LoadError::Empty);
        }
        let w = rows[0].chars().count();
        let h = rows.len();

        let mut tiles = Vec::with_capacity(w * h);
        let mut textures = HashMap::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != w {
                return Err(LoadError::MalformedDimensions {
                    row: y,
                    expected: w,
                    found,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let def = registry
                    .get(&symbol)
                    .ok_or(LoadError::UnknownTileId { symbol, x, y })?;
                if def.tile.is_solid() && !textures.contains_key(&def.tile) {
                    let id = set.id(def.texture).ok_or_else(|| LoadError::MissingTexture {
                        tile: def.tile,
                        name: def.texture.to_string(),
                    })?;
                    textures.insert(def.tile, id);
                }
                tiles.push(def.tile);
            }
        }

        // the boundary sentinel must always resolve, even when no interior
        // cell uses Wall(0)
        textures.entry(BOUNDARY).or_insert(FALLBACK);

        Ok(Grid {
            w,
            h,
            tiles,
            textures,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }
    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// O(1) bounds-checked lookup; anything outside the map is [`BOUNDARY`].
    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return BOUNDARY;
        }
        self.tiles[y as usize * self.w + x as usize]
    }

    /// Texture resolved for `tile` at load time. Empty tiles and kinds the
    /// map never used fall back to id 0.
    #[inline]
    pub fn texture_of(&self, tile: Tile) -> TextureId {
        self.textures.get(&tile).copied().unwrap_or(FALLBACK)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
