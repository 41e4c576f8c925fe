//! # Isometric Terrain (ISOM)
//!
//! Infers the isometric transition type at each grid intersection from the raster tiles, checks
//! stored ISOM data against it and regenerates ISOM data when it is invalid.
//!
//! - `classify`: raw tile code → CV5 group + flags
//! - `type_tables`: per-tileset lookup tables derived from CV5
//! - `patterns` / `matcher`: 2x4 tile rectangle → transition type
//! - `grid`: per-cell flags and grid-alignment (domain) detection
//! - `validate` / `generate`: compare against or write the ISOM payload
//! - `shading`: overlay colours for the per-tile flags
//! - `analysis`: the state object tying it together

pub mod analysis;
pub mod classify;
pub mod generate;
pub mod grid;
pub mod matcher;
pub mod patterns;
pub mod shading;
pub mod type_tables;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

use std::io;

pub use analysis::{IsomStatus, TerrainAnalysis, TilesetContext};
pub use grid::Domain;

pub const MAX_MAP_DIM: usize = 256;
pub const MAX_ISOM_WIDTH: usize = MAX_MAP_DIM / 2 + 1;
pub const MAX_ISOM_HEIGHT: usize = MAX_MAP_DIM + 1;
pub const ISOM_RECT_LEN: usize = 8;

/// Tile flags for the domain finder
pub mod tile_flags {
    /// Even group
    pub const LEFT_TILE: u16 = 0x0000;
    /// Odd group
    pub const RIGHT_TILE: u16 = 0x0001;
    /// Plain terrain type, ignores the left/right distinction
    pub const BASIC_GROUP: u16 = 0x0002;
    /// Tile resolves through a doodad
    pub const DOODAD_TILE: u16 = 0x0004;
    /// Pair starts on an odd column
    pub const HORZ_MISALIGN: u16 = 0x0010;
    /// Does not fit its neighbours on an ISOM grid, or has no ISOM type
    pub const INVALID_ISOM: u16 = 0x0080;
    pub const MISMATCH_LEFT: u16 = 0x0100;
    pub const MISMATCH_UP: u16 = 0x0200;
    pub const MISMATCH_RIGHT: u16 = 0x0400;
    pub const MISMATCH_DOWN: u16 = 0x0800;
    /// Offset 0,0
    pub const ISOM_GRID_0: u16 = 0x1000;
    /// Offset -1,0
    pub const ISOM_GRID_1: u16 = 0x2000;
    /// Offset 0,-1
    pub const ISOM_GRID_2: u16 = 0x4000;
    /// Offset -1,-1
    pub const ISOM_GRID_3: u16 = 0x8000;

    pub const COLUMN: u16 = RIGHT_TILE;
    pub const MISMATCHED: u16 = MISMATCH_LEFT | MISMATCH_UP | MISMATCH_RIGHT | MISMATCH_DOWN;
    pub const ISOM_GRID: u16 = ISOM_GRID_0 | ISOM_GRID_1 | ISOM_GRID_2 | ISOM_GRID_3;
}

/// Direction code of a half-edge, relative to the intersection that owns it
pub mod dir {
    pub const TOP_LEFT_H: u8 = 0;
    pub const TOP_LEFT_V: u8 = 1;
    pub const TOP_RIGHT_H: u8 = 2;
    pub const TOP_RIGHT_V: u8 = 3;
    pub const BOT_RIGHT_H: u8 = 4;
    pub const BOT_RIGHT_V: u8 = 5;
    pub const BOT_LEFT_V: u8 = 6;
    pub const BOT_LEFT_H: u8 = 7;
}

/// Which grid-alignment class an intersection belongs to
pub fn grid_class(x: i32, y: i32) -> u8 {
    ((4 - 2 * (y & 1) - x) & 3) as u8
}

/// Packed half-edge: 1 edited bit, 3 direction bits, 11 type bits, 1 skipped bit (LSB first)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IsomTile(pub u16);

impl IsomTile {
    pub fn edited(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn dir(self) -> u8 {
        ((self.0 >> 1) & 0x7) as u8
    }

    pub fn isom_type(self) -> u16 {
        (self.0 >> 4) & 0x7FF
    }

    pub fn skipped(self) -> bool {
        self.0 & 0x8000 != 0
    }

    /// Replace direction and type, keeping the editor-only bits
    pub fn set(&mut self, dir: u8, isom_type: u16) {
        self.0 = (self.0 & 0x8001) | (((dir & 0x7) as u16) << 1) | ((isom_type & 0x7FF) << 4);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IsomRect {
    pub left: IsomTile,
    pub up: IsomTile,
    pub right: IsomTile,
    pub down: IsomTile,
}

/// One of the four half-edges stored in a rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    Left,
    Up,
    Right,
    Down,
}

impl IsomRect {
    pub fn half(&self, half: Half) -> IsomTile {
        match half {
            Half::Left => self.left,
            Half::Up => self.up,
            Half::Right => self.right,
            Half::Down => self.down,
        }
    }

    pub fn half_mut(&mut self, half: Half) -> &mut IsomTile {
        match half {
            Half::Left => &mut self.left,
            Half::Up => &mut self.up,
            Half::Right => &mut self.right,
            Half::Down => &mut self.down,
        }
    }
}

/// Location of a half-edge belonging to an intersection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfEdge {
    pub col: i32,
    pub row: i32,
    pub half: Half,
    /// Direction code the half-edge carries when owned by the intersection
    pub dir: u8,
}

/// Half-edges owned by intersection (x, y), two per rectangle, for the quadrants marked
/// visible in `[top left, top right, bottom left, bottom right]` order
pub fn cell_half_edges(x: i32, y: i32, visible: [bool; 4]) -> impl Iterator<Item = HalfEdge> {
    let col = x / 2;
    let layout = [
        (col, y, Half::Right, dir::TOP_LEFT_H, Half::Down, dir::TOP_LEFT_V),
        (col + 1, y, Half::Left, dir::TOP_RIGHT_H, Half::Down, dir::TOP_RIGHT_V),
        (col, y + 1, Half::Right, dir::BOT_LEFT_H, Half::Up, dir::BOT_LEFT_V),
        (col + 1, y + 1, Half::Left, dir::BOT_RIGHT_H, Half::Up, dir::BOT_RIGHT_V),
    ];
    layout
        .into_iter()
        .zip(visible)
        .filter(|(_, shown)| *shown)
        .flat_map(|((col, row, h1, d1, h2, d2), _)| {
            [
                HalfEdge {
                    col,
                    row,
                    half: h1,
                    dir: d1,
                },
                HalfEdge {
                    col,
                    row,
                    half: h2,
                    dir: d2,
                },
            ]
        })
}

/// The persisted ISOM payload: (width/2 + 1) x (height + 1) rectangles
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IsomGrid {
    pub width: usize,
    pub height: usize,
    pub rects: Vec<IsomRect>,
}

impl IsomGrid {
    pub fn for_map(map_width: usize, map_height: usize) -> Self {
        let width = map_width / 2 + 1;
        let height = map_height + 1;
        IsomGrid {
            width,
            height,
            rects: vec![IsomRect::default(); width * height],
        }
    }

    pub fn byte_len(map_width: usize, map_height: usize) -> usize {
        (map_width / 2 + 1) * (map_height + 1) * ISOM_RECT_LEN
    }

    pub fn from_bytes(map_width: usize, map_height: usize, data: &[u8]) -> Result<Self, io::Error> {
        let expected = Self::byte_len(map_width, map_height);
        if data.len() != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("ISOM size {}, expected {}", data.len(), expected),
            ));
        }
        let mut grid = Self::for_map(map_width, map_height);
        for (rect, chunk) in grid.rects.iter_mut().zip(data.chunks_exact(ISOM_RECT_LEN)) {
            let word = |i: usize| IsomTile(u16::from_le_bytes([chunk[i * 2], chunk[i * 2 + 1]]));
            *rect = IsomRect {
                left: word(0),
                up: word(1),
                right: word(2),
                down: word(3),
            };
        }
        Ok(grid)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.rects.len() * ISOM_RECT_LEN);
        for rect in &self.rects {
            for tile in [rect.left, rect.up, rect.right, rect.down] {
                out.extend_from_slice(&tile.0.to_le_bytes());
            }
        }
        out
    }

    /// Rectangle at ISOM column/row, `None` outside the grid
    pub fn get(&self, col: i32, row: i32) -> Option<&IsomRect> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        self.rects.get(row as usize * self.width + col as usize)
    }

    pub fn get_mut(&mut self, col: i32, row: i32) -> Option<&mut IsomRect> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        self.rects.get_mut(row as usize * self.width + col as usize)
    }
}
