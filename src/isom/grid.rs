//! # Tile Grid and Domain Detection
//!
//! Per-tile flags describing how well each map tile fits an ISOM layout, plus detection of the
//! grid alignment the map's terrain was painted on.
//!
//! Cells are addressed in intersection coordinates with a halo: x runs from -2 to width-1 and y
//! from -1 to height-1, so intersections whose rectangle hangs off the top or left border still
//! have a cell. Intersection (x, y) owns the rectangle of tiles x..x+3 on rows y and y+1.

use serde::Serialize;

use super::analysis::TilesetContext;
use super::grid_class;
use super::matcher::resolve_rect;
use super::tile_flags::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileDomain {
    /// Resolved ISOM type of the intersection at this cell
    pub isom_type: u16,
    pub flags: u16,
    pub domain: Option<u16>,
}

pub struct DomainGrid {
    map_width: i32,
    map_height: i32,
    cells: Vec<TileDomain>,
}

impl DomainGrid {
    pub fn new(map_width: usize, map_height: usize) -> Self {
        DomainGrid {
            map_width: map_width as i32,
            map_height: map_height as i32,
            cells: vec![TileDomain::default(); (map_width + 2) * (map_height + 1)],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < -2 || y < -1 || x >= self.map_width || y >= self.map_height {
            return None;
        }
        Some(((y + 1) * (self.map_width + 2) + x + 2) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&TileDomain> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut TileDomain> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Flags of a cell, 0 outside the grid
    pub fn flags(&self, x: i32, y: i32) -> u16 {
        self.get(x, y).map_or(0, |c| c.flags)
    }

    pub fn add_flags(&mut self, x: i32, y: i32, flags: u16) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.flags |= flags;
        }
    }

    fn cells_mut(&mut self) -> impl Iterator<Item = (i32, i32, &mut TileDomain)> {
        let row = self.map_width + 2;
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, cell)| (i as i32 % row - 2, i as i32 / row - 1, cell))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub left: i32,
    pub up: i32,
    pub right: i32,
    pub down: i32,
}

/// Grid alignment shared by the whole map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Domain {
    /// No single alignment class covers every valid tile
    Unresolved,
    Single { grid: u8, bounds: Bounds },
}

impl Domain {
    /// Classes 1 and 3 are shifted by one tile horizontally and cannot be stored as ISOM
    pub fn is_storable(&self) -> bool {
        matches!(self, Domain::Single { grid: 0 | 2, .. })
    }
}

/// Tie-break order when more than one alignment class fits
const CLASS_PREFERENCE: [u8; 4] = [0, 2, 1, 3];

pub struct TerrainGrid {
    pub width: usize,
    pub height: usize,
    /// CV5 group of every map tile, row-major
    pub groups: Vec<u16>,
    pub cells: DomainGrid,
    pub domain: Domain,
}

impl TerrainGrid {
    /// Classify every tile and flag tiles that cannot take part in an ISOM layout
    pub fn parse(ctx: &TilesetContext, raster: &[u16], width: usize, height: usize) -> Self {
        let mut grid = TerrainGrid {
            width,
            height,
            groups: raster.iter().map(|&t| ctx.classify(t)).collect(),
            cells: DomainGrid::new(width, height),
            domain: Domain::Unresolved,
        };
        grid.groups.resize(width * height, 0);

        let (w, h) = (width as i32, height as i32);
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) as usize;
                let tile = raster.get(i).copied().unwrap_or(0);
                let group = grid.groups[i];

                let flags = if ctx.terrain_of(group) == 0 || !ctx.has_variant(tile) {
                    INVALID_ISOM
                } else {
                    let mut flags = group & COLUMN;
                    if ctx.is_basic_group(group) {
                        flags |= BASIC_GROUP;
                    }
                    if group != tile >> 4 {
                        flags |= DOODAD_TILE;
                    }
                    if (group & COLUMN) != (x as u16 & COLUMN) {
                        flags |= HORZ_MISALIGN;
                    }
                    flags
                };
                grid.cells.add_flags(x, y, flags);
            }
        }

        for y in 0..h {
            for x in 0..w {
                if grid.cells.flags(x, y) & INVALID_ISOM != 0 {
                    continue;
                }
                let group = grid.group_at(x, y);
                if x < w - 1 {
                    let right = grid.group_at(x + 1, y);
                    if group == 0 || right == 0 || (group & COLUMN == LEFT_TILE && right != group + 1)
                    {
                        log::trace!("({:3},{:3}) left/right mismatch {} {}", x, y, group, right);
                        grid.cells.add_flags(x, y, MISMATCH_RIGHT);
                        grid.cells.add_flags(x + 1, y, MISMATCH_LEFT);
                    }
                }

                let mut mask = 0;
                if x > 0 {
                    mask |= MISMATCH_LEFT;
                }
                if y > 0 {
                    mask |= MISMATCH_UP;
                }
                if x < w - 1 {
                    mask |= MISMATCH_RIGHT;
                }
                if y < h - 1 {
                    mask |= MISMATCH_DOWN;
                }

                let flags = grid.cells.flags(x, y);
                let isolated = flags & MISMATCHED == mask;
                let left_unpaired =
                    flags & (COLUMN | BASIC_GROUP | MISMATCH_RIGHT) == LEFT_TILE | MISMATCH_RIGHT;
                let right_unpaired =
                    flags & (COLUMN | BASIC_GROUP | MISMATCH_LEFT) == RIGHT_TILE | MISMATCH_LEFT;
                if isolated || left_unpaired || right_unpaired {
                    grid.cells.add_flags(x, y, INVALID_ISOM);
                }
            }
        }
        grid
    }

    /// CV5 group at a map tile, 0 outside the map
    pub fn group_at(&self, x: i32, y: i32) -> u16 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.groups[y as usize * self.width + x as usize]
    }

    /// Resolve the ISOM type of the intersection at (x, y) from the tiles around it
    pub fn isom_type_at(&self, ctx: &TilesetContext, x: i32, y: i32) -> u16 {
        let (w, h) = (self.width as i32, self.height as i32);
        if x < -3 || x >= w || y < -1 || y >= h {
            return 0;
        }

        let mut tiles = [0u16; 8];
        let mut flags = [INVALID_ISOM; 8];
        for i in 0..4 {
            let tx = x + i as i32;
            if tx < 0 {
                continue;
            }
            if tx >= w {
                break;
            }
            if y >= 0 {
                tiles[i] = self.group_at(tx, y);
                flags[i] = self.cells.flags(tx, y);
            }
            if y + 1 < h {
                tiles[4 + i] = self.group_at(tx, y + 1);
                flags[4 + i] = self.cells.flags(tx, y + 1);
            }
        }
        resolve_rect(ctx, &mut tiles, &mut flags)
    }

    /// Find the alignment class every valid tile agrees on
    pub fn detect_domain(&mut self, ctx: &TilesetContext) -> Domain {
        let (w, h) = (self.width as i32, self.height as i32);

        for y in -1..h {
            for x in -2..w {
                let isom_type = self.isom_type_at(ctx, x, y);
                if let Some(cell) = self.cells.get_mut(x, y) {
                    cell.isom_type = isom_type;
                    cell.domain = None;
                }
                if isom_type == 0 {
                    continue;
                }
                let grid_flag = ISOM_GRID_0 << grid_class(x, y);
                for i in 0..4 {
                    if x + i < w {
                        self.cells.add_flags(x + i, y, grid_flag);
                        if y < h - 1 {
                            self.cells.add_flags(x + i, y + 1, grid_flag);
                        }
                    }
                }
            }
        }

        let mut shared = ISOM_GRID;
        for y in 0..h {
            for x in 0..w {
                let flags = self.cells.flags(x, y);
                if flags & INVALID_ISOM == 0 {
                    shared &= flags & ISOM_GRID;
                }
            }
        }

        let class = CLASS_PREFERENCE
            .iter()
            .copied()
            .find(|&c| shared & (ISOM_GRID_0 << c) != 0);
        self.domain = match class {
            Some(class) => {
                let keep = ISOM_GRID_0 << class;
                for (x, y, cell) in self.cells.cells_mut() {
                    cell.flags &= keep | !ISOM_GRID;
                    if grid_class(x, y) == class {
                        cell.domain = Some(0);
                    }
                }
                log::debug!("Single grid domain, class {}", class);
                Domain::Single {
                    grid: class,
                    bounds: Bounds {
                        left: -2,
                        up: -1,
                        right: w,
                        down: h,
                    },
                }
            }
            None => {
                log::debug!("No single grid domain");
                Domain::Unresolved
            }
        };
        self.domain
    }

    /// Whether another raster classifies to the same groups as this one
    pub fn matches_raster(&self, ctx: &TilesetContext, raster: &[u16]) -> bool {
        raster.len() == self.groups.len()
            && raster
                .iter()
                .zip(self.groups.iter())
                .all(|(&t, &g)| ctx.classify(t) == g)
    }
}
