//! # ISOM Validation
//!
//! Compares the stored ISOM payload against the types resolved from the tiles. Only intersections
//! the payload actually describes are checked: ones whose half-edges carry the direction codes of
//! that intersection, or blank ones with no direction information at all.

use serde::Serialize;

use super::analysis::TilesetContext;
use super::grid::TerrainGrid;
use super::tile_flags::MISMATCHED;
use super::type_tables::RectSide;
use super::{cell_half_edges, IsomGrid, IsomTile};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub checked: u32,
    pub valid: u32,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.checked > 0 && self.valid == self.checked
    }
}

/// Quadrants of intersection (x, y) whose half-edges lie inside the payload during validation
fn checked_quadrants(x: i32, y: i32, width: i32, height: i32) -> [bool; 4] {
    let top = y >= 0;
    let bottom = y < height - 1;
    let left = x >= 0;
    let right = x < width - 2;
    [top && left, top && right, bottom && left, bottom && right]
}

/// Which part of the rectangle is left when it hangs over the map border
fn border_side(x: i32, y: i32, width: i32, height: i32) -> Option<RectSide> {
    let off_left = x < 0;
    let off_right = x >= width - 2;
    if y < 0 {
        Some(match (off_left, off_right) {
            (true, _) => RectSide::DownRight,
            (_, true) => RectSide::DownLeft,
            _ => RectSide::Down,
        })
    } else if y >= height - 1 {
        Some(match (off_left, off_right) {
            (true, _) => RectSide::UpRight,
            (_, true) => RectSide::UpLeft,
            _ => RectSide::Up,
        })
    } else if off_left {
        Some(RectSide::Right)
    } else if off_right {
        Some(RectSide::Left)
    } else {
        None
    }
}

/// Stored half-edges of an intersection paired with the direction code each should carry
fn stored_halves(isom: &IsomGrid, x: i32, y: i32, visible: [bool; 4]) -> Vec<(IsomTile, u8)> {
    cell_half_edges(x, y, visible)
        .map(|h| {
            let tile = isom
                .get(h.col, h.row)
                .map(|r| r.half(h.half))
                .unwrap_or_default();
            (tile, h.dir)
        })
        .collect()
}

fn is_placed_cell(halves: &[(IsomTile, u8)]) -> bool {
    halves.iter().all(|(tile, dir)| tile.dir() == *dir)
}

/// No direction codes, and every rectangle agrees on one type
fn is_empty_cell(halves: &[(IsomTile, u8)]) -> bool {
    if halves.iter().any(|(tile, _)| tile.dir() != 0) {
        return false;
    }
    let mut shared = 0;
    for rect in halves.chunks(2) {
        let isom_type = rect[0].0.isom_type();
        if rect.iter().any(|(tile, _)| tile.isom_type() != isom_type) {
            return false;
        }
        if isom_type != 0 {
            if shared != 0 && shared != isom_type {
                return false;
            }
            shared = isom_type;
        }
    }
    true
}

fn cell_has_type(halves: &[(IsomTile, u8)], isom_type: u16) -> bool {
    halves.iter().all(|(tile, _)| tile.isom_type() == isom_type)
}

/// ISOM type with the transition and pattern it stands for, when it is one
fn describe_type(ctx: &TilesetContext, isom_type: u16) -> String {
    match ctx.tables.pattern_of(isom_type) {
        Some((id, pattern)) => format!("{:03x} (terrain {} {})", isom_type, id, pattern.name),
        None => format!("{:03x}", isom_type),
    }
}

/// Check every intersection the payload describes, flagging the tiles of mismatching ones
pub fn validate_isom(
    grid: &mut TerrainGrid,
    ctx: &TilesetContext,
    isom: &IsomGrid,
) -> ValidationResult {
    let (w, h) = (grid.width as i32, grid.height as i32);
    let mut result = ValidationResult::default();

    for y in -1..h {
        for x in (-2..w).step_by(2) {
            let halves = stored_halves(isom, x, y, checked_quadrants(x, y, w, h));
            if !is_placed_cell(&halves) && !is_empty_cell(&halves) {
                continue;
            }
            result.checked += 1;

            let resolved = grid.isom_type_at(ctx, x, y);
            let matches = cell_has_type(&halves, resolved)
                || border_side(x, y, w, h).map_or(false, |side| {
                    ctx.tables
                        .partial_edge_types(resolved, side)
                        .iter()
                        .any(|&t| cell_has_type(&halves, t))
                });

            if matches {
                result.valid += 1;
                continue;
            }

            log::debug!(
                "({:3},{:3}) resolved {}, stored {}",
                x,
                y,
                describe_type(ctx, resolved),
                describe_type(ctx, halves.first().map_or(0, |(t, _)| t.isom_type()))
            );
            for row in [y, y + 1] {
                if row < 0 || row >= h {
                    continue;
                }
                if x >= 0 {
                    grid.cells.add_flags(x, row, MISMATCHED);
                    grid.cells.add_flags(x + 1, row, MISMATCHED);
                }
                if x < w - 2 {
                    grid.cells.add_flags(x + 2, row, MISMATCHED);
                    grid.cells.add_flags(x + 3, row, MISMATCHED);
                }
            }
        }
    }

    log::info!("ISOM cells valid: {} of {}", result.valid, result.checked);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isom::fixtures::{self, DIRT_MUD_ISOM, G_DIRT};
    use crate::isom::generate::{generate_isom, set_isom_cell};
    use crate::isom::patterns::{ISOM_EDGE_NW, ISOM_EDGE_SE};
    use crate::isom::{dir, IsomRect};

    #[test]
    fn border_sides() {
        assert_eq!(border_side(-2, -1, 4, 4), Some(RectSide::DownRight));
        assert_eq!(border_side(2, -1, 4, 4), Some(RectSide::DownLeft));
        assert_eq!(border_side(0, 3, 6, 4), Some(RectSide::Up));
        assert_eq!(border_side(-2, 1, 4, 4), Some(RectSide::Right));
        assert_eq!(border_side(0, 0, 6, 4), None);
    }

    #[test]
    fn mismatch_types_are_named() {
        let ctx = fixtures::context();
        assert_eq!(
            describe_type(&ctx, DIRT_MUD_ISOM + ISOM_EDGE_NW as u16),
            "00d (terrain 34 edge NW)"
        );
        assert_eq!(
            describe_type(&ctx, fixtures::CLIFF_ISOM + ISOM_EDGE_SE as u16),
            "02b (terrain 20 edge SE)"
        );
        assert_eq!(describe_type(&ctx, 1), "001");
    }

    #[test]
    fn empty_cells_need_consistent_types() {
        let t = |ty: u16| (IsomTile(ty << 4), 0u8);
        assert!(is_empty_cell(&[t(1), t(1), t(0), t(0), t(1), t(1)]));
        assert!(!is_empty_cell(&[t(1), t(1), t(2), t(2)]));
        assert!(!is_empty_cell(&[t(1), t(2)]));

        let mut placed = IsomTile::default();
        placed.set(dir::TOP_LEFT_V, 1);
        assert!(!is_empty_cell(&[(placed, dir::TOP_LEFT_V), t(1)]));
    }

    #[test]
    fn all_blank_payload_is_checked_and_invalid() {
        let ctx = fixtures::context();
        let raster = fixtures::paired_raster(4, 2, G_DIRT);
        let mut grid = TerrainGrid::parse(&ctx, &raster, 4, 2);
        let isom = IsomGrid::for_map(4, 2);

        let result = validate_isom(&mut grid, &ctx, &isom);
        assert!(result.checked > 0);
        assert_eq!(result.valid, 0);
        assert!(!result.is_valid());
        assert_ne!(grid.cells.flags(0, 0) & MISMATCHED, 0);
    }

    #[test]
    fn blank_cells_with_the_resolved_type_are_valid() {
        let ctx = fixtures::context();
        let raster = fixtures::paired_raster(4, 2, G_DIRT);
        let mut grid = TerrainGrid::parse(&ctx, &raster, 4, 2);
        let mut isom = IsomGrid::for_map(4, 2);
        let dirt = IsomTile(1 << 4);
        for rect in isom.rects.iter_mut() {
            *rect = IsomRect {
                left: dirt,
                up: dirt,
                right: dirt,
                down: dirt,
            };
        }

        let result = validate_isom(&mut grid, &ctx, &isom);
        assert!(result.is_valid());
        assert_eq!(grid.cells.flags(0, 0) & MISMATCHED, 0);
    }

    #[test]
    fn border_cells_accept_transitions_showing_only_basic_tiles() {
        let ctx = fixtures::context();
        let raster = fixtures::paired_raster(4, 4, G_DIRT);
        let mut grid = TerrainGrid::parse(&ctx, &raster, 4, 4);
        grid.detect_domain(&ctx);
        let generated = generate_isom(&grid, IsomGrid::for_map(4, 4)).unwrap();

        // Only the bottom right quadrant of the corner cell is on the map
        let mut isom = generated.clone();
        set_isom_cell(&mut isom, -2, -1, 4, 4, DIRT_MUD_ISOM + ISOM_EDGE_SE as u16);
        let result = validate_isom(&mut grid, &ctx, &isom);
        assert_eq!(result.valid, result.checked);

        let mut isom = generated;
        set_isom_cell(&mut isom, -2, -1, 4, 4, DIRT_MUD_ISOM + ISOM_EDGE_NW as u16);
        let result = validate_isom(&mut grid, &ctx, &isom);
        assert_eq!(result.valid + 1, result.checked);
        assert_ne!(grid.cells.flags(0, 0) & MISMATCHED, 0);
    }
}
