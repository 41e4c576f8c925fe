//! # ISOM Generation
//!
//! Writes the resolved type of every intersection in the map's grid domain into an ISOM
//! payload. Half-edges outside the payload or never owned by a domain intersection keep whatever
//! the starting payload held.

use super::grid::{Domain, TerrainGrid};
use super::{cell_half_edges, IsomGrid};
use crate::error::IsomError;

/// Stamp the 8 half-edges of intersection (x, y) with its direction codes and `isom_type`
pub fn set_isom_cell(isom: &mut IsomGrid, x: i32, y: i32, width: i32, height: i32, isom_type: u16) {
    let top = y >= 0;
    let bottom = y < height;
    let left = x >= 0;
    let right = x < width;
    let visible = [top && left, top && right, bottom && left, bottom && right];

    for h in cell_half_edges(x, y, visible) {
        match isom.get_mut(h.col, h.row) {
            Some(rect) => rect.half_mut(h.half).set(h.dir, isom_type),
            None => log::debug!(
                "({:3},{:3}) dropped half-edge at ISOM {},{} outside the payload",
                x,
                y,
                h.col,
                h.row
            ),
        }
    }
}

/// Fill `isom` from the detected grid domain
pub fn generate_isom(grid: &TerrainGrid, mut isom: IsomGrid) -> Result<IsomGrid, IsomError> {
    match grid.domain {
        Domain::Unresolved => return Err(IsomError::NoSingleDomain),
        Domain::Single { grid: class, .. } if class & 1 != 0 => {
            return Err(IsomError::ImpossibleGrid(class))
        }
        Domain::Single { .. } => {}
    }

    let (w, h) = (grid.width as i32, grid.height as i32);
    let mut written = 0;
    for y in -1..h {
        for x in -2..w {
            let Some(cell) = grid.cells.get(x, y) else {
                continue;
            };
            if cell.domain.is_none() {
                continue;
            }
            set_isom_cell(&mut isom, x, y, w, h, cell.isom_type);
            written += 1;
        }
    }
    log::info!("Generated {} ISOM cells", written);
    Ok(isom)
}
