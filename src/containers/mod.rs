pub mod chk;

use crate::isom::IsomGrid;
use crate::tileset::TilesetId;

/// Typed access to the map sections the ISOM engine reads and writes.
///
/// Implementations validate section sizes against the map dimensions; anything returned here
/// is already the right shape.
pub trait SectionStore {
    fn tileset(&self) -> TilesetId;
    /// Width and height in tiles
    fn dimensions(&self) -> (usize, usize);
    /// Raster as the game draws it
    fn mtxm_tiles(&self) -> Option<Vec<u16>>;
    /// Raster as the editor placed it
    fn tile_tiles(&self) -> Option<Vec<u16>>;
    /// Stored ISOM payload, `None` when absent or all zero
    fn stored_isom(&self) -> Option<IsomGrid>;
    fn set_isom(&mut self, isom: &IsomGrid);

    /// MTXM when present, TILE otherwise
    fn raster_tiles(&self) -> Option<Vec<u16>> {
        self.mtxm_tiles().or_else(|| self.tile_tiles())
    }

    fn has_isom_data(&self) -> bool {
        self.stored_isom().is_some()
    }

    fn has_raster_data(&self) -> bool {
        self.mtxm_tiles().is_some() || self.tile_tiles().is_some()
    }
}
