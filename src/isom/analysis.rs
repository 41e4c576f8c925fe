//! # Terrain Analysis
//!
//! Ties the ISOM components together for one map. A [`TilesetContext`] holds everything derived
//! from a tileset and can be shared by any number of maps; a [`TerrainAnalysis`] holds the
//! per-map working grids between the initial check and a later regeneration.

use image::Rgba;
use serde::Serialize;

use super::generate::generate_isom;
use super::grid::{Domain, TerrainGrid};
use super::shading::shading_for;
use super::type_tables::TypeTables;
use super::validate::{validate_isom, ValidationResult};
use super::IsomGrid;
use crate::containers::SectionStore;
use crate::error::IsomError;
use crate::tileset::Tileset;

/// A loaded tileset and the lookup tables derived from it
pub struct TilesetContext {
    pub tileset: Tileset,
    pub tables: TypeTables,
}

impl TilesetContext {
    pub fn new(tileset: Tileset) -> Self {
        let tables = TypeTables::build(&tileset);
        TilesetContext { tileset, tables }
    }
}

/// Outcome of checking a map's stored ISOM data
#[derive(Clone, Debug, Serialize)]
pub struct IsomStatus {
    /// Human readable summary
    pub summary: String,
    pub valid: bool,
    /// Whether TILE and MTXM agree, `None` unless both are present
    pub tile_matches: Option<bool>,
    pub has_isom: bool,
    pub cells: ValidationResult,
    /// Grid domain, reported only when the stored data is not valid
    pub domain: Option<Domain>,
}

struct MapState {
    raster: Vec<u16>,
    grid: TerrainGrid,
}

pub struct TerrainAnalysis<'a> {
    ctx: &'a TilesetContext,
    state: Option<MapState>,
}

impl<'a> TerrainAnalysis<'a> {
    pub fn new(ctx: &'a TilesetContext) -> Self {
        TerrainAnalysis { ctx, state: None }
    }

    /// Analyse the map held by `store` and check its ISOM data against the tiles
    pub fn init_isom_data(&mut self, store: &dyn SectionStore) -> Result<IsomStatus, IsomError> {
        let ctx = self.ctx;
        if store.tileset() != ctx.tileset.id {
            return Err(IsomError::TilesetMismatch {
                map: store.tileset(),
                loaded: ctx.tileset.id,
            });
        }

        let (width, height) = store.dimensions();
        let raster = store
            .raster_tiles()
            .ok_or_else(|| IsomError::InvalidMap("no MTXM or TILE data".to_string()))?;
        if raster.len() != width * height {
            return Err(IsomError::InvalidMap(format!(
                "raster has {} tiles, expected {}x{}",
                raster.len(),
                width,
                height
            )));
        }

        let mut grid = TerrainGrid::parse(ctx, &raster, width, height);
        let mut summary = String::from("File loaded successfully!");

        let tile_matches = match (store.mtxm_tiles(), store.tile_tiles()) {
            (Some(_), Some(tile)) => Some(grid.matches_raster(ctx, &tile)),
            _ => None,
        };
        match tile_matches {
            Some(true) => summary.push_str(" -- TILE and MTXM match"),
            Some(false) => summary.push_str(" -- TILE and MTXM mismatch"),
            None => {}
        }

        let stored = store.stored_isom();
        let mut cells = ValidationResult::default();
        let valid = match &stored {
            Some(isom) => {
                cells = validate_isom(&mut grid, ctx, isom);
                if cells.checked != 0 {
                    summary.push_str(&format!(
                        " -- {} of {} cells match -- Map ISOM data {}",
                        cells.valid,
                        cells.checked,
                        if cells.is_valid() { "valid!" } else { "invalid" }
                    ));
                } else {
                    summary.push_str(" -- Map ISOM data invalid");
                }
                cells.is_valid()
            }
            None => {
                summary.push_str(" -- No ISOM data found");
                false
            }
        };

        let detected = grid.detect_domain(ctx);
        let domain = if valid { None } else { Some(detected) };
        if let Some(d @ Domain::Single { .. }) = domain {
            summary.push_str(" -- Single grid domain");
            if d.is_storable() {
                summary.push_str(" (valid ISOM)");
            } else {
                summary.push_str(" (horizontal misalignment)");
            }
        }

        log::info!("{}", summary);
        self.state = Some(MapState { raster, grid });
        Ok(IsomStatus {
            summary,
            valid,
            tile_matches,
            has_isom: stored.is_some(),
            cells,
            domain,
        })
    }

    /// Regenerate the map's ISOM data and write it back into `store`
    pub fn generate_isom_data(&mut self, store: &mut dyn SectionStore) -> Result<IsomGrid, IsomError> {
        let state = self.state.as_ref().ok_or(IsomError::NotInitialised)?;
        let (width, height) = (state.grid.width, state.grid.height);
        let base = store
            .stored_isom()
            .unwrap_or_else(|| IsomGrid::for_map(width, height));
        let isom = generate_isom(&state.grid, base)?;
        store.set_isom(&isom);
        Ok(isom)
    }

    /// Raster tile at (x, y) and the overlay shading describing how it fits the ISOM layout
    pub fn tile_at(&self, x: usize, y: usize) -> Option<(u16, Option<Rgba<u8>>)> {
        let state = self.state.as_ref()?;
        if x >= state.grid.width || y >= state.grid.height {
            return None;
        }
        let tile = state.raster[y * state.grid.width + x];
        let flags = state.grid.cells.flags(x as i32, y as i32);
        Some((tile, shading_for(flags)))
    }

    /// Resolved ISOM type of the intersection at (x, y), 0 before initialisation
    pub fn isom_type_at(&self, x: i32, y: i32) -> u16 {
        self.state
            .as_ref()
            .map_or(0, |s| s.grid.isom_type_at(self.ctx, x, y))
    }

    pub fn domain(&self) -> Option<Domain> {
        self.state.as_ref().map(|s| s.grid.domain)
    }

    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.state.as_ref().map(|s| (s.grid.width, s.grid.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isom::fixtures::{self, tile, G_DIRT, G_MUD};
    use crate::isom::shading::SHADING_INVALID;
    use crate::tileset::TilesetId;

    struct MemoryStore {
        tileset: TilesetId,
        width: usize,
        height: usize,
        mtxm: Option<Vec<u16>>,
        tile: Option<Vec<u16>>,
        isom: Option<IsomGrid>,
    }

    impl MemoryStore {
        fn dirt(width: usize, height: usize) -> Self {
            MemoryStore {
                tileset: TilesetId::Badlands,
                width,
                height,
                mtxm: Some(fixtures::paired_raster(width, height, G_DIRT)),
                tile: None,
                isom: None,
            }
        }
    }

    impl SectionStore for MemoryStore {
        fn tileset(&self) -> TilesetId {
            self.tileset
        }
        fn dimensions(&self) -> (usize, usize) {
            (self.width, self.height)
        }
        fn mtxm_tiles(&self) -> Option<Vec<u16>> {
            self.mtxm.clone()
        }
        fn tile_tiles(&self) -> Option<Vec<u16>> {
            self.tile.clone()
        }
        fn stored_isom(&self) -> Option<IsomGrid> {
            self.isom.clone()
        }
        fn set_isom(&mut self, isom: &IsomGrid) {
            self.isom = Some(isom.clone());
        }
    }

    #[test]
    fn map_without_isom_reports_its_domain() {
        let ctx = fixtures::context();
        let store = MemoryStore::dirt(4, 4);
        let mut analysis = TerrainAnalysis::new(&ctx);
        let status = analysis.init_isom_data(&store).unwrap();

        assert!(!status.valid);
        assert!(!status.has_isom);
        assert_eq!(
            status.summary,
            "File loaded successfully! -- No ISOM data found -- Single grid domain (valid ISOM)"
        );
        assert!(matches!(status.domain, Some(Domain::Single { grid: 0, .. })));
    }

    #[test]
    fn generate_then_check_is_valid() {
        let ctx = fixtures::context();
        let mut store = MemoryStore::dirt(4, 4);
        let mut analysis = TerrainAnalysis::new(&ctx);
        analysis.init_isom_data(&store).unwrap();
        analysis.generate_isom_data(&mut store).unwrap();

        let status = analysis.init_isom_data(&store).unwrap();
        assert!(status.valid);
        assert_eq!(status.cells.checked, 8);
        assert_eq!(status.domain, None);
        assert_eq!(
            status.summary,
            "File loaded successfully! -- 8 of 8 cells match -- Map ISOM data valid!"
        );
    }

    #[test]
    fn tile_and_mtxm_are_compared() {
        let ctx = fixtures::context();
        let mut store = MemoryStore::dirt(2, 2);
        store.tile = store.mtxm.clone();
        let status = TerrainAnalysis::new(&ctx).init_isom_data(&store).unwrap();
        assert_eq!(status.tile_matches, Some(true));
        assert!(status.summary.contains(" -- TILE and MTXM match"));

        store.tile = Some(vec![tile(G_MUD, 0); 4]);
        let status = TerrainAnalysis::new(&ctx).init_isom_data(&store).unwrap();
        assert!(status.summary.contains(" -- TILE and MTXM mismatch"));
    }

    #[test]
    fn wrong_tileset_is_an_error() {
        let ctx = fixtures::context();
        let mut store = MemoryStore::dirt(2, 2);
        store.tileset = TilesetId::Ice;
        let err = TerrainAnalysis::new(&ctx).init_isom_data(&store).unwrap_err();
        assert!(matches!(err, IsomError::TilesetMismatch { .. }));
    }

    #[test]
    fn generate_requires_init() {
        let ctx = fixtures::context();
        let mut store = MemoryStore::dirt(2, 2);
        let err = TerrainAnalysis::new(&ctx)
            .generate_isom_data(&mut store)
            .unwrap_err();
        assert!(matches!(err, IsomError::NotInitialised));
        assert!(store.isom.is_none());
    }

    #[test]
    fn tile_shading() {
        let ctx = fixtures::context();
        let mut store = MemoryStore::dirt(2, 2);
        let mut analysis = TerrainAnalysis::new(&ctx);
        assert_eq!(analysis.tile_at(0, 0), None);
        analysis.init_isom_data(&store).unwrap();

        let (t, shade) = analysis.tile_at(1, 1).unwrap();
        assert_eq!(t, tile(G_DIRT + 1, 0));
        assert_eq!(shade, Some(Rgba([0, 255, 0, 32])));
        assert_eq!(analysis.tile_at(2, 0), None);
        assert_eq!(analysis.isom_type_at(0, 0), 1);

        if let Some(mtxm) = store.mtxm.as_mut() {
            mtxm[3] = 0;
        }
        analysis.init_isom_data(&store).unwrap();
        assert_eq!(analysis.tile_at(1, 1), Some((0, Some(SHADING_INVALID))));
    }
}
