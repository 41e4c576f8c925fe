//! # Tile Classification
//!
//! Resolves a raw map tile code (`group << 4 | variant`) to the CV5 group whose edges describe it.
//! Doodad tiles point into a doodad's placement table instead of carrying edges themselves.

use super::analysis::TilesetContext;
use super::type_tables::{group_kind, TerrainType};
use crate::tileset::cv5::Edges;

impl TilesetContext {
    /// CV5 group describing a tile, 0 when it cannot be resolved
    pub fn classify(&self, tile: u16) -> u16 {
        let group = tile >> 4;
        let variant = (tile & 0xF) as usize;
        let Some(cv5) = self.tileset.cv5.get(group) else {
            return 0;
        };
        if group == 0 || (variant != 0 && cv5.tiles[variant] == 0) {
            return 0;
        }
        if !cv5.is_doodad() {
            return group;
        }

        let width = cv5.doodad.width as usize;
        if variant >= width {
            return 0;
        }
        let row = self.tileset.doodad_row(group) as usize;
        let placed = self
            .tileset
            .dddata
            .get(cv5.doodad.doodad_id, row * width + variant);
        if (placed as usize) < self.tileset.cv5.len() {
            placed
        } else {
            0
        }
    }

    /// Terrain id of a group, 0 for unknown groups
    pub fn terrain_of(&self, group: u16) -> u16 {
        self.tileset.cv5.get(group).map(|g| g.id).unwrap_or(0)
    }

    pub fn edges_of(&self, group: u16) -> Edges {
        if group == 0 {
            return Edges::default();
        }
        self.tileset
            .cv5
            .get(group)
            .map(|g| g.edges)
            .unwrap_or_default()
    }

    pub fn terrain_type_of(&self, group: u16) -> &TerrainType {
        self.tables.terrain(self.terrain_of(group))
    }

    pub fn is_basic_group(&self, group: u16) -> bool {
        (group as usize) < self.tileset.cv5.len()
            && self.terrain_type_of(group).group_kind == group_kind::BASIC
    }

    /// Whether a tile's variant slot is populated
    pub fn has_variant(&self, tile: u16) -> bool {
        let variant = (tile & 0xF) as usize;
        variant == 0
            || self
                .tileset
                .cv5
                .get(tile >> 4)
                .map_or(false, |g| g.tiles[variant] != 0)
    }
}
