//! # Check Reports
//!
//! JSON summary of a map check, including an xxHash64 fingerprint of the stored ISOM payload so
//! repeated generations can be compared without diffing the files. The tileset's terrain tables
//! are listed alongside, since a wrong edge or stack range there explains most mismatches.

use std::{fs, hash::Hasher, path::Path};

use serde::Serialize;
use twox_hash::XxHash64;

use crate::containers::SectionStore;
use crate::error::IsomError;
use crate::isom::type_tables::{StackCliffRange, TerrainType, TypeTables};
use crate::isom::{Domain, IsomStatus};

/// One terrain id the tileset maps to an ISOM type
#[derive(Debug, Clone, Serialize)]
pub struct TerrainEntry {
    pub id: u16,
    #[serde(flatten)]
    pub terrain: TerrainType,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub map: String,
    pub tileset: String,
    pub width: usize,
    pub height: usize,
    pub tile_matches: Option<bool>,
    pub has_isom: bool,
    pub cells_checked: u32,
    pub cells_valid: u32,
    pub valid: bool,
    pub domain: Option<String>,
    pub status: String,
    /// Hex xxHash64 of the ISOM section, absent when the map has none
    pub isom_fingerprint: Option<String>,
    pub terrain: Vec<TerrainEntry>,
    pub stacked_cliffs: Vec<StackCliffRange>,
}

impl CheckReport {
    pub fn new(
        map: &Path,
        store: &dyn SectionStore,
        status: &IsomStatus,
        tables: &TypeTables,
    ) -> Self {
        let (width, height) = store.dimensions();
        CheckReport {
            map: map.display().to_string(),
            tileset: store.tileset().name().to_string(),
            width,
            height,
            tile_matches: status.tile_matches,
            has_isom: status.has_isom,
            cells_checked: status.cells.checked,
            cells_valid: status.cells.valid,
            valid: status.valid,
            domain: status.domain.map(describe_domain),
            status: status.summary.clone(),
            isom_fingerprint: store
                .stored_isom()
                .map(|isom| format!("{:016x}", fingerprint(&isom.to_bytes()))),
            terrain: terrain_entries(tables),
            stacked_cliffs: tables.stack_ranges().to_vec(),
        }
    }
}

pub fn terrain_entries(tables: &TypeTables) -> Vec<TerrainEntry> {
    tables
        .terrain_types()
        .map(|(id, t)| TerrainEntry { id, terrain: *t })
        .collect()
}

pub fn describe_domain(domain: Domain) -> String {
    match domain {
        Domain::Unresolved => "mixed grid alignment".to_string(),
        Domain::Single { grid, .. } if domain.is_storable() => format!("grid class {}", grid),
        Domain::Single { grid, .. } => format!("grid class {} (horizontal misalignment)", grid),
    }
}

/// 64-bit hash of a byte buffer
pub fn fingerprint(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::default();
    hasher.write(data);
    hasher.finish()
}

pub fn write_report(report: &CheckReport, path: &Path) -> Result<(), IsomError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    log::info!("Wrote report to {}", path.display());
    Ok(())
}
