//! Crate-wide error type.
//!
//! Format parsers return `io::Result` with `InvalidData`; everything above them
//! converts into [`IsomError`].

use std::io;

use thiserror::Error;

use crate::tileset::TilesetId;

#[derive(Debug, Error)]
pub enum IsomError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid map: {0}")]
    InvalidMap(String),
    #[error("Map uses tileset {map} but {loaded} is loaded")]
    TilesetMismatch { map: TilesetId, loaded: TilesetId },
    #[error("ISOM data has not been initialised for this map")]
    NotInitialised,
    #[error("No single ISOM grid domain found; mixed grid alignment cannot be regenerated")]
    NoSingleDomain,
    #[error("Impossible ISOM grid: domain is horizontally misaligned (grid class {0})")]
    ImpossibleGrid(u8),
}
