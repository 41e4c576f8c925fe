//! StarCraft terrain ISOM validation and regeneration.
//!
//! Reads a scenario's tile raster, infers the isometric terrain layout it was painted with,
//! checks the stored ISOM section against it and rebuilds that section when needed.

pub mod binary_utils;
pub mod config;
pub mod containers;
pub mod error;
pub mod isom;
pub mod render;
pub mod report;
pub mod tileset;

pub use error::IsomError;
