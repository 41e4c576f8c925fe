//! # Overlay Rendering
//!
//! Draws each map tile as a flat block coloured by its CV5 group and tinted with the ISOM
//! shading for that tile, so grid alignment and mismatched areas can be seen at a glance.

use std::{fs, path::Path};

use image::{Rgba, RgbaImage};
use oxipng::{InFile, OutFile};

use crate::config::ToolConfig;
use crate::error::IsomError;
use crate::isom::shading::apply;
use crate::isom::TerrainAnalysis;

/// Base colour of a raster tile before shading
fn tile_colour(tile: u16) -> Rgba<u8> {
    if tile == 0 {
        return Rgba([0, 0, 0, 255]);
    }
    let group = (tile >> 4) as u32;
    let channel = |mul: u32| (64 + (group * mul) % 160) as u8;
    Rgba([channel(37), channel(73), channel(151), 255])
}

/// Render the overlay for an initialised analysis, `None` before initialisation
pub fn render_overlay(analysis: &TerrainAnalysis, scale: u32) -> Option<RgbaImage> {
    let (width, height) = analysis.dimensions()?;
    let scale = scale.max(1);
    let mut image = RgbaImage::new(width as u32 * scale, height as u32 * scale);

    for y in 0..height {
        for x in 0..width {
            let (tile, shade) = analysis.tile_at(x, y)?;
            let base = tile_colour(tile);
            let pixel = shade.map_or(base, |s| apply(base, s));
            for py in 0..scale {
                for px in 0..scale {
                    image.put_pixel(x as u32 * scale + px, y as u32 * scale + py, pixel);
                }
            }
        }
    }
    Some(image)
}

/// Save a PNG, optimising it with oxipng when enabled
pub fn save_png(image: &RgbaImage, path: &Path, config: &ToolConfig) -> Result<(), IsomError> {
    let temp_path = path.with_extension("temp.png");
    image.save(&temp_path)?;

    if config.optimise_png {
        let mut options = oxipng::Options::from_preset(2);
        options.bit_depth_reduction = true;

        match oxipng::optimize(
            &InFile::Path(temp_path.clone()),
            &OutFile::Path(Some(path.to_path_buf())),
            &options,
        ) {
            Ok(()) => {
                if let Err(e) = fs::remove_file(&temp_path) {
                    log::warn!("Failed to remove temporary file: {}", e);
                }
                return Ok(());
            }
            Err(e) => log::warn!("PNG optimisation failed, keeping unoptimised file: {}", e),
        }
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        log::warn!("Failed to rename file: {}", e);
        fs::copy(&temp_path, path)?;
        let _ = fs::remove_file(&temp_path);
    }
    Ok(())
}

pub fn write_overlay(
    analysis: &TerrainAnalysis,
    path: &Path,
    config: &ToolConfig,
) -> Result<(), IsomError> {
    let image = render_overlay(analysis, config.overlay_scale).ok_or(IsomError::NotInitialised)?;
    save_png(&image, path, config)?;
    log::info!(
        "Wrote {}x{} overlay to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}
