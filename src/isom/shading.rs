//! Overlay colours describing how each tile fits the ISOM layout. Purely advisory.

use image::Rgba;

use super::tile_flags::*;

pub const SHADING_MISMATCHED: Rgba<u8> = Rgba([255, 128, 0, 64]);
pub const SHADING_MISALIGNED: Rgba<u8> = Rgba([255, 0, 0, 64]);
pub const SHADING_INVALID: Rgba<u8> = Rgba([0, 0, 0, 128]);

/// Alpha-over of `top` onto `bottom`, both with straight alpha
pub fn blend(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let (a1, a2) = (bottom[3] as u32, top[3] as u32);
    let alpha = a1 * (255 - a2) + a2 * 255;
    if alpha == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel =
        |i: usize| ((bottom[i] as u32 * a1 * (255 - a2) + top[i] as u32 * a2 * 255 + 127) / alpha) as u8;
    Rgba([channel(0), channel(1), channel(2), ((alpha + 127) / 255) as u8])
}

/// Tint a pixel with a shading colour, keeping the pixel's alpha
pub fn apply(pixel: Rgba<u8>, shade: Rgba<u8>) -> Rgba<u8> {
    let a = shade[3] as u32;
    let mix = |i: usize| ((shade[i] as u32 * a + pixel[i] as u32 * (255 - a)) / 255) as u8;
    Rgba([mix(0), mix(1), mix(2), pixel[3]])
}

/// Shading for a tile's domain flags, `None` when it needs none
pub fn shading_for(flags: u16) -> Option<Rgba<u8>> {
    if flags & INVALID_ISOM != 0 {
        return Some(SHADING_INVALID);
    }
    if flags & MISMATCHED != 0 {
        if flags & HORZ_MISALIGN != 0 {
            return Some(blend(SHADING_MISMATCHED, SHADING_MISALIGNED));
        }
        return Some(SHADING_MISMATCHED);
    }
    if flags & HORZ_MISALIGN != 0 {
        return Some(SHADING_MISALIGNED);
    }
    match flags & ISOM_GRID {
        ISOM_GRID_0 => Some(Rgba([0, 255, 0, 32])),
        ISOM_GRID_1 => Some(Rgba([255, 0, 255, 32])),
        ISOM_GRID_2 => Some(Rgba([0, 255, 255, 32])),
        ISOM_GRID_3 => Some(Rgba([0, 0, 255, 32])),
        ISOM_GRID => Some(Rgba([255, 255, 255, 64])),
        _ => None,
    }
}
