//! # Doodad Placement Data
//!
//! Doodads share one tile-variant table across many visual pieces, so the actual terrain group
//! of a doodad tile is looked up here by (doodad id, row, column).

use std::io;

use crate::binary_utils::u16_slice_from_le;

pub const DDDATA_DOODADS: usize = 512;
pub const DDDATA_SLOTS: usize = 256;
pub const DDDATA_LEN: usize = DDDATA_DOODADS * DDDATA_SLOTS * 2;

pub struct DdData {
    placements: Vec<u16>,
}

impl DdData {
    pub fn from_bytes(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < DDDATA_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("dddata too short: {} < {}", data.len(), DDDATA_LEN),
            ));
        }
        Ok(DdData {
            placements: u16_slice_from_le(&data[..DDDATA_LEN]),
        })
    }

    /// No doodads placed anywhere
    pub fn empty() -> Self {
        DdData {
            placements: vec![0; DDDATA_DOODADS * DDDATA_SLOTS],
        }
    }

    /// Group index placed at a slot of a doodad, 0 if out of range
    pub fn get(&self, doodad_id: u16, slot: usize) -> u16 {
        if doodad_id as usize >= DDDATA_DOODADS || slot >= DDDATA_SLOTS {
            return 0;
        }
        self.placements[doodad_id as usize * DDDATA_SLOTS + slot]
    }

    pub fn set(&mut self, doodad_id: u16, slot: usize, group: u16) {
        if doodad_id as usize >= DDDATA_DOODADS || slot >= DDDATA_SLOTS {
            return;
        }
        self.placements[doodad_id as usize * DDDATA_SLOTS + slot] = group;
    }
}
