//! # Terrain Group Descriptors (CV5)
//!
//! One 52-byte record per terrain group. Groups come in left/right pairs (even/odd index), each
//! holding four boundary edge codes and 16 tile variant slots. Doodad groups reuse the same
//! record layout for placement data instead of edges.

use std::io::{self, Cursor};

use crate::binary_utils::read_u16_le;

pub const CV5_RECORD_LEN: usize = 52;
pub const CV5_VARIANTS: usize = 16;
/// Terrain id shared by every doodad group
pub const CV5_DOODAD_ID: u16 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub left: u16,
    pub up: u16,
    pub right: u16,
    pub down: u16,
}

impl Edges {
    pub fn is_uniform(&self) -> bool {
        self.left == self.up && self.left == self.right && self.left == self.down
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoodadInfo {
    pub overlay_id: u16,
    pub is_remaster: u16,
    pub group_string: u16,
    pub doodad_id: u16,
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cv5Group {
    /// Terrain type id (0 = unused, 1 = doodad)
    pub id: u16,
    pub flags: u16,
    pub edges: Edges,
    pub piece: Edges,
    pub doodad: DoodadInfo,
    pub tiles: [u16; CV5_VARIANTS],
}

impl Cv5Group {
    pub fn is_doodad(&self) -> bool {
        self.id == CV5_DOODAD_ID
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let id = read_u16_le(cursor)?;
        let flags = read_u16_le(cursor)?;

        let mut raw = [0u16; 8];
        for v in raw.iter_mut() {
            *v = read_u16_le(cursor)?;
        }
        let mut tiles = [0u16; CV5_VARIANTS];
        for t in tiles.iter_mut() {
            *t = read_u16_le(cursor)?;
        }

        // The 8 words between flags and tiles are a union: edges + piece for terrain,
        // placement data for doodads. Keep both views.
        Ok(Cv5Group {
            id,
            flags,
            edges: Edges {
                left: raw[0],
                up: raw[1],
                right: raw[2],
                down: raw[3],
            },
            piece: Edges {
                left: raw[4],
                up: raw[5],
                right: raw[6],
                down: raw[7],
            },
            doodad: DoodadInfo {
                overlay_id: raw[0],
                is_remaster: raw[1],
                group_string: raw[2],
                doodad_id: raw[4],
                width: raw[5],
                height: raw[6],
            },
            tiles,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CV5_RECORD_LEN);
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        let raw = if self.is_doodad() {
            [
                self.doodad.overlay_id,
                self.doodad.is_remaster,
                self.doodad.group_string,
                0,
                self.doodad.doodad_id,
                self.doodad.width,
                self.doodad.height,
                0,
            ]
        } else {
            [
                self.edges.left,
                self.edges.up,
                self.edges.right,
                self.edges.down,
                self.piece.left,
                self.piece.up,
                self.piece.right,
                self.piece.down,
            ]
        };
        for v in raw.iter().chain(self.tiles.iter()) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }
}

pub struct Cv5 {
    pub groups: Vec<Cv5Group>,
}

impl Cv5 {
    pub fn from_bytes(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() % CV5_RECORD_LEN != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "CV5 data length {} not divisible by {}",
                    data.len(),
                    CV5_RECORD_LEN
                ),
            ));
        }

        let count = data.len() / CV5_RECORD_LEN;
        // Group index is the upper 12 bits of a tile code
        if count > 0x1000 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("CV5 has {} groups, at most 4096 are addressable", count),
            ));
        }

        let mut cursor = Cursor::new(data);
        let mut groups = Vec::with_capacity(count);
        for _ in 0..count {
            groups.push(Cv5Group::read(&mut cursor)?);
        }
        Ok(Cv5 { groups })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, group: u16) -> Option<&Cv5Group> {
        self.groups.get(group as usize)
    }

    /// For each doodad group, how many contiguous groups of the same doodad precede it.
    /// A doodad spans one CV5 group per row, so this is the row inside the doodad.
    pub fn doodad_rows(&self) -> Vec<u16> {
        let mut rows = vec![0u16; self.groups.len()];
        for i in 1..self.groups.len() {
            let (prev, cur) = (&self.groups[i - 1], &self.groups[i]);
            if cur.is_doodad() && prev.is_doodad() && prev.doodad.doodad_id == cur.doodad.doodad_id
            {
                rows[i] = rows[i - 1] + 1;
            }
        }
        rows
    }
}
