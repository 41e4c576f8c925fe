//! # Tileset Assets
//!
//! Loads the per-tileset tables the ISOM engine needs: the CV5 group descriptors and the doodad
//! placement table. Palettes and pixel data are not needed for terrain analysis.

pub mod cv5;
pub mod dddata;

use std::{fmt, fs, io, path::Path};

use serde::Serialize;

use cv5::Cv5;
use dddata::DdData;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TilesetId {
    Badlands = 0,
    Platform = 1,
    Install = 2,
    Ashworld = 3,
    Jungle = 4,
    Desert = 5,
    Ice = 6,
    Twilight = 7,
}

impl TilesetId {
    pub const ALL: [TilesetId; 8] = [
        TilesetId::Badlands,
        TilesetId::Platform,
        TilesetId::Install,
        TilesetId::Ashworld,
        TilesetId::Jungle,
        TilesetId::Desert,
        TilesetId::Ice,
        TilesetId::Twilight,
    ];

    /// Map era values only use the low 3 bits
    pub fn from_era(era: u16) -> Self {
        Self::ALL[(era & 7) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            TilesetId::Badlands => "badlands",
            TilesetId::Platform => "platform",
            TilesetId::Install => "install",
            TilesetId::Ashworld => "ashworld",
            TilesetId::Jungle => "jungle",
            TilesetId::Desert => "desert",
            TilesetId::Ice => "ice",
            TilesetId::Twilight => "twilight",
        }
    }
}

impl fmt::Display for TilesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub struct Tileset {
    pub id: TilesetId,
    pub cv5: Cv5,
    pub dddata: DdData,
    doodad_rows: Vec<u16>,
}

impl Tileset {
    pub fn new(id: TilesetId, cv5: Cv5, dddata: DdData) -> Self {
        let doodad_rows = cv5.doodad_rows();
        Tileset {
            id,
            cv5,
            dddata,
            doodad_rows,
        }
    }

    /// Load `tileset/<name>.cv5` and `tileset/<name>/dddata.bin` below `root`
    pub fn load(root: &Path, id: TilesetId) -> Result<Self, io::Error> {
        let cv5_path = root.join("tileset").join(format!("{}.cv5", id.name()));
        let dd_path = root.join("tileset").join(id.name()).join("dddata.bin");

        let cv5_data = fs::read(&cv5_path).map_err(|e| {
            io::Error::new(e.kind(), format!("{}: {}", cv5_path.display(), e))
        })?;
        let dd_data = fs::read(&dd_path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", dd_path.display(), e)))?;

        let cv5 = Cv5::from_bytes(&cv5_data)?;
        let dddata = DdData::from_bytes(&dd_data)?;
        log::info!("Loaded tileset {} ({} CV5 groups)", id, cv5.len());

        Ok(Tileset::new(id, cv5, dddata))
    }

    /// Row of a doodad group within its doodad
    pub fn doodad_row(&self, group: u16) -> u16 {
        self.doodad_rows.get(group as usize).copied().unwrap_or(0)
    }
}
