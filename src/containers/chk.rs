//! # CHK Scenario Container
//!
//! A CHK file is a flat list of sections, each an 8-byte header (4-byte name, u32 LE size)
//! followed by its data. Only the sections the ISOM engine needs are interpreted; everything
//! else is carried through untouched.
//!
//! Sections are referenced by offset into the owned buffer, so appending a section never
//! invalidates the others.

use std::io::{self, Cursor};

use super::SectionStore;
use crate::binary_utils::{read_bytes, read_u32_le, u16_slice_from_le};
use crate::isom::{IsomGrid, MAX_MAP_DIM};
use crate::tileset::TilesetId;

pub const SECTION_HEADER_LEN: usize = 8;

pub mod section {
    pub const ERA: [u8; 4] = *b"ERA ";
    pub const DIM: [u8; 4] = *b"DIM ";
    pub const MTXM: [u8; 4] = *b"MTXM";
    pub const TILE: [u8; 4] = *b"TILE";
    pub const ISOM: [u8; 4] = *b"ISOM";
}

/// Location of a section's data in the buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SectionRef {
    offset: usize,
    size: usize,
}

/// Append a complete section (header and data) to a CHK buffer
pub fn write_section(out: &mut Vec<u8>, name: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(name);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
}

pub struct Chk {
    data: Vec<u8>,
    era: u16,
    width: usize,
    height: usize,
    mtxm: Option<SectionRef>,
    tile: Option<SectionRef>,
    isom: Option<SectionRef>,
}

fn name_str(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

impl Chk {
    pub fn from_bytes(data: &[u8]) -> Result<Self, io::Error> {
        let mut sections = Vec::new();
        let mut cursor = Cursor::new(data);
        while (cursor.position() as usize) + SECTION_HEADER_LEN <= data.len() {
            let name = read_bytes(&mut cursor, 4)?;
            let size = read_u32_le(&mut cursor)? as usize;
            let offset = cursor.position() as usize;
            if offset + size > data.len() {
                log::warn!(
                    "Section {} at 0x{:x} overruns the file ({} bytes), ignored",
                    name_str(&name),
                    offset - SECTION_HEADER_LEN,
                    size
                );
                break;
            }
            sections.push((name, SectionRef { offset, size }));
            cursor.set_position((offset + size) as u64);
        }

        let find_last = |wanted: &[u8; 4], valid: &dyn Fn(SectionRef) -> bool| {
            let mut found = None;
            for (name, r) in sections.iter().filter(|(n, _)| n.as_slice() == wanted) {
                if !valid(*r) {
                    log::warn!("Ignoring {} section of size {}", name_str(name), r.size);
                    continue;
                }
                if found.is_some() {
                    log::warn!("Duplicate {} section, using the later one", name_str(wanted));
                }
                found = Some(*r);
            }
            found
        };
        let word =
            |r: SectionRef, at: usize| u16::from_le_bytes([data[r.offset + at], data[r.offset + at + 1]]);

        let era = find_last(&section::ERA, &|r: SectionRef| r.size == 2)
            .map(|r| word(r, 0))
            .ok_or_else(|| invalid("Missing ERA section".to_string()))?;
        let dim = find_last(&section::DIM, &|r: SectionRef| r.size == 4)
            .ok_or_else(|| invalid("Missing DIM section".to_string()))?;
        let (width, height) = (word(dim, 0) as usize, word(dim, 2) as usize);
        if !(1..=MAX_MAP_DIM).contains(&width) || !(1..=MAX_MAP_DIM).contains(&height) {
            return Err(invalid(format!("Invalid map dimensions {}x{}", width, height)));
        }

        let raster_len = width * height * 2;
        let mtxm = find_last(&section::MTXM, &|r: SectionRef| r.size == raster_len);
        let tile = find_last(&section::TILE, &|r: SectionRef| r.size == raster_len);
        if mtxm.is_none() && tile.is_none() {
            return Err(invalid("No valid MTXM or TILE section".to_string()));
        }
        let isom_len = IsomGrid::byte_len(width, height);
        let isom = find_last(&section::ISOM, &|r: SectionRef| r.size == isom_len);

        log::debug!(
            "CHK: {} sections, {}x{}, tileset {}",
            sections.len(),
            width,
            height,
            TilesetId::from_era(era)
        );

        Ok(Chk {
            data: data.to_vec(),
            era,
            width,
            height,
            mtxm,
            tile,
            isom,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn section_data(&self, r: SectionRef) -> &[u8] {
        &self.data[r.offset..r.offset + r.size]
    }

    /// Overwrite a section of the same size in place, or append a new one
    fn put_section(
        &mut self,
        existing: Option<SectionRef>,
        name: &[u8; 4],
        bytes: &[u8],
    ) -> SectionRef {
        if let Some(r) = existing.filter(|r| r.size == bytes.len()) {
            self.data[r.offset..r.offset + r.size].copy_from_slice(bytes);
            return r;
        }
        let offset = self.data.len() + SECTION_HEADER_LEN;
        write_section(&mut self.data, name, bytes);
        SectionRef {
            offset,
            size: bytes.len(),
        }
    }
}

impl SectionStore for Chk {
    fn tileset(&self) -> TilesetId {
        TilesetId::from_era(self.era)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn mtxm_tiles(&self) -> Option<Vec<u16>> {
        self.mtxm.map(|r| u16_slice_from_le(self.section_data(r)))
    }

    fn tile_tiles(&self) -> Option<Vec<u16>> {
        self.tile.map(|r| u16_slice_from_le(self.section_data(r)))
    }

    fn stored_isom(&self) -> Option<IsomGrid> {
        let r = self.isom?;
        let bytes = self.section_data(r);
        if bytes.iter().all(|&b| b == 0) {
            return None;
        }
        IsomGrid::from_bytes(self.width, self.height, bytes).ok()
    }

    fn set_isom(&mut self, isom: &IsomGrid) {
        let bytes = isom.to_bytes();
        self.isom = Some(self.put_section(self.isom, &section::ISOM, &bytes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary_utils::{u16_slice_to_le, write_u32};
    use crate::isom::IsomTile;

    fn map_bytes(width: u16, height: u16, extra: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut out = Vec::new();
        write_section(&mut out, &section::ERA, &4u16.to_le_bytes());
        let mut dim = width.to_le_bytes().to_vec();
        dim.extend_from_slice(&height.to_le_bytes());
        write_section(&mut out, &section::DIM, &dim);
        for (name, data) in extra {
            write_section(&mut out, name, data);
        }
        out
    }

    fn raster(width: u16, height: u16, tile: u16) -> Vec<u8> {
        u16_slice_to_le(&vec![tile; width as usize * height as usize])
    }

    #[test]
    fn reads_header_sections() {
        let bytes = map_bytes(4, 2, &[(&section::MTXM, raster(4, 2, 0x20))]);
        let chk = Chk::from_bytes(&bytes).unwrap();
        assert_eq!(chk.tileset(), TilesetId::Jungle);
        assert_eq!(chk.dimensions(), (4, 2));
        assert_eq!(chk.raster_tiles().unwrap(), vec![0x20; 8]);
        assert!(chk.tile_tiles().is_none());
        assert!(!chk.has_isom_data());
    }

    #[test]
    fn tile_is_the_raster_fallback() {
        let bytes = map_bytes(2, 2, &[(&section::TILE, raster(2, 2, 0x31))]);
        let chk = Chk::from_bytes(&bytes).unwrap();
        assert!(chk.has_raster_data());
        assert_eq!(chk.raster_tiles().unwrap(), vec![0x31; 4]);
    }

    #[test]
    fn later_duplicates_win_and_bad_sizes_are_skipped() {
        let bytes = map_bytes(
            2,
            2,
            &[
                (&section::MTXM, raster(2, 2, 1)),
                (&section::MTXM, raster(2, 2, 2)),
                (&section::MTXM, vec![0; 3]),
            ],
        );
        let chk = Chk::from_bytes(&bytes).unwrap();
        assert_eq!(chk.mtxm_tiles().unwrap(), vec![2; 4]);
    }

    #[test]
    fn rejects_missing_or_bad_headers() {
        let mut no_dim = Vec::new();
        write_section(&mut no_dim, &section::ERA, &[0, 0]);
        assert!(Chk::from_bytes(&no_dim).is_err());

        assert!(Chk::from_bytes(&map_bytes(0, 4, &[])).is_err());
        assert!(Chk::from_bytes(&map_bytes(257, 4, &[])).is_err());
        // No raster
        assert!(Chk::from_bytes(&map_bytes(2, 2, &[])).is_err());
    }

    #[test]
    fn all_zero_isom_counts_as_absent() {
        let isom_len = IsomGrid::byte_len(2, 2);
        let bytes = map_bytes(
            2,
            2,
            &[
                (&section::MTXM, raster(2, 2, 0x20)),
                (&section::ISOM, vec![0; isom_len]),
            ],
        );
        let chk = Chk::from_bytes(&bytes).unwrap();
        assert!(chk.isom.is_some());
        assert!(!chk.has_isom_data());
    }

    #[test]
    fn set_isom_overwrites_in_place() {
        let isom_len = IsomGrid::byte_len(2, 2);
        let bytes = map_bytes(
            2,
            2,
            &[
                (&section::ISOM, vec![0; isom_len]),
                (&section::MTXM, raster(2, 2, 0x20)),
            ],
        );
        let mut chk = Chk::from_bytes(&bytes).unwrap();
        let mut isom = IsomGrid::for_map(2, 2);
        isom.rects[0].right = IsomTile(0x10);
        chk.set_isom(&isom);

        let out = chk.to_bytes();
        assert_eq!(out.len(), bytes.len());
        assert_eq!(chk.stored_isom().unwrap(), isom);
        // MTXM after it is untouched
        assert_eq!(chk.mtxm_tiles().unwrap(), vec![0x20; 4]);
    }

    #[test]
    fn set_isom_appends_when_missing() {
        let bytes = map_bytes(2, 2, &[(&section::MTXM, raster(2, 2, 0x20))]);
        let mut chk = Chk::from_bytes(&bytes).unwrap();
        let mut isom = IsomGrid::for_map(2, 2);
        isom.rects[1].up = IsomTile(0x21);
        chk.set_isom(&isom);

        let out = chk.to_bytes();
        assert_eq!(
            out.len(),
            bytes.len() + SECTION_HEADER_LEN + IsomGrid::byte_len(2, 2)
        );
        let reread = Chk::from_bytes(&out).unwrap();
        assert_eq!(reread.stored_isom().unwrap(), isom);
    }

    #[test]
    fn overrunning_section_is_ignored() {
        let mut bytes = map_bytes(2, 2, &[(&section::MTXM, raster(2, 2, 0x20))]);
        let header = bytes.len();
        write_section(&mut bytes, &section::ISOM, &[1, 2]);
        write_u32(&mut bytes, 1000, header + 4);

        let chk = Chk::from_bytes(&bytes).unwrap();
        assert!(chk.isom.is_none());
        assert_eq!(chk.mtxm_tiles().unwrap(), vec![0x20; 4]);
    }
}
