//! # Terrain Type Tables
//!
//! Everything the matcher needs to know about a tileset's terrain that is not stored directly in
//! CV5: which terrain ids are plain terrain versus transitions, the canonical edge codes of each
//! transition, cliff stacking ranges and the ISOM type every terrain id maps to.
//!
//! The tables are derived from CV5 in two passes. The first pass reads edge codes off every
//! group of a terrain id and collects hints about which pattern kinds it can take part in. The
//! second pass groups consecutive runs into transitions, detecting stacked cliffs by an upper
//! edge that does not belong to the run's own terrain.

use std::collections::BTreeMap;

use serde::Serialize;

use super::patterns::{
    IsomPattern, BOT_LEFT, BOT_RIGHT, EDGE_RSV_START, ISOM_PATTERNS, PATTERN_COUNT, TOP_LEFT,
    TOP_RIGHT,
};
use crate::tileset::{Tileset, TilesetId};

/// Terrain ids are 6 bits in practice; everything at or above is rejected
pub const MAX_TERRAIN_TYPES: usize = 48;

pub mod group_kind {
    pub const NONE: u8 = 0;
    pub const BASIC: u8 = 1;
    pub const EDGE: u8 = 2;
    pub const STACK: u8 = 4;
    pub const ANY: u8 = BASIC | EDGE | STACK;
}

/// Hint bits gathered in the first pass
mod selection {
    pub const NORMAL: u8 = 0x1;
    pub const SIMPLE: u8 = 0x2;
    pub const CLIFFS: u8 = 0x4;
    pub const STACK: u8 = 0x8;
    pub const ALL: u8 = NORMAL | SIMPLE | CLIFFS | STACK;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum PatternType {
    #[default]
    Normal = 0,
    /// Transition whose inner corners may border a different basic terrain (edge B)
    Simple = 1,
    /// Transition with unique cliff edge codes
    Cliffs = 2,
    /// Cliff sitting on top of another cliff
    Stack = 3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TerrainType {
    pub group_kind: u8,
    pub pattern_type: PatternType,
    pub edge_a: u16,
    pub edge_b: u16,
    pub edge_c: [u16; 4],
    /// Terrain id of the cliff a stack sits under
    pub cliff_upper: u16,
    /// Group range `[first_group, last_group)` of a stack run
    pub first_group: u16,
    pub last_group: u16,
    pub isom_type: u16,
}

const NO_TERRAIN: TerrainType = TerrainType {
    group_kind: group_kind::NONE,
    pattern_type: PatternType::Normal,
    edge_a: 0,
    edge_b: 0,
    edge_c: [0; 4],
    cliff_upper: 0,
    first_group: 0,
    last_group: 0,
    isom_type: 0,
};

/// A stacked cliff run, for diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StackCliffRange {
    pub terrain: u16,
    pub upper: u16,
    pub first_group: u16,
    pub last_group: u16,
}

/// The part of a 2x4 rectangle left inside the map at a border
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RectSide {
    Left,
    Up,
    Right,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl RectSide {
    pub const ALL: [RectSide; 8] = [
        RectSide::Left,
        RectSide::Up,
        RectSide::Right,
        RectSide::Down,
        RectSide::UpLeft,
        RectSide::UpRight,
        RectSide::DownLeft,
        RectSide::DownRight,
    ];

    /// Quadrants on this side, the ones still inside the map
    pub fn visible_quadrants(self) -> &'static [usize] {
        match self {
            RectSide::Left => &[TOP_LEFT, BOT_LEFT],
            RectSide::Right => &[TOP_RIGHT, BOT_RIGHT],
            RectSide::Up => &[TOP_LEFT, TOP_RIGHT],
            RectSide::Down => &[BOT_LEFT, BOT_RIGHT],
            RectSide::UpLeft => &[TOP_LEFT],
            RectSide::UpRight => &[TOP_RIGHT],
            RectSide::DownLeft => &[BOT_LEFT],
            RectSide::DownRight => &[BOT_RIGHT],
        }
    }
}

/// CV5 terrain id → ISOM type of its plain terrain or first transition subtype
fn cv5_isom_types(tileset: TilesetId) -> &'static [(u16, u16)] {
    const BADLANDS: &[(u16, u16)] = &[
        (2, 1),
        (4, 9),
        (3, 2),
        (5, 3),
        (6, 4),
        (7, 7),
        (18, 8),
        (14, 5),
        (15, 6),
        (22, 0x6F),
        (34, 0x0D),
        (35, 0x1B),
        (20, 0x29),
        (21, 0x45),
        (31, 0x61),
        (27, 0x53),
        (28, 0x37),
    ];
    const PLATFORM: &[(u16, u16)] = &[
        (2, 1),
        (8, 9),
        (9, 10),
        (3, 2),
        (11, 14),
        (4, 11),
        (7, 8),
        (5, 4),
        (6, 12),
        (10, 13),
        (20, 0x18),
        (17, 0x42),
        (18, 0x50),
        (13, 0x88),
        (14, 0x5E),
        (16, 0x34),
        (21, 0x26),
        (15, 0x6C),
        (19, 0x7A),
    ];
    const INSTALL: &[(u16, u16)] = &[
        (2, 1),
        (3, 2),
        (6, 3),
        (4, 4),
        (5, 5),
        (8, 6),
        (7, 7),
        (12, 0x16),
        (13, 0x24),
        (10, 0x32),
        (11, 0x40),
        (14, 0x4E),
        (15, 0x5C),
    ];
    const ASHWORLD: &[(u16, u16)] = &[
        (8, 1),
        (2, 2),
        (3, 3),
        (6, 4),
        (9, 8),
        (4, 5),
        (5, 6),
        (7, 7),
        (17, 0x1B),
        (11, 0x37),
        (13, 0x53),
        (15, 0x6F),
        (16, 0x29),
        (12, 0x45),
        (14, 0x61),
    ];
    // Shared by jungle, desert, ice and twilight
    const JUNGLE: &[(u16, u16)] = &[
        (5, 3),
        (2, 1),
        (4, 13),
        (8, 4),
        (15, 6),
        (11, 7),
        (9, 5),
        (16, 8),
        (3, 2),
        (10, 9),
        (12, 10),
        (13, 11),
        (17, 12),
        (35, 0x1F),
        (22, 0xAB),
        (23, 0x2D),
        (28, 0x3B),
        (25, 0x57),
        (29, 0x49),
        (32, 0x65),
        (34, 0x11),
        (24, 0x73),
        (26, 0x81),
        (30, 0x8F),
        (33, 0x9D),
    ];

    match tileset {
        TilesetId::Badlands => BADLANDS,
        TilesetId::Platform => PLATFORM,
        TilesetId::Install => INSTALL,
        TilesetId::Ashworld => ASHWORLD,
        TilesetId::Jungle | TilesetId::Desert | TilesetId::Ice | TilesetId::Twilight => JUNGLE,
    }
}

pub struct TypeTables {
    pub tileset: TilesetId,
    terrain: Vec<TerrainType>,
    /// Raw edge code → the basic edge code it belongs to
    canonical_edges: Vec<u16>,
    /// Basic edge code → ISOM type of the plain terrain with that edge
    isom_from_edge: Vec<u16>,
    stack_ranges: Vec<StackCliffRange>,
    /// Basic ISOM type → per side, transition types tolerated at a map border
    partial_edges: BTreeMap<u16, [Vec<u16>; 8]>,
}

impl TypeTables {
    pub fn build(tileset: &Tileset) -> Self {
        let mut tables = TypeTables {
            tileset: tileset.id,
            terrain: vec![TerrainType::default(); MAX_TERRAIN_TYPES],
            canonical_edges: vec![0; MAX_TERRAIN_TYPES],
            isom_from_edge: vec![0; MAX_TERRAIN_TYPES],
            stack_ranges: Vec::new(),
            partial_edges: BTreeMap::new(),
        };
        let selection = tables.collect_edges(tileset);
        tables.classify_runs(tileset, &selection);
        tables.build_edge_lookups();
        tables.build_partial_edges();
        log::debug!(
            "Built {} terrain type tables: {} stacked cliff runs",
            tileset.id,
            tables.stack_ranges.len()
        );
        tables
    }

    /// Pass 1: edge codes and pattern hints per terrain id
    fn collect_edges(&mut self, tileset: &Tileset) -> [u8; MAX_TERRAIN_TYPES] {
        let isom_types = cv5_isom_types(tileset.id);
        let groups = &tileset.cv5.groups;
        let mut selection = [0u8; MAX_TERRAIN_TYPES];

        let mut i = 2;
        while i < groups.len() {
            let id = groups[i].id;
            if id <= 1 {
                i += 2;
                continue;
            }
            if id as usize >= MAX_TERRAIN_TYPES {
                log::warn!("Terrain id {} too large at CV5 group {}", id, i);
                i += 2;
                continue;
            }
            let Some(&(_, isom_type)) = isom_types.iter().find(|(cv5, _)| *cv5 == id) else {
                log::warn!("Unrecognized CV5 type {} at group {}", id, i);
                i += 2;
                continue;
            };

            let terrain = &mut self.terrain[id as usize];
            terrain.isom_type = isom_type;

            if groups[i].edges.is_uniform() {
                terrain.group_kind = group_kind::BASIC;
                terrain.edge_a = groups[i].edges.left;
                i += 2;
                continue;
            }

            let mut mask = match selection[id as usize] {
                0 => selection::ALL,
                m => m,
            };
            while i < groups.len() && groups[i].id == id {
                let e = groups[i].edges;
                if e.right == 51 && e.down == 51 {
                    terrain.edge_a = e.left;
                    if e.left != e.up {
                        terrain.edge_c[1] = e.up;
                        mask &= selection::CLIFFS | selection::STACK;
                    }
                }
                if e.left == 51 && e.up == 51 && e.right == e.down {
                    if e.right < EDGE_RSV_START {
                        terrain.edge_b = e.right;
                    } else if e.right == 55 {
                        mask &= !selection::SIMPLE;
                    }
                }
                if e.up == 53 && e.right == 50 {
                    if e.left != e.down {
                        terrain.edge_c[2] = e.left;
                        terrain.edge_c[1] = e.down;
                        mask &= selection::CLIFFS | selection::STACK;
                    } else {
                        mask &= selection::NORMAL | selection::SIMPLE;
                    }
                }
                if e.left == 52 && e.up == 54 {
                    if e.right != e.down {
                        terrain.edge_c[3] = e.right;
                        terrain.edge_c[0] = e.down;
                        mask &= selection::CLIFFS | selection::STACK;
                    } else {
                        mask &= selection::NORMAL | selection::SIMPLE;
                    }
                }
                i += 2;
            }
            selection[id as usize] = mask;
        }
        selection
    }

    /// Pass 2: group runs into edge or stacked cliff transitions
    fn classify_runs(&mut self, tileset: &Tileset, selection: &[u8; MAX_TERRAIN_TYPES]) {
        let groups = &tileset.cv5.groups;
        let up = |g: usize| groups[g].edges.up;

        let mut i = 2;
        while i < groups.len() {
            let id = groups[i].id;
            let known = (id as usize) < MAX_TERRAIN_TYPES && self.terrain[id as usize].isom_type != 0;
            if !known || self.terrain[id as usize].group_kind == group_kind::BASIC {
                i += 2;
                continue;
            }

            let stacking = up(i) < EDGE_RSV_START && !self.edge_matches_type(up(i), id);
            let mut j = i + 2;
            while j < groups.len() && groups[j].id == id {
                let matches = self.edge_matches_type(up(j), id);
                if stacking {
                    if up(j) >= EDGE_RSV_START || matches {
                        break;
                    }
                } else if up(j) < EDGE_RSV_START && !matches {
                    break;
                }
                j += 2;
            }

            if stacking {
                if j - i != 16 {
                    log::warn!(
                        "Stacked cliff run of terrain {} at group {} has {} groups, expected 16",
                        id,
                        i,
                        j - i
                    );
                }
                let upper_edge = up(i);
                let upper = self
                    .terrain
                    .iter()
                    .position(|t| {
                        t.isom_type != 0 && (t.edge_c[0] == upper_edge || t.edge_c[1] == upper_edge)
                    })
                    .unwrap_or(0) as u16;

                let terrain = &mut self.terrain[id as usize];
                terrain.group_kind = group_kind::STACK;
                terrain.pattern_type = PatternType::Stack;
                terrain.cliff_upper = upper;
                terrain.first_group = i as u16;
                terrain.last_group = j as u16;
                self.stack_ranges.push(StackCliffRange {
                    terrain: id,
                    upper,
                    first_group: i as u16,
                    last_group: j as u16,
                });
            } else if self.terrain[id as usize].group_kind == group_kind::NONE {
                let mask = selection[id as usize];
                let pattern_type = if mask & selection::CLIFFS != 0 {
                    PatternType::Cliffs
                } else if mask & selection::SIMPLE != 0 {
                    PatternType::Simple
                } else if mask & selection::NORMAL != 0 {
                    PatternType::Normal
                } else {
                    log::warn!("No pattern type fits terrain {}", id);
                    PatternType::Normal
                };
                let terrain = &mut self.terrain[id as usize];
                terrain.group_kind = group_kind::EDGE;
                terrain.pattern_type = pattern_type;
            }
            i = j;
        }
    }

    fn build_edge_lookups(&mut self) {
        for t in self.terrain.iter().filter(|t| t.group_kind == group_kind::BASIC) {
            let edge = t.edge_a as usize;
            if edge != 0 && edge < MAX_TERRAIN_TYPES {
                self.canonical_edges[edge] = t.edge_a;
                if self.isom_from_edge[edge] == 0 {
                    self.isom_from_edge[edge] = t.isom_type;
                }
            }
        }
        // Cliff edges stand in for the base terrain edge
        for t in self.terrain.iter().filter(|t| t.group_kind > group_kind::BASIC) {
            for code in std::iter::once(t.edge_b).chain(t.edge_c.iter().copied()) {
                let c = code as usize;
                if c == 0 || c >= MAX_TERRAIN_TYPES || self.canonical_edges[c] != 0 {
                    continue;
                }
                self.canonical_edges[c] = if code == t.edge_b { code } else { t.edge_a };
            }
        }
    }

    fn build_partial_edges(&mut self) {
        for base in self.terrain.iter().filter(|t| t.group_kind == group_kind::BASIC) {
            if self.partial_edges.contains_key(&base.isom_type) {
                continue;
            }
            let mut sides: [Vec<u16>; 8] = Default::default();
            for t in self.terrain.iter().filter(|t| t.group_kind > group_kind::BASIC) {
                let shares_edge = t.edge_a == base.edge_a
                    || (t.pattern_type == PatternType::Simple && t.edge_b == base.edge_a);
                if !shares_edge {
                    continue;
                }
                for (j, pattern) in ISOM_PATTERNS.iter().enumerate() {
                    for (side, list) in RectSide::ALL.iter().zip(sides.iter_mut()) {
                        if pattern.allows_basic_in(t.pattern_type, side.visible_quadrants()) {
                            list.push(t.isom_type + j as u16);
                        }
                    }
                }
            }
            self.partial_edges.insert(base.isom_type, sides);
        }
    }

    /// Whether `edge` is one of the terrain's own edge codes
    pub fn edge_matches_type(&self, edge: u16, id: u16) -> bool {
        if edge == 0 || edge >= EDGE_RSV_START || id as usize >= MAX_TERRAIN_TYPES {
            return false;
        }
        let t = &self.terrain[id as usize];
        t.edge_a == edge || t.edge_b == edge || t.edge_c.contains(&edge)
    }

    pub fn terrain(&self, id: u16) -> &TerrainType {
        self.terrain.get(id as usize).unwrap_or(&NO_TERRAIN)
    }

    pub fn terrain_types(&self) -> impl Iterator<Item = (u16, &TerrainType)> {
        self.terrain
            .iter()
            .enumerate()
            .filter(|(_, t)| t.isom_type != 0)
            .map(|(id, t)| (id as u16, t))
    }

    /// ISOM type of a terrain id when it is plain terrain, 0 otherwise
    pub fn base_isom_type(&self, id: u16) -> u16 {
        let t = self.terrain(id);
        if t.group_kind == group_kind::BASIC {
            t.isom_type
        } else {
            0
        }
    }

    /// Basic edge code a raw CV5 edge code stands for, 0 when unknown
    pub fn canonical_edge(&self, edge: u16) -> u16 {
        self.canonical_edges.get(edge as usize).copied().unwrap_or(0)
    }

    pub fn isom_from_basic_edge(&self, edge: u16) -> u16 {
        self.isom_from_edge.get(edge as usize).copied().unwrap_or(0)
    }

    pub fn stack_ranges(&self) -> &[StackCliffRange] {
        &self.stack_ranges
    }

    /// Transition types that may appear at a map border next to a basic ISOM type
    pub fn partial_edge_types(&self, basic_type: u16, side: RectSide) -> &[u16] {
        let index = RectSide::ALL.iter().position(|s| *s == side).unwrap_or(0);
        self.partial_edges
            .get(&basic_type)
            .map(|sides| sides[index].as_slice())
            .unwrap_or(&[])
    }

    /// The transition pattern an ISOM type resolves to, `None` for basic or unknown types
    pub fn pattern_of(&self, isom_type: u16) -> Option<(u16, &'static IsomPattern)> {
        self.terrain
            .iter()
            .enumerate()
            .filter(|(_, t)| t.group_kind > group_kind::BASIC)
            .find_map(|(id, t)| {
                let sub = isom_type.checked_sub(t.isom_type)? as usize;
                (sub < PATTERN_COUNT).then(|| (id as u16, &ISOM_PATTERNS[sub]))
            })
    }
}
