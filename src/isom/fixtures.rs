//! Small synthetic badlands tileset shared by the ISOM tests.
//!
//! Groups:
//! - 0/1: unused
//! - 2/3: dirt, 4/5: mud
//! - 6..15: a dirt→mud transition, enough groups to classify it as a normal transition and to
//!   build an edge NW rectangle (dirt top-left, groups 6/8/10 in the other quadrants)
//! - 16/17: a two-row doodad placed over dirt and mud
//! - 18..29: a cliff rising to high ground (edge 10) with unique cliff edges 11-14, including the
//!   four groups of an edge SE rectangle
//! - 30..47: a cliff stacked under it, one plain run followed by a 16 group stacking run
//! - 48..53: a simple dirt→mud transition

use crate::tileset::cv5::{Cv5, Cv5Group, DoodadInfo, Edges, CV5_DOODAD_ID};
use crate::tileset::dddata::DdData;
use crate::tileset::{Tileset, TilesetId};

use super::analysis::TilesetContext;

pub const DIRT: u16 = 2;
pub const MUD: u16 = 4;
pub const DIRT_MUD: u16 = 34;

pub const DIRT_EDGE: u16 = 3;
pub const MUD_EDGE: u16 = 4;
pub const DIRT_MUD_ISOM: u16 = 0x0D;

pub const G_DIRT: u16 = 2;
pub const G_MUD: u16 = 4;
pub const G_NW_TOP_RIGHT: u16 = 6;
pub const G_NW_BOT_LEFT: u16 = 8;
pub const G_NW_BOT_RIGHT: u16 = 10;
pub const G_DOODAD: u16 = 16;
pub const DOODAD_ID: u16 = 5;

pub const CLIFF: u16 = 20;
pub const CLIFF_ISOM: u16 = 0x29;
pub const HIGH_EDGE: u16 = 10;
/// Unique cliff edges, indexed like `TerrainType::edge_c`
pub const CLIFF_EDGES: [u16; 4] = [13, 11, 12, 14];
pub const G_CLIFF_SE_TOP_LEFT: u16 = 24;
pub const G_CLIFF_SE_TOP_RIGHT: u16 = 20;
pub const G_CLIFF_SE_BOT_LEFT: u16 = 28;
pub const G_CLIFF_SE_BOT_RIGHT: u16 = 26;

pub const STACKED: u16 = 22;
pub const G_STACK_PLAIN: u16 = 30;
pub const G_STACK_FIRST: u16 = 32;
pub const G_STACK_LAST: u16 = 48;
pub const G_STACK_BOT_LEFT: u16 = 32;
pub const G_STACK_BOT_RIGHT: u16 = 34;

pub const SIMPLE: u16 = 35;
pub const SIMPLE_ISOM: u16 = 0x1B;
pub const G_SIMPLE_TOP: u16 = 48;
pub const G_SIMPLE_CORNER: u16 = 52;

pub fn group(id: u16, [left, up, right, down]: [u16; 4]) -> Cv5Group {
    let mut g = Cv5Group {
        id,
        edges: Edges {
            left,
            up,
            right,
            down,
        },
        ..Default::default()
    };
    g.tiles[0] = 1;
    g.tiles[1] = 2;
    g
}

pub fn plain_group(id: u16, edge: u16) -> Cv5Group {
    group(id, [edge; 4])
}

fn doodad_group() -> Cv5Group {
    let mut g = Cv5Group {
        id: CV5_DOODAD_ID,
        doodad: DoodadInfo {
            doodad_id: DOODAD_ID,
            width: 2,
            height: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    g.tiles[0] = 1;
    g.tiles[1] = 2;
    g
}

pub fn badlands() -> Tileset {
    let transition = [
        [DIRT_EDGE, DIRT_EDGE, 51, 51],
        [DIRT_EDGE, DIRT_EDGE, 51, MUD_EDGE],
        [51, 51, MUD_EDGE, MUD_EDGE],
        [DIRT_EDGE, 53, 50, DIRT_EDGE],
        [51, 51, 55, 55],
    ];

    let mut groups = vec![Cv5Group::default(), Cv5Group::default()];
    groups.push(plain_group(DIRT, DIRT_EDGE));
    groups.push(plain_group(DIRT, DIRT_EDGE));
    groups.push(plain_group(MUD, MUD_EDGE));
    groups.push(plain_group(MUD, MUD_EDGE));
    for edges in transition {
        groups.push(group(DIRT_MUD, edges));
        groups.push(group(DIRT_MUD, edges));
    }
    groups.push(doodad_group());
    groups.push(doodad_group());

    let [c0, c1, c2, c3] = CLIFF_EDGES;
    let cliff = [
        [HIGH_EDGE, c1, 51, 51],
        [52, 54, c3, c0],
        [c2, 53, 50, c1],
        [HIGH_EDGE, HIGH_EDGE, 52, 52],
        [c0, c0, HIGH_EDGE, HIGH_EDGE],
        [HIGH_EDGE, 52, c0, HIGH_EDGE],
    ];
    // Upper edges that belong to the cliff above, not to the stack itself
    let mut stack = vec![[15, 15, 51, 51], [15, c1, c1, 15], [c0, c0, 15, 15]];
    stack.extend([[15, c1, 49, 49]; 6]);
    let simple = [
        [DIRT_EDGE, DIRT_EDGE, 51, 51],
        [51, 51, MUD_EDGE, MUD_EDGE],
        [DIRT_EDGE, 53, 50, DIRT_EDGE],
    ];
    let runs = [
        (CLIFF, &cliff[..]),
        (STACKED, stack.as_slice()),
        (SIMPLE, &simple[..]),
    ];
    for (id, run) in runs {
        for &edges in run {
            groups.push(group(id, edges));
            groups.push(group(id, edges));
        }
    }

    let mut dddata = DdData::empty();
    dddata.set(DOODAD_ID, 0, G_DIRT);
    dddata.set(DOODAD_ID, 1, G_DIRT + 1);
    dddata.set(DOODAD_ID, 2, G_MUD);
    dddata.set(DOODAD_ID, 3, G_MUD + 1);

    Tileset::new(TilesetId::Badlands, Cv5 { groups }, dddata)
}

pub fn context() -> TilesetContext {
    TilesetContext::new(badlands())
}

pub fn tile(group: u16, variant: u16) -> u16 {
    (group << 4) | variant
}

/// Raster of `width` x `height` tiles where each row alternates the even/odd group of a pair
pub fn paired_raster(width: usize, height: usize, group: u16) -> Vec<u16> {
    (0..width * height)
        .map(|i| tile((group & !1) | (i % width) as u16 & 1, 0))
        .collect()
}
