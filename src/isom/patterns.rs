//! # Transition Patterns
//!
//! The 14 composite shapes an ISOM intersection can take. Each pattern lists the CV5 edge value
//! expected on each of the 8 boundaries between the four quadrants of a 2x4 tile rectangle, the
//! terrain group kinds allowed per quadrant, and the order in which quadrants are tried as the
//! source of the transition's terrain type.
//!
//! Boundary layout, starting at the top-left horizontal edge and going clockwise:
//!
//! ```text
//!      1   2
//!   0         3
//!   7         4
//!      6   5
//! ```

use super::dir;
use super::type_tables::{group_kind, PatternType, TerrainType};

pub const PATTERN_COUNT: usize = 14;

/// First CV5 edge code with a structural meaning (49-56)
pub const EDGE_RSV_START: u16 = 48;

pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOT_LEFT: usize = 2;
pub const BOT_RIGHT: usize = 3;

const ANY: u8 = group_kind::ANY;
const EDGE: u8 = group_kind::EDGE;
const BASIC: u8 = group_kind::BASIC;
const STACK: u8 = group_kind::STACK;

/// Expected value of one boundary edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRule {
    /// The transition's base terrain edge
    A,
    /// Base terrain edge, or the given unique cliff edge for cliff terrain
    AOrCliff(usize),
    /// Literal CV5 edge code
    Code(u16),
}

impl EdgeRule {
    pub fn expected(self, terrain: &TerrainType) -> u16 {
        let cliffs = matches!(
            terrain.pattern_type,
            PatternType::Cliffs | PatternType::Stack
        );
        match self {
            EdgeRule::A => terrain.edge_a,
            EdgeRule::AOrCliff(n) if cliffs => terrain.edge_c[n],
            EdgeRule::AOrCliff(_) => terrain.edge_a,
            EdgeRule::Code(55) | EdgeRule::Code(56)
                if terrain.pattern_type == PatternType::Simple =>
            {
                terrain.edge_b
            }
            EdgeRule::Code(code) => code,
        }
    }

    fn label(self) -> String {
        match self {
            EdgeRule::A => " A".to_string(),
            EdgeRule::AOrCliff(n) => format!("C{}", n),
            EdgeRule::Code(code) => format!("{:2}", code),
        }
    }
}

pub struct IsomPattern {
    pub name: &'static str,
    /// Indexed by `dir::*`
    pub edges: [EdgeRule; 8],
    /// `[pattern type][quadrant]` → allowed `group_kind` bits
    pub tile_types: [[u8; 4]; 4],
    pub tile_order: [usize; 4],
}

impl IsomPattern {
    pub fn allowed(&self, pattern_type: PatternType, quadrant: usize) -> u8 {
        self.tile_types[pattern_type as usize][quadrant]
    }

    /// Whether every listed quadrant may hold a basic (plain) tile
    pub fn allows_basic_in(&self, pattern_type: PatternType, quadrants: &[usize]) -> bool {
        quadrants
            .iter()
            .all(|&q| self.allowed(pattern_type, q) & BASIC != 0)
    }
}

use EdgeRule::{AOrCliff, Code, A};

/// Arguments in drawing order (clockwise from the top-left vertical edge), stored by `dir`
const fn edges(
    tl_v: EdgeRule,
    tl_h: EdgeRule,
    tr_h: EdgeRule,
    tr_v: EdgeRule,
    br_v: EdgeRule,
    br_h: EdgeRule,
    bl_h: EdgeRule,
    bl_v: EdgeRule,
) -> [EdgeRule; 8] {
    let mut out = [A; 8];
    out[dir::TOP_LEFT_H as usize] = tl_h;
    out[dir::TOP_LEFT_V as usize] = tl_v;
    out[dir::TOP_RIGHT_H as usize] = tr_h;
    out[dir::TOP_RIGHT_V as usize] = tr_v;
    out[dir::BOT_RIGHT_H as usize] = br_h;
    out[dir::BOT_RIGHT_V as usize] = br_v;
    out[dir::BOT_LEFT_V as usize] = bl_v;
    out[dir::BOT_LEFT_H as usize] = bl_h;
    out
}

const fn all_types(quadrants: [u8; 4]) -> [[u8; 4]; 4] {
    [quadrants; 4]
}

/// Separate rule for cliff and stacked-cliff terrain
const fn cliff_types(cliffs: [u8; 4], other: [u8; 4]) -> [[u8; 4]; 4] {
    [other, other, cliffs, cliffs]
}

/// Separate rule for simple terrain
const fn simple_types(simple: [u8; 4], other: [u8; 4]) -> [[u8; 4]; 4] {
    [other, simple, other, other]
}

pub const ISOM_EDGE_NW: usize = 0;
pub const ISOM_EDGE_NE: usize = 1;
pub const ISOM_EDGE_SE: usize = 2;
pub const ISOM_EDGE_SW: usize = 3;
pub const ISOM_CORNER_OUT_N: usize = 4;
pub const ISOM_CORNER_OUT_E: usize = 5;
pub const ISOM_CORNER_OUT_S: usize = 6;
pub const ISOM_CORNER_OUT_W: usize = 7;
pub const ISOM_CORNER_IN_E: usize = 8;
pub const ISOM_CORNER_IN_W: usize = 9;
pub const ISOM_CORNER_IN_S: usize = 10;
pub const ISOM_CORNER_IN_N: usize = 11;
pub const ISOM_VERTICAL: usize = 12;
pub const ISOM_HORIZONTAL: usize = 13;

/// Declaration order is match priority
pub const ISOM_PATTERNS: [IsomPattern; PATTERN_COUNT] = [
    IsomPattern {
        name: "edge NW",
        edges: edges(A, A, A, Code(51), Code(51), Code(51), Code(51), A),
        tile_types: all_types([ANY, EDGE, EDGE, EDGE]),
        tile_order: [BOT_RIGHT, BOT_LEFT, TOP_RIGHT, TOP_LEFT],
    },
    IsomPattern {
        name: "edge NE",
        edges: edges(Code(49), A, A, A, A, Code(49), Code(49), Code(49)),
        tile_types: all_types([EDGE, ANY, EDGE, EDGE]),
        tile_order: [BOT_LEFT, BOT_RIGHT, TOP_LEFT, TOP_RIGHT],
    },
    IsomPattern {
        name: "edge SE",
        edges: edges(
            Code(52),
            Code(52),
            Code(52),
            AOrCliff(0),
            AOrCliff(0),
            AOrCliff(0),
            AOrCliff(0),
            Code(52),
        ),
        tile_types: cliff_types([EDGE, EDGE, EDGE, EDGE | STACK], [EDGE, EDGE, EDGE, ANY]),
        tile_order: [TOP_LEFT, TOP_RIGHT, BOT_LEFT, BOT_RIGHT],
    },
    IsomPattern {
        name: "edge SW",
        edges: edges(
            AOrCliff(1),
            Code(50),
            Code(50),
            Code(50),
            Code(50),
            AOrCliff(1),
            AOrCliff(1),
            AOrCliff(1),
        ),
        tile_types: cliff_types([EDGE, EDGE, EDGE | STACK, EDGE], [EDGE, EDGE, ANY, EDGE]),
        tile_order: [TOP_RIGHT, TOP_LEFT, BOT_RIGHT, BOT_LEFT],
    },
    IsomPattern {
        name: "outer corner N",
        edges: edges(A, A, A, A, A, Code(49), Code(51), A),
        tile_types: all_types([ANY, ANY, EDGE, EDGE]),
        tile_order: [BOT_LEFT, BOT_RIGHT, TOP_LEFT, TOP_RIGHT],
    },
    IsomPattern {
        name: "outer corner E",
        edges: edges(Code(54), A, A, A, A, A, AOrCliff(3), Code(54)),
        tile_types: all_types([EDGE, ANY, EDGE, ANY]),
        tile_order: [TOP_LEFT, BOT_LEFT, TOP_RIGHT, BOT_RIGHT],
    },
    IsomPattern {
        name: "outer corner S",
        edges: edges(
            AOrCliff(1),
            Code(50),
            Code(52),
            AOrCliff(0),
            AOrCliff(0),
            AOrCliff(0),
            AOrCliff(1),
            AOrCliff(1),
        ),
        tile_types: cliff_types(
            [EDGE, EDGE, EDGE | STACK, EDGE | STACK],
            [EDGE, EDGE, ANY, ANY],
        ),
        tile_order: [TOP_LEFT, TOP_RIGHT, BOT_LEFT, BOT_RIGHT],
    },
    IsomPattern {
        name: "outer corner W",
        edges: edges(A, A, A, Code(53), Code(53), AOrCliff(2), A, A),
        tile_types: all_types([ANY, EDGE, ANY, EDGE]),
        tile_order: [TOP_RIGHT, BOT_RIGHT, TOP_LEFT, BOT_LEFT],
    },
    IsomPattern {
        name: "inner corner E",
        edges: edges(
            AOrCliff(1),
            Code(50),
            Code(56),
            Code(56),
            Code(56),
            Code(56),
            Code(51),
            AOrCliff(1),
        ),
        tile_types: simple_types(
            [EDGE, EDGE | BASIC, EDGE, EDGE | BASIC],
            [EDGE, EDGE, EDGE, EDGE],
        ),
        tile_order: [TOP_LEFT, BOT_LEFT, TOP_RIGHT, BOT_RIGHT],
    },
    IsomPattern {
        name: "inner corner W",
        edges: edges(
            Code(55),
            Code(55),
            Code(52),
            AOrCliff(0),
            AOrCliff(0),
            Code(49),
            Code(55),
            Code(55),
        ),
        tile_types: simple_types(
            [EDGE | BASIC, EDGE, EDGE | BASIC, EDGE],
            [EDGE, EDGE, EDGE, EDGE],
        ),
        tile_order: [TOP_RIGHT, BOT_RIGHT, TOP_LEFT, BOT_LEFT],
    },
    IsomPattern {
        name: "inner corner S",
        edges: edges(
            Code(49),
            A,
            A,
            Code(51),
            Code(51),
            Code(51),
            Code(49),
            Code(49),
        ),
        tile_types: all_types([EDGE, EDGE, EDGE, EDGE]),
        tile_order: [BOT_LEFT, BOT_RIGHT, TOP_LEFT, TOP_RIGHT],
    },
    IsomPattern {
        name: "inner corner N",
        edges: edges(
            Code(52),
            Code(52),
            Code(50),
            Code(50),
            Code(50),
            AOrCliff(1),
            AOrCliff(0),
            Code(52),
        ),
        tile_types: all_types([EDGE, EDGE, EDGE, EDGE]),
        tile_order: [TOP_LEFT, TOP_RIGHT, BOT_LEFT, BOT_RIGHT],
    },
    IsomPattern {
        name: "vertical",
        edges: edges(
            AOrCliff(1),
            Code(50),
            Code(52),
            AOrCliff(0),
            AOrCliff(0),
            Code(49),
            Code(51),
            AOrCliff(1),
        ),
        tile_types: all_types([EDGE, EDGE, EDGE, EDGE]),
        tile_order: [TOP_LEFT, TOP_RIGHT, BOT_LEFT, BOT_RIGHT],
    },
    IsomPattern {
        name: "horizontal",
        edges: edges(
            Code(54),
            A,
            A,
            Code(53),
            Code(53),
            AOrCliff(2),
            AOrCliff(3),
            Code(54),
        ),
        tile_types: all_types([EDGE, EDGE, EDGE, EDGE]),
        tile_order: [TOP_LEFT, TOP_RIGHT, BOT_LEFT, BOT_RIGHT],
    },
];

/// Human readable dump of the pattern table
pub fn describe_patterns() -> String {
    const KINDS: [&str; 4] = ["Normal", "Simple", "Cliff", "Stack"];
    const GROUPS: [&str; 8] = [
        "None",
        "Basic",
        "Edge",
        "Basic/Edge",
        "Stack",
        "Basic/Stack",
        "Edge/Stack",
        "Any",
    ];

    let mut out = String::new();
    for (i, pattern) in ISOM_PATTERNS.iter().enumerate() {
        let e = |d: u8| pattern.edges[d as usize].label();
        out.push_str(&format!("[ Type {} : {} ]\n", i, pattern.name));
        out.push_str(&format!(
            "    {} {}\n  {}     {}\n  {}     {}\n    {} {}\n\n",
            e(dir::TOP_LEFT_H),
            e(dir::TOP_RIGHT_H),
            e(dir::TOP_LEFT_V),
            e(dir::TOP_RIGHT_V),
            e(dir::BOT_LEFT_V),
            e(dir::BOT_RIGHT_V),
            e(dir::BOT_LEFT_H),
            e(dir::BOT_RIGHT_H),
        ));
        for (kind, types) in KINDS.iter().zip(pattern.tile_types.iter()) {
            out.push_str(&format!(
                "{} Types: {{{}, {}, {}, {}}}\n",
                kind,
                GROUPS[types[0] as usize],
                GROUPS[types[1] as usize],
                GROUPS[types[2] as usize],
                GROUPS[types[3] as usize],
            ));
        }
        out.push('\n');
    }
    out
}
