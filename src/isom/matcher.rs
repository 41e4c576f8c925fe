//! # Rectangle Matcher
//!
//! Resolves the ISOM type of one intersection from the eight tiles around it: a 2x4 rectangle,
//! top row in `tiles[0..4]`, bottom row in `tiles[4..8]`. Tiles come in left/right pairs, so the
//! rectangle is four quadrants represented by their even tile (`tiles[0]`, `[2]`, `[4]`, `[6]`).

use thiserror::Error;

use super::analysis::TilesetContext;
use super::dir;
use super::patterns::{IsomPattern, ISOM_PATTERNS};
use super::tile_flags::{BASIC_GROUP, COLUMN};
use super::type_tables::{group_kind, PatternType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("all tiles are undefined")]
    AllUndefined,
    #[error("tile {tile} at position {index} is not paired with {partner}")]
    Unpaired { index: usize, tile: u16, partner: u16 },
    #[error("tile {tile} at position {index} is in the wrong column")]
    WrongColumn { index: usize, tile: u16 },
}

/// Checks that every non-basic tile sits next to its pair partner and fills in the missing half
/// of partially known pairs. Basic tiles ignore the left/right distinction and are normalised to
/// the column they occupy.
pub fn pair_tiles(tiles: &mut [u16; 8], flags: &mut [u16; 8]) -> Result<(), PairError> {
    if tiles.iter().all(|&t| t == 0) {
        return Err(PairError::AllUndefined);
    }

    for i in 0..8 {
        let column = (i & 1) as u16;
        let partner = i ^ 1;
        if flags[i] & BASIC_GROUP != 0 {
            flags[i] = (flags[i] & !COLUMN) | column;
            tiles[i] = (tiles[i] & !COLUMN) | column;
            if flags[partner] & BASIC_GROUP != 0 || tiles[partner] == 0 {
                flags[partner] = flags[i] ^ COLUMN;
                tiles[partner] = tiles[i] ^ COLUMN;
            }
        } else if tiles[i] != 0 && flags[i] & COLUMN == column {
            if flags[partner] & COLUMN == (partner & 1) as u16 && tiles[partner] == 0 {
                flags[partner] = flags[i] ^ COLUMN;
                tiles[partner] = tiles[i] ^ COLUMN;
            }
            if tiles[i] ^ COLUMN != tiles[partner] {
                return Err(PairError::Unpaired {
                    index: i,
                    tile: tiles[i],
                    partner: tiles[partner],
                });
            }
        } else if tiles[i] != 0 {
            return Err(PairError::WrongColumn {
                index: i,
                tile: tiles[i],
            });
        }
    }
    Ok(())
}

/// CV5 edge codes along the 8 internal boundaries of the rectangle, indexed by `dir`
fn boundary_edges(ctx: &TilesetContext, tiles: &[u16; 8]) -> [u16; 8] {
    let tl = ctx.edges_of(tiles[0]);
    let tr = ctx.edges_of(tiles[2]);
    let bl = ctx.edges_of(tiles[4]);
    let br = ctx.edges_of(tiles[6]);

    let mut edges = [0u16; 8];
    edges[dir::TOP_LEFT_H as usize] = tl.right;
    edges[dir::TOP_LEFT_V as usize] = tl.down;
    edges[dir::TOP_RIGHT_H as usize] = tr.left;
    edges[dir::TOP_RIGHT_V as usize] = tr.down;
    edges[dir::BOT_RIGHT_H as usize] = br.left;
    edges[dir::BOT_RIGHT_V as usize] = br.up;
    edges[dir::BOT_LEFT_V as usize] = bl.up;
    edges[dir::BOT_LEFT_H as usize] = bl.right;
    edges
}

/// Upper cliff of a stacked cliff filling the bottom row of the rectangle
fn stacked_upper(ctx: &TilesetContext, tiles: &[u16; 8]) -> Option<u16> {
    for k in [4, 6] {
        let t = tiles[k];
        if t == 0 {
            continue;
        }
        let tt = ctx.terrain_type_of(t);
        if tt.group_kind != group_kind::STACK || t < tt.first_group || t >= tt.last_group {
            return None;
        }
    }
    if tiles[4] != 0 && tiles[6] != 0 && ctx.terrain_of(tiles[4]) != ctx.terrain_of(tiles[6]) {
        return None;
    }
    let lead = if tiles[4] != 0 { tiles[4] } else { tiles[6] };
    Some(ctx.terrain_type_of(lead).cliff_upper)
}

/// Whether every quadrant holds a group kind the pattern allows for terrain `id`
fn quadrants_fit(
    ctx: &TilesetContext,
    tiles: &[u16; 8],
    pattern: &IsomPattern,
    pattern_type: PatternType,
    id: u16,
) -> bool {
    for quadrant in 0..4 {
        let t = tiles[quadrant * 2];
        if t == 0 {
            continue;
        }
        let tid = ctx.terrain_of(t);
        let tt = ctx.tables.terrain(tid);

        // A stack that does not belong to this cliff behaves like a plain edge
        let mut kind = tt.group_kind;
        if kind == group_kind::STACK
            && (tt.cliff_upper != id || t < tt.first_group || t >= tt.last_group)
        {
            kind = group_kind::EDGE;
        }

        let allowed = pattern.allowed(pattern_type, quadrant);
        let kind = kind & allowed;
        if kind == 0 {
            return false;
        }
        if allowed & group_kind::BASIC == 0 {
            let own_edge = kind & group_kind::EDGE != 0 && tid == id;
            let own_stack = kind & group_kind::STACK != 0 && tt.cliff_upper == id;
            if !own_edge && !own_stack {
                return false;
            }
        }
    }
    true
}

/// ISOM type of a paired rectangle, 0 when nothing fits
pub fn resolve(ctx: &TilesetContext, tiles: &[u16; 8]) -> u16 {
    let tables = &ctx.tables;

    let mut common = 0;
    let mut uniform = true;
    for &t in tiles.iter().step_by(2).filter(|&&t| t != 0) {
        if common == 0 {
            common = t;
        } else if t != common {
            uniform = false;
            break;
        }
    }
    if common == 0 {
        return 0;
    }
    if uniform && ctx.is_basic_group(common) {
        return tables.base_isom_type(ctx.terrain_of(common));
    }

    let edges = boundary_edges(ctx, tiles);
    let mut best: Option<(usize, u16)> = None;

    for (index, pattern) in ISOM_PATTERNS.iter().enumerate() {
        for &quadrant in &pattern.tile_order {
            let mut id = ctx.terrain_of(tiles[quadrant * 2]);
            if id == 0 || tables.terrain(id).group_kind == group_kind::BASIC {
                continue;
            }
            let pattern_type = tables.terrain(id).pattern_type;
            if pattern_type == PatternType::Stack && tiles[0] == 0 && tiles[2] == 0 {
                if let Some(upper) = stacked_upper(ctx, tiles) {
                    id = upper;
                }
            }
            if !quadrants_fit(ctx, tiles, pattern, pattern_type, id) {
                continue;
            }

            let terrain = tables.terrain(id);
            if terrain.isom_type == 0 {
                continue;
            }
            let mut matched = 0;
            let fits = edges
                .iter()
                .zip(pattern.edges.iter())
                .filter(|(&edge, _)| edge != 0)
                .all(|(&edge, rule)| {
                    matched += 1;
                    edge == rule.expected(terrain)
                });
            if !fits {
                continue;
            }

            let isom_type = terrain.isom_type + index as u16;
            if matched == edges.len() {
                return isom_type;
            }
            if best.map_or(true, |(m, _)| matched > m) {
                best = Some((matched, isom_type));
            }
        }
    }

    // A rectangle made of one terrain seen through different groups
    let mut known = edges.iter().copied().filter(|&e| e != 0).peekable();
    let Some(&first) = known.peek() else {
        return 0;
    };
    let shared = tables.canonical_edge(first);
    if shared != 0 && known.all(|e| tables.canonical_edge(e) == shared) {
        let isom_type = tables.isom_from_basic_edge(shared);
        if isom_type != 0 {
            return isom_type;
        }
    }

    match best {
        Some((_, isom_type)) => isom_type,
        None => {
            log::trace!("No pattern fits rectangle {:?}", tiles);
            0
        }
    }
}

/// Pair up and resolve a rectangle, logging why it was rejected
pub fn resolve_rect(ctx: &TilesetContext, tiles: &mut [u16; 8], flags: &mut [u16; 8]) -> u16 {
    match pair_tiles(tiles, flags) {
        Ok(()) => resolve(ctx, tiles),
        Err(PairError::AllUndefined) => 0,
        Err(e) => {
            log::trace!("Invalid ISOM tiles: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isom::fixtures::{self, G_DIRT, G_MUD, G_NW_BOT_LEFT, G_NW_BOT_RIGHT, G_NW_TOP_RIGHT};
    use crate::isom::patterns::{
        ISOM_CORNER_IN_E, ISOM_CORNER_OUT_S, ISOM_EDGE_NW, ISOM_EDGE_SE, ISOM_PATTERNS,
    };
    use crate::isom::tile_flags::INVALID_ISOM;

    fn pair(group: u16) -> [u16; 2] {
        [group, group + 1]
    }

    fn rect(quadrants: [u16; 4]) -> [u16; 8] {
        let mut tiles = [0u16; 8];
        for (q, &g) in quadrants.iter().enumerate() {
            if g != 0 {
                tiles[q * 2..q * 2 + 2].copy_from_slice(&pair(g));
            }
        }
        tiles
    }

    #[test]
    fn uniform_basic_rectangle_is_base_type() {
        let ctx = fixtures::context();
        assert_eq!(resolve(&ctx, &rect([G_DIRT; 4])), 1);
        assert_eq!(resolve(&ctx, &rect([G_MUD; 4])), 9);
    }

    #[test]
    fn partially_visible_basic_rectangle() {
        let ctx = fixtures::context();
        assert_eq!(resolve(&ctx, &rect([0, 0, G_DIRT, G_DIRT])), 1);
        assert_eq!(resolve(&ctx, &rect([G_MUD, 0, 0, 0])), 9);
    }

    #[test]
    fn empty_rectangle_is_zero() {
        let ctx = fixtures::context();
        assert_eq!(resolve(&ctx, &[0; 8]), 0);
    }

    #[test]
    fn transition_matches_pattern() {
        let ctx = fixtures::context();
        let tiles = rect([G_DIRT, G_NW_TOP_RIGHT, G_NW_BOT_LEFT, G_NW_BOT_RIGHT]);
        assert_eq!(
            resolve(&ctx, &tiles),
            fixtures::DIRT_MUD_ISOM + ISOM_EDGE_NW as u16
        );
    }

    #[test]
    fn partial_match_still_resolves() {
        let ctx = fixtures::context();
        // Bottom row off the map: only the top edges are known
        let tiles = rect([G_DIRT, G_NW_TOP_RIGHT, 0, 0]);
        assert_ne!(resolve(&ctx, &tiles), 0);
    }

    #[test]
    fn cliff_rectangle_uses_cliff_edges() {
        let ctx = fixtures::context();
        let tiles = rect([
            fixtures::G_CLIFF_SE_TOP_LEFT,
            fixtures::G_CLIFF_SE_TOP_RIGHT,
            fixtures::G_CLIFF_SE_BOT_LEFT,
            fixtures::G_CLIFF_SE_BOT_RIGHT,
        ]);
        assert_eq!(
            resolve(&ctx, &tiles),
            fixtures::CLIFF_ISOM + ISOM_EDGE_SE as u16
        );
    }

    #[test]
    fn simple_corner_borders_edge_b_terrain() {
        let ctx = fixtures::context();
        // Mud takes the 56 edges of the inner corner and may sit in the basic quadrants
        let tiles = rect([
            fixtures::G_SIMPLE_CORNER,
            G_MUD,
            fixtures::G_SIMPLE_TOP,
            G_MUD,
        ]);
        assert_eq!(
            resolve(&ctx, &tiles),
            fixtures::SIMPLE_ISOM + ISOM_CORNER_IN_E as u16
        );
    }

    #[test]
    fn stacked_bottom_row_resolves_to_upper_cliff() {
        let ctx = fixtures::context();
        let tiles = rect([0, 0, fixtures::G_STACK_BOT_LEFT, fixtures::G_STACK_BOT_RIGHT]);
        assert_eq!(stacked_upper(&ctx, &tiles), Some(fixtures::CLIFF));
        assert_eq!(
            resolve(&ctx, &tiles),
            fixtures::CLIFF_ISOM + ISOM_CORNER_OUT_S as u16
        );

        // The plain run of the same terrain is outside the stack range
        let plain = rect([0, 0, fixtures::G_STACK_PLAIN, fixtures::G_STACK_BOT_RIGHT]);
        assert_eq!(stacked_upper(&ctx, &plain), None);
    }

    #[test]
    fn foreign_stack_tiles_count_as_edges() {
        let ctx = fixtures::context();
        let out_s = &ISOM_PATTERNS[ISOM_CORNER_OUT_S];
        let stacked = rect([0, 0, fixtures::G_STACK_BOT_LEFT, fixtures::G_STACK_BOT_RIGHT]);
        assert!(quadrants_fit(&ctx, &stacked, out_s, PatternType::Stack, fixtures::CLIFF));
        // Edge SE only takes a stack in the bottom right quadrant
        let se = &ISOM_PATTERNS[ISOM_EDGE_SE];
        assert!(!quadrants_fit(&ctx, &stacked, se, PatternType::Stack, fixtures::CLIFF));

        // Out of range, the plain run is an edge of its own terrain and not of the cliff
        let plain = rect([0, 0, fixtures::G_STACK_PLAIN, fixtures::G_STACK_BOT_RIGHT]);
        assert!(!quadrants_fit(&ctx, &plain, out_s, PatternType::Stack, fixtures::CLIFF));
        // Under any other upper id the stack run is treated as an edge too
        assert!(quadrants_fit(
            &ctx,
            &stacked,
            out_s,
            PatternType::Stack,
            fixtures::STACKED
        ));
    }

    #[test]
    fn all_undefined_is_rejected() {
        let mut tiles = [0u16; 8];
        let mut flags = [INVALID_ISOM; 8];
        assert_eq!(
            pair_tiles(&mut tiles, &mut flags),
            Err(PairError::AllUndefined)
        );
        let ctx = fixtures::context();
        assert_eq!(resolve_rect(&ctx, &mut tiles, &mut flags), 0);
    }

    #[test]
    fn basic_tiles_fill_their_partner() {
        let mut tiles = [0, 0, G_DIRT + 1, 0, 0, 0, 0, 0];
        let mut flags = [INVALID_ISOM, INVALID_ISOM, BASIC_GROUP | 1, 0, 0, 0, 0, 0];
        pair_tiles(&mut tiles, &mut flags).unwrap();
        assert_eq!(&tiles[2..4], &[G_DIRT, G_DIRT + 1]);
        assert_eq!(flags[2] & COLUMN, 0);
        assert_eq!(flags[3] & COLUMN, 1);
    }

    #[test]
    fn edge_tiles_must_be_paired() {
        let mut tiles = [G_NW_TOP_RIGHT, G_NW_BOT_LEFT + 1, 0, 0, 0, 0, 0, 0];
        let mut flags = [0, 1, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            pair_tiles(&mut tiles, &mut flags),
            Err(PairError::Unpaired { index: 0, .. })
        ));

        let mut tiles = [G_NW_TOP_RIGHT + 1, 0, 0, 0, 0, 0, 0, 0];
        let mut flags = [1, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            pair_tiles(&mut tiles, &mut flags),
            Err(PairError::WrongColumn { index: 0, .. })
        ));
    }
}
