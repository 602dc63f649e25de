//! 4-connected A* shortest-path planner.
//!
//! Pure function of `(start, goal, grid, blocked)` — no shared mutable state,
//! so replans simply call this again with an updated `blocked` set.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use fleet_core::Coord;

use crate::error::{GridError, GridResult};
use crate::grid::Grid;

/// One entry in the open set: total cost `f = g + h`, heuristic `h`, the
/// coordinate, and a push sequence number. Ordering is reversed so
/// `BinaryHeap` (a max-heap) behaves as a min-heap, with ties broken by
/// lower `f`, then lower `h`, then earlier push order — which, since
/// neighbors are pushed in the fixed N/E/S/W probe order, reproduces "fixed
/// neighbor order" tie-breaking without re-deriving it from the coordinate.
#[derive(Copy, Clone, Eq, PartialEq)]
struct OpenEntry {
    f: u32,
    h: u32,
    g: u32,
    coord: Coord,
    seq: u64,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compute a 4-connected shortest path from `start` to `goal`.
///
/// `blocked` cells are treated as impassable in addition to grid obstacles —
/// used both for dynamic "avoid other current positions" sets and for
/// deadlock-recovery replans. The returned path begins at `start` and ends at
/// `goal`, inclusive; if `start == goal` the path is the single coordinate.
///
/// Unit step cost, Manhattan heuristic (admissible for 4-connected movement).
pub fn plan(
    start: Coord,
    goal: Coord,
    grid: &Grid,
    blocked: &FxHashSet<Coord>,
) -> GridResult<Vec<Coord>> {
    if start == goal {
        return Ok(vec![start]);
    }

    let mut open = BinaryHeap::new();
    let mut g_score: FxHashMap<Coord, u32> = FxHashMap::default();
    let mut came_from: FxHashMap<Coord, Coord> = FxHashMap::default();
    let mut seq: u64 = 0;

    g_score.insert(start, 0);
    open.push(OpenEntry {
        f: start.manhattan(goal),
        h: start.manhattan(goal),
        g: 0,
        coord: start,
        seq,
    });
    seq += 1;

    while let Some(OpenEntry { g, coord, .. }) = open.pop() {
        if coord == goal {
            return Ok(reconstruct(&came_from, start, goal));
        }

        // Stale heap entry: a cheaper path to `coord` was already found.
        if g > *g_score.get(&coord).unwrap_or(&u32::MAX) {
            continue;
        }

        for next in grid.neighbors4(coord) {
            if blocked.contains(&next) {
                continue;
            }
            let tentative_g = g + 1;
            if tentative_g < *g_score.get(&next).unwrap_or(&u32::MAX) {
                g_score.insert(next, tentative_g);
                came_from.insert(next, coord);
                let h = next.manhattan(goal);
                open.push(OpenEntry {
                    f: tentative_g + h,
                    h,
                    g: tentative_g,
                    coord: next,
                    seq,
                });
                seq += 1;
            }
        }
    }

    Err(GridError::NoPath { from: start, goal })
}

fn reconstruct(came_from: &FxHashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut cur = goal;
    while cur != start {
        cur = came_from[&cur];
        path.push(cur);
    }
    path.reverse();
    path
}
