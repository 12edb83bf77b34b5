//! Static evaluation of a position. Higher is better for the player.
//!
//! The score is a weighted sum of four terms: free space, the largest tile
//! (with a bonus for holding it in a corner), monotonicity of the rows and
//! columns, and smoothness between neighbours. Logarithms are only ever
//! taken of occupied cells, through [`Tile::rank`](crate::Tile::rank).

use crate::config::Weights;
use crate::grid::Grid;
use crate::tile::Position;
use crate::GRID_SIZE;

/// Evaluate with the default weights.
pub fn evaluate(grid: &Grid) -> f64 {
    evaluate_with(grid, &Weights::default())
}

pub fn evaluate_with(grid: &Grid, weights: &Weights) -> f64 {
    let mut score = ((grid.empty_count() + 1) as f64).ln() * weights.empty;

    let (max_value, max_pos) = max_tile(grid);
    score += f64::from(max_value) * weights.max_tile;
    if max_pos.is_some_and(Position::is_corner) {
        score += weights.corner;
    }

    score += monotonicity(grid) * weights.monotonicity;
    score += smoothness(grid) * weights.smoothness.abs();
    score
}

fn rank_at(grid: &Grid, x: usize, y: usize) -> Option<f64> {
    grid.tile_at(Position::new(x, y)).map(|t| f64::from(t.rank()))
}

/// The largest value and where it first appears in row-major order.
fn max_tile(grid: &Grid) -> (u32, Option<Position>) {
    let mut best = (0, None);
    for tile in grid.tiles() {
        if tile.value() > best.0 {
            best = (tile.value(), Some(tile.position()));
        }
    }
    best
}

/// Best of the four directional monotonicity totals. Always <= 0.
///
/// Each line is walked from its first cell to each next occupied cell. An
/// empty first cell counts as rank 0, so a gap at the head of a line
/// penalises the direction that would need it filled.
pub(crate) fn monotonicity(grid: &Grid) -> f64 {
    // Penalties for [drops along rows, rises along rows, drops down
    // columns, rises down columns].
    let mut totals = [0.0f64; 4];
    for i in 0..GRID_SIZE {
        walk_line(|j| rank_at(grid, j, i), &mut totals, 0, 1);
        walk_line(|j| rank_at(grid, i, j), &mut totals, 2, 3);
    }
    totals.into_iter().fold(f64::NEG_INFINITY, f64::max)
}

fn walk_line(
    rank: impl Fn(usize) -> Option<f64>,
    totals: &mut [f64; 4],
    dec: usize,
    inc: usize,
) {
    let mut current = 0;
    let mut next = 1;
    while next < GRID_SIZE {
        while next < GRID_SIZE && rank(next).is_none() {
            next += 1;
        }
        if next >= GRID_SIZE {
            break;
        }
        let cur = rank(current).unwrap_or(0.0);
        let nxt = rank(next).unwrap_or(0.0);
        if cur > nxt {
            totals[dec] += nxt - cur;
        } else if nxt > cur {
            totals[inc] += cur - nxt;
        }
        current = next;
        next += 1;
    }
}

/// Negated sum of rank gaps between each tile and its right and lower
/// occupied neighbours. Always <= 0.
pub(crate) fn smoothness(grid: &Grid) -> f64 {
    let mut total = 0.0;
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let Some(rank) = rank_at(grid, x, y) else {
                continue;
            };
            if x + 1 < GRID_SIZE {
                if let Some(right) = rank_at(grid, x + 1, y) {
                    total -= (rank - right).abs();
                }
            }
            if y + 1 < GRID_SIZE {
                if let Some(down) = rank_at(grid, x, y + 1) {
                    total -= (rank - down).abs();
                }
            }
        }
    }
    total
}
