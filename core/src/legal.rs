//! Loss detection.

use crate::grid::Grid;
use crate::merge::resolve_move;
use crate::tile::Position;
use crate::{Direction, GRID_SIZE};

/// Whether the game can continue: any empty cell, or two equal tiles side
/// by side. Only neighbours are inspected; no move is simulated.
pub fn has_legal_move(grid: &Grid) -> bool {
    if grid.empty_count() > 0 {
        return true;
    }
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let value = grid.value_at(Position::new(x, y));
            if x + 1 < GRID_SIZE && grid.value_at(Position::new(x + 1, y)) == value {
                return true;
            }
            if y + 1 < GRID_SIZE && grid.value_at(Position::new(x, y + 1)) == value {
                return true;
            }
        }
    }
    false
}

/// Legal directions as a boolean array [Up, Down, Left, Right].
pub fn legal_directions(grid: &Grid) -> [bool; 4] {
    Direction::all().map(|dir| resolve_move(grid, dir).moved)
}
