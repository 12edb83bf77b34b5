//! Move resolution: sliding and merging every line of the board.

use crate::grid::Grid;
use crate::tile::{Position, Tile, TileId};
use crate::{Direction, GRID_SIZE};

/// Two tiles combined into one during a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeEvent {
    /// The consumed tiles, the one nearer the destination edge first.
    pub consumed: [TileId; 2],
    pub produced: TileId,
    pub position: Position,
    pub value: u32,
}

/// Result of sliding a grid in one direction.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub grid: Grid,
    /// Sum of the values of the tiles produced by merges.
    pub score: u32,
    /// Whether any cell changed tile identity or value.
    pub moved: bool,
    pub merges: Vec<MergeEvent>,
}

/// Cells of line `index` ordered from the edge tiles slide towards.
///
/// Rows for Left/Right, columns for Up/Down. Ordering the coordinates this
/// way makes every direction a "slide towards index 0" over the line.
fn line_cells(direction: Direction, index: usize) -> [Position; GRID_SIZE] {
    let mut cells = [Position::new(0, 0); GRID_SIZE];
    for (i, cell) in cells.iter_mut().enumerate() {
        let along = if direction.towards_start() {
            i
        } else {
            GRID_SIZE - 1 - i
        };
        *cell = match direction {
            Direction::Left | Direction::Right => Position::new(along, index),
            Direction::Up | Direction::Down => Position::new(index, along),
        };
    }
    cells
}

/// Slide `grid` in `direction`, merging equal neighbours once per move.
///
/// Never mutates the input; the returned grid is a fresh value.
pub fn resolve_move(grid: &Grid, direction: Direction) -> MoveOutcome {
    debug_assert!(grid.positions_consistent());

    let mut next = *grid;
    let mut score = 0;
    let mut merges = Vec::new();

    for index in 0..GRID_SIZE {
        let cells = line_cells(direction, index);
        let tiles: Vec<Tile> = cells.iter().filter_map(|&p| grid.tile_at(p)).collect();

        let mut line = [None; GRID_SIZE];
        let mut write = 0;
        let mut read = 0;
        while read < tiles.len() {
            let tile = tiles[read];
            let dest = cells[write];
            match tiles.get(read + 1) {
                Some(other) if other.value() == tile.value() => {
                    let value = tile.value() * 2;
                    let id = next.alloc_id();
                    merges.push(MergeEvent {
                        consumed: [tile.id(), other.id()],
                        produced: id,
                        position: dest,
                        value,
                    });
                    score += value;
                    line[write] = Some(Tile::merged(id, value, dest));
                    read += 2;
                }
                _ => {
                    line[write] = Some(tile.settled(dest));
                    read += 1;
                }
            }
            write += 1;
        }

        for (pos, cell) in cells.into_iter().zip(line) {
            next.set(pos, cell);
        }
    }

    MoveOutcome {
        moved: next.differs_from(grid),
        grid: next,
        score,
        merges,
    }
}
