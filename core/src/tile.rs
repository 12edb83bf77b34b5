//! Tiles and board coordinates.

use crate::GRID_SIZE;

/// Opaque tile identity. Stable across moves until the tile is consumed
/// by a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub(crate) u64);

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Zero-based column (`x`) and row (`y`) on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self) -> bool {
        self.x < GRID_SIZE && self.y < GRID_SIZE
    }

    pub fn is_corner(self) -> bool {
        let edge = |v: usize| v == 0 || v == GRID_SIZE - 1;
        edge(self.x) && edge(self.y)
    }
}

/// A tile on the board.
///
/// Tiles are only created by [`Grid`](crate::Grid) operations, which keeps
/// ids unique and positions in step with the matrix slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    value: u32,
    position: Position,
    is_new: bool,
}

impl Tile {
    pub(crate) fn spawned(id: TileId, value: u32, position: Position) -> Self {
        Self {
            id,
            value,
            position,
            is_new: true,
        }
    }

    pub(crate) fn merged(id: TileId, value: u32, position: Position) -> Self {
        Self {
            id,
            value,
            position,
            is_new: false,
        }
    }

    /// The same tile moved to `position`, with the spawn flag cleared.
    pub(crate) fn settled(self, position: Position) -> Self {
        Self {
            position,
            is_new: false,
            ..self
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// True only in the turn the tile was spawned.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// log2 of the value. Values are powers of two so this is exact.
    pub fn rank(&self) -> u32 {
        self.value.trailing_zeros()
    }
}

/// Largest value accepted when building a grid. Sixteen such tiles still
/// merge without overflowing `u32`.
pub const MAX_TILE_VALUE: u32 = 1 << 27;

/// Whether `value` may sit on the board.
pub(crate) fn is_tile_value(value: u32) -> bool {
    (2..=MAX_TILE_VALUE).contains(&value) && value.is_power_of_two()
}
