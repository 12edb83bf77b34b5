//! The 4x4 board.
//!
//! A [`Grid`] is a plain `Copy` value: a matrix of optional tiles indexed
//! `[y][x]` plus the counter that hands out tile ids. Every operation that
//! changes the board returns a new grid.

use std::str::FromStr;

use crate::error::GridError;
use crate::tile::{is_tile_value, Position, Tile, TileId};
use crate::GRID_SIZE;

#[derive(Clone, Copy)]
pub struct Grid {
    cells: [[Option<Tile>; GRID_SIZE]; GRID_SIZE],
    next_id: u64,
}

impl Grid {
    pub const EMPTY: Grid = Grid {
        cells: [[None; GRID_SIZE]; GRID_SIZE],
        next_id: 0,
    };

    /// Build a grid from a row-major matrix of values, 0 meaning empty.
    pub fn from_values(values: [[u32; GRID_SIZE]; GRID_SIZE]) -> Result<Grid, GridError> {
        let mut grid = Grid::EMPTY;
        for (y, row) in values.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                if !is_tile_value(value) {
                    return Err(GridError::InvalidValue { value, x, y });
                }
                grid = grid.with_tile(Position::new(x, y), value);
            }
        }
        Ok(grid)
    }

    /// Build a grid from loose `(position, value)` pairs, such as a snapshot
    /// restored by a caller. Positions must be in bounds and distinct.
    pub fn from_tiles<I>(tiles: I) -> Result<Grid, GridError>
    where
        I: IntoIterator<Item = (Position, u32)>,
    {
        let mut grid = Grid::EMPTY;
        for (pos, value) in tiles {
            let Position { x, y } = pos;
            if !pos.in_bounds() {
                return Err(GridError::OutOfBounds { x, y });
            }
            if grid.tile_at(pos).is_some() {
                return Err(GridError::DuplicatePosition { x, y });
            }
            if !is_tile_value(value) {
                return Err(GridError::InvalidValue { value, x, y });
            }
            grid = grid.with_tile(pos, value);
        }
        Ok(grid)
    }

    /// A copy of this grid with a freshly spawned tile at `pos`.
    ///
    /// The cell must be empty and `value` a valid tile value.
    pub fn with_tile(&self, pos: Position, value: u32) -> Grid {
        self.place(pos, value).0
    }

    pub(crate) fn place(&self, pos: Position, value: u32) -> (Grid, TileId) {
        debug_assert!(pos.in_bounds());
        debug_assert!(self.tile_at(pos).is_none(), "cell {pos:?} is occupied");
        debug_assert!(is_tile_value(value));
        let mut next = *self;
        let id = next.alloc_id();
        next.set(pos, Some(Tile::spawned(id, value, pos)));
        (next, id)
    }

    pub fn tile_at(&self, pos: Position) -> Option<Tile> {
        self.cells[pos.y][pos.x]
    }

    /// Value at `pos`, 0 when empty.
    pub fn value_at(&self, pos: Position) -> u32 {
        self.tile_at(pos).map_or(0, |t| t.value())
    }

    /// Tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().flatten().filter_map(|c| *c)
    }

    /// Row-major matrix of values, 0 for empty cells.
    pub fn values(&self) -> [[u32; GRID_SIZE]; GRID_SIZE] {
        let mut out = [[0; GRID_SIZE]; GRID_SIZE];
        for (y, row) in self.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                out[y][x] = cell.map_or(0, |t| t.value());
            }
        }
        out
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        let mut cells = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                if self.cells[y][x].is_none() {
                    cells.push(Position::new(x, y));
                }
            }
        }
        cells
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.empty_count() == GRID_SIZE * GRID_SIZE
    }

    /// Largest tile value, 0 on an empty board.
    pub fn max_tile(&self) -> u32 {
        self.tiles().map(|t| t.value()).max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn total(&self) -> u64 {
        self.tiles().map(|t| u64::from(t.value())).sum()
    }

    pub fn contains_value(&self, value: u32) -> bool {
        self.tiles().any(|t| t.value() == value)
    }

    /// Whether any cell differs in tile identity or value.
    pub fn differs_from(&self, other: &Grid) -> bool {
        let key = |c: &Option<Tile>| c.map(|t| (t.id(), t.value()));
        self.cells
            .iter()
            .flatten()
            .zip(other.cells.iter().flatten())
            .any(|(a, b)| key(a) != key(b))
    }

    /// Every tile's stored position matches its slot.
    pub fn positions_consistent(&self) -> bool {
        self.cells.iter().enumerate().all(|(y, row)| {
            row.iter()
                .enumerate()
                .all(|(x, cell)| cell.map_or(true, |t| t.position() == Position::new(x, y)))
        })
    }

    pub(crate) fn set(&mut self, pos: Position, cell: Option<Tile>) {
        self.cells[pos.y][pos.x] = cell;
    }

    pub(crate) fn alloc_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::EMPTY
    }
}

/// Grids compare by cell values only; ids and spawn flags are ignored.
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

impl Eq for Grid {}

/// Parses rows separated by `/` or newlines, cells separated by whitespace
/// or commas. `0` and `.` mark empty cells.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .split(|c| c == '/' || c == '\n')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect();
        if rows.len() != GRID_SIZE {
            return Err(GridError::RowCount { found: rows.len() });
        }

        let mut values = [[0u32; GRID_SIZE]; GRID_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let tokens: Vec<&str> = row
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.len() != GRID_SIZE {
                return Err(GridError::RowLength {
                    row: y,
                    found: tokens.len(),
                });
            }
            for (x, token) in tokens.iter().enumerate() {
                values[y][x] = match *token {
                    "." => 0,
                    t => t.parse().map_err(|_| GridError::BadCell {
                        token: t.to_string(),
                    })?,
                };
            }
        }
        Grid::from_values(values)
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Grid {{")?;
        for row in self.values() {
            for val in row {
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "+------+------+------+------+")?;
        for row in self.values() {
            write!(f, "|")?;
            for val in row {
                if val == 0 {
                    write!(f, "      |")?;
                } else {
                    write!(f, "{:^6}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "+------+------+------+------+")?;
        }
        Ok(())
    }
}
