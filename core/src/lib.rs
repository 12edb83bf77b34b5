//! # 2048 Decision Core
//!
//! The grid-transition engine and look-ahead move selection for the 2048
//! sliding-tile puzzle. Every operation is a pure function over a `Copy`
//! [`Grid`] value, so callers can keep old snapshots around (for undo, say)
//! without aliasing. Randomness (tile spawns, chance-node sampling) always
//! comes from an explicit seedable generator.
//!
//! ## Example
//!
//! ```rust
//! use merge2048_core::{has_legal_move, resolve_move, Direction, Grid};
//!
//! let grid: Grid = "2 0 0 2 / 0 2 0 0 / 2 2 0 0 / 2 2 2 2".parse().unwrap();
//! let outcome = resolve_move(&grid, Direction::Left);
//! assert!(outcome.moved);
//! assert_eq!(outcome.score, 16);
//! assert!(has_legal_move(&outcome.grid));
//! ```
//!
//! A full session with undo, best score and win/loss tracking lives in
//! [`Game`]; [`AutoPlay`] drives a game with the expectimax searcher.

pub mod autoplay;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod heuristic;
pub mod legal;
pub mod merge;
pub mod search;
pub mod spawn;
pub mod tile;

pub use autoplay::{AutoPlay, AutoTick, StopReason};
pub use config::{AutoPlayConfig, Config, ConfigError, GameConfig, SearchConfig, Weights};
pub use error::GridError;
pub use game::{Game, Snapshot, Status, StepResult};
pub use grid::Grid;
pub use heuristic::{evaluate, evaluate_with};
pub use legal::{has_legal_move, legal_directions};
pub use merge::{resolve_move, MergeEvent, MoveOutcome};
pub use search::{select_move, Expectimax, SearchStats};
pub use spawn::{spawn_tile, Spawn, SpawnEvent};
pub use tile::{Position, Tile, TileId};

/// Side length of the board. Only 4x4 boards are supported.
pub const GRID_SIZE: usize = 4;

/// The four possible move directions.
///
/// The discriminant order (Up, Down, Left, Right) is also the order in
/// which the search enumerates moves, which decides ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// All four directions in enumeration order.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    /// Whether tiles travel towards index 0 of their line (Up, Left).
    pub fn towards_start(self) -> bool {
        matches!(self, Direction::Up | Direction::Left)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}
