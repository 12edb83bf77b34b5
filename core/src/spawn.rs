//! Random tile spawning.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::Grid;
use crate::tile::{Position, TileId};

/// Chance that a spawned tile is a 2 rather than a 4.
pub const SPAWN_TWO_PROBABILITY: f64 = 0.9;

/// Where and what to spawn, chosen but not yet placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub position: Position,
    pub value: u32,
}

/// A tile placed on the board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnEvent {
    pub id: TileId,
    pub position: Position,
    pub value: u32,
}

impl Spawn {
    /// Place the tile, returning the new grid and the event describing it.
    pub fn apply(&self, grid: &Grid) -> (Grid, SpawnEvent) {
        let (next, id) = grid.place(self.position, self.value);
        let event = SpawnEvent {
            id,
            position: self.position,
            value: self.value,
        };
        (next, event)
    }
}

/// 2 with probability 0.9, otherwise 4.
pub fn random_tile_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen::<f64>() < SPAWN_TWO_PROBABILITY {
        2
    } else {
        4
    }
}

/// A uniformly chosen empty cell, or None on a full board.
pub fn random_empty_cell<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Position> {
    grid.empty_cells().choose(rng).copied()
}

/// Pick a spawn for `grid`: a uniform empty cell and a 2 (90%) or 4 (10%).
pub fn spawn_tile<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Spawn> {
    let position = random_empty_cell(grid, rng)?;
    let value = random_tile_value(rng);
    log::trace!("spawn {} at ({}, {})", value, position.x, position.y);
    Some(Spawn { position, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_on_full_board() {
        let full = Grid::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]])
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(spawn_tile(&full, &mut rng), None);
    }

    #[test]
    fn test_spawn_targets_only_empty_cell() {
        let grid = Grid::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]])
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let spawn = spawn_tile(&grid, &mut rng).unwrap();
            assert_eq!(spawn.position, Position::new(2, 2));
            assert!(spawn.value == 2 || spawn.value == 4);
        }
    }

    #[test]
    fn test_spawn_value_distribution() {
        let mut rng = SmallRng::seed_from_u64(2048);
        let n = 20_000;
        let twos = (0..n).filter(|_| random_tile_value(&mut rng) == 2).count();
        let ratio = twos as f64 / n as f64;
        assert!((0.88..0.92).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn test_apply_reports_new_tile() {
        let spawn = Spawn {
            position: Position::new(1, 3),
            value: 4,
        };
        let (grid, event) = spawn.apply(&Grid::EMPTY);
        let tile = grid.tile_at(Position::new(1, 3)).unwrap();
        assert_eq!(tile.id(), event.id);
        assert_eq!(tile.value(), 4);
        assert!(tile.is_new());
    }

    #[test]
    fn test_spawn_is_deterministic_per_seed() {
        let a = spawn_tile(&Grid::EMPTY, &mut SmallRng::seed_from_u64(99));
        let b = spawn_tile(&Grid::EMPTY, &mut SmallRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
