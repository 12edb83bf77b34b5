//! A game session: grid, score, best score, status and undo history.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::grid::Grid;
use crate::legal::{has_legal_move, legal_directions};
use crate::merge::{resolve_move, MergeEvent};
use crate::spawn::{random_empty_cell, spawn_tile, Spawn, SpawnEvent};
use crate::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Playing,
    /// The win tile appeared. Moves are still accepted.
    Won,
    Lost,
}

/// A point in the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub grid: Grid,
    pub score: u32,
}

/// Result of executing a step (move) in the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub moved: bool,
    /// Points earned from merges in this move.
    pub reward: u32,
    /// Status after the move.
    pub status: Status,
    pub merges: Vec<MergeEvent>,
    pub spawn: Option<SpawnEvent>,
}

impl StepResult {
    fn unchanged(status: Status) -> Self {
        Self {
            moved: false,
            reward: 0,
            status,
            merges: Vec::new(),
            spawn: None,
        }
    }
}

#[derive(Clone)]
pub struct Game {
    grid: Grid,
    score: u32,
    best_score: u32,
    status: Status,
    history: VecDeque<Snapshot>,
    config: GameConfig,
    rng: SmallRng,
}

impl Game {
    /// Create a new game with the given seed.
    ///
    /// The game starts with two tiles: the first is always a 2, the second
    /// is a 2 (90%) or a 4 (10%).
    pub fn new(seed: u64) -> Self {
        Self::with_config(GameConfig::default(), seed)
    }

    pub fn with_config(config: GameConfig, seed: u64) -> Self {
        let mut game = Game {
            grid: Grid::EMPTY,
            score: 0,
            best_score: 0,
            status: Status::Playing,
            history: VecDeque::new(),
            config,
            rng: SmallRng::seed_from_u64(seed),
        };
        game.start();
        game
    }

    /// Resume from a saved grid and score. The status is Lost when the grid
    /// has no legal move, otherwise Playing; history starts empty.
    pub fn from_snapshot(
        config: GameConfig,
        snapshot: Snapshot,
        best_score: u32,
        seed: u64,
    ) -> Self {
        let status = if has_legal_move(&snapshot.grid) {
            Status::Playing
        } else {
            Status::Lost
        };
        Game {
            grid: snapshot.grid,
            score: snapshot.score,
            best_score: best_score.max(snapshot.score),
            status,
            history: VecDeque::new(),
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Reset to a fresh board with a new seed. The best score is kept.
    pub fn reset(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
        self.start();
    }

    fn start(&mut self) {
        self.grid = Grid::EMPTY;
        self.score = 0;
        self.status = Status::Playing;
        self.history.clear();

        if let Some(position) = random_empty_cell(&self.grid, &mut self.rng) {
            self.grid = Spawn { position, value: 2 }.apply(&self.grid).0;
        }
        if let Some(spawn) = spawn_tile(&self.grid, &mut self.rng) {
            self.grid = spawn.apply(&self.grid).0;
        }
    }

    /// Execute a move in the given direction.
    ///
    /// A move that changes nothing, or any move once the game is lost,
    /// leaves the game untouched and spawns nothing.
    pub fn step(&mut self, direction: Direction) -> StepResult {
        if self.status == Status::Lost {
            return StepResult::unchanged(self.status);
        }

        let outcome = resolve_move(&self.grid, direction);
        if !outcome.moved {
            return StepResult::unchanged(self.status);
        }

        self.history.push_front(Snapshot {
            grid: self.grid,
            score: self.score,
        });
        self.history.truncate(self.config.history_limit);

        let had_win_tile = self.grid.contains_value(self.config.win_value);
        let mut grid = outcome.grid;
        let mut spawned = None;
        if let Some(spawn) = spawn_tile(&grid, &mut self.rng) {
            let (next, event) = spawn.apply(&grid);
            grid = next;
            spawned = Some(event);
        }
        self.grid = grid;
        self.score += outcome.score;
        self.best_score = self.best_score.max(self.score);

        let previous = self.status;
        if !had_win_tile && self.grid.contains_value(self.config.win_value) {
            self.status = Status::Won;
        } else if !has_legal_move(&self.grid) {
            self.status = Status::Lost;
        }
        if self.status != previous {
            log::info!(
                "game {:?} -> {:?} at score {} (max tile {})",
                previous,
                self.status,
                self.score,
                self.max_tile()
            );
        }

        StepResult {
            moved: true,
            reward: outcome.score,
            status: self.status,
            merges: outcome.merges,
            spawn: spawned,
        }
    }

    /// Step back to the most recent snapshot. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop_front() else {
            return false;
        };
        self.grid = snapshot.grid;
        self.score = snapshot.score;
        self.status = Status::Playing;
        true
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            score: self.score,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Check if the game is over (no legal moves available).
    pub fn is_over(&self) -> bool {
        self.status == Status::Lost
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Legal directions as a boolean array [Up, Down, Left, Right].
    pub fn legal_directions(&self) -> [bool; 4] {
        legal_directions(&self.grid)
    }

    pub fn max_tile(&self) -> u32 {
        self.grid.max_tile()
    }

    pub fn empty_count(&self) -> usize {
        self.grid.empty_count()
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Game {{ score: {}, best: {}, status: {:?} }}",
            self.score, self.best_score, self.status
        )?;
        write!(f, "{:?}", self.grid)
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Score: {}   Best: {}", self.score, self.best_score)?;
        write!(f, "{}", self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Position;

    fn grid(values: [[u32; 4]; 4]) -> Grid {
        Grid::from_values(values).unwrap()
    }

    const LOST: [[u32; 4]; 4] = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];

    /// Play the first legal direction in a fixed cycle; None when stuck.
    fn play_any(game: &mut Game, turn: usize) -> Option<StepResult> {
        let order = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
        let legal = game.legal_directions();
        (0..4)
            .map(|i| order[(turn + i) % 4])
            .find(|d| legal[*d as usize])
            .map(|d| game.step(d))
    }

    // -------------------------------------------------------------------------
    // Start and determinism
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_game_has_two_tiles() {
        for seed in 0..50 {
            let game = Game::new(seed);
            let values: Vec<u32> = game.grid().tiles().map(|t| t.value()).collect();
            assert_eq!(values.len(), 2);
            assert!(values.contains(&2), "first seed tile is always a 2");
            assert!(values.iter().all(|&v| v == 2 || v == 4));
            assert_eq!(game.status(), Status::Playing);
            assert_eq!(game.score(), 0);
            assert_eq!(game.history_len(), 0);
        }
    }

    #[test]
    fn test_spawn_determinism() {
        let game1 = Game::new(12345);
        let game2 = Game::new(12345);
        assert_eq!(game1.grid(), game2.grid());
    }

    #[test]
    fn test_step_determinism() {
        let mut game1 = Game::new(54321);
        let mut game2 = Game::new(54321);
        for action in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            game1.step(action);
            game2.step(action);
            assert_eq!(game1.grid(), game2.grid());
            assert_eq!(game1.score(), game2.score());
        }
    }

    #[test]
    fn test_different_seeds_different_games() {
        let differs = (0..10).any(|s| Game::new(s).grid() != Game::new(s + 100).grid());
        assert!(differs);
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    #[test]
    fn test_step_merges_scores_and_spawns() {
        let mut game = Game::new(0);
        game.grid = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let result = game.step(Direction::Left);

        assert!(result.moved);
        assert_eq!(result.reward, 4);
        assert_eq!(result.merges.len(), 1);
        assert_eq!(game.score(), 4);
        assert_eq!(game.best_score(), 4);

        let spawn = result.spawn.unwrap();
        let tile = game.grid().tile_at(spawn.position).unwrap();
        assert_eq!(tile.id(), spawn.id);
        assert!(tile.is_new());
        assert_eq!(game.grid().tiles().count(), 2);
        assert_eq!(game.grid().value_at(Position::new(0, 0)), 4);
    }

    #[test]
    fn test_step_no_change_no_spawn() {
        let mut game = Game::new(0);
        game.grid = grid([[2, 0, 0, 0], [4, 0, 0, 0], [8, 0, 0, 0], [16, 0, 0, 0]]);
        let old = game.grid;
        let result = game.step(Direction::Left);

        assert!(!result.moved);
        assert_eq!(result.reward, 0);
        assert!(result.spawn.is_none());
        assert_eq!(game.grid, old);
        assert_eq!(game.history_len(), 0);
    }

    #[test]
    fn test_win_detected_once() {
        let mut game = Game::new(3);
        game.grid = grid([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let result = game.step(Direction::Left);
        assert_eq!(result.status, Status::Won);
        assert_eq!(game.status(), Status::Won);

        // Play continues after winning.
        let next = play_any(&mut game, 0).unwrap();
        assert!(next.moved);
        assert_eq!(next.status, Status::Won);
    }

    #[test]
    fn test_custom_win_value() {
        let config = GameConfig {
            history_limit: 5,
            win_value: 16,
        };
        let mut game = Game::with_config(config, 3);
        game.grid = grid([[8, 8, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(game.step(Direction::Left).status, Status::Won);
    }

    #[test]
    fn test_large_history_limit_is_not_preallocated() {
        let config = GameConfig {
            history_limit: usize::MAX,
            win_value: 2048,
        };
        let mut game = Game::with_config(config, 8);
        assert_eq!(game.history_len(), 0);
        let result = play_any(&mut game, 0).unwrap();
        assert!(result.moved);
        assert_eq!(game.history_len(), 1);
    }

    #[test]
    fn test_lost_snapshot_rejects_moves() {
        let snapshot = Snapshot {
            grid: grid(LOST),
            score: 120,
        };
        let mut game = Game::from_snapshot(GameConfig::default(), snapshot, 80, 1);
        assert_eq!(game.status(), Status::Lost);
        assert!(game.is_over());
        assert_eq!(game.best_score(), 120);
        for dir in Direction::all() {
            let result = game.step(dir);
            assert!(!result.moved);
            assert_eq!(result.status, Status::Lost);
        }
        assert_eq!(game.grid().values(), LOST);
    }

    #[test]
    fn test_game_runs_to_loss() {
        let mut game = Game::new(2024);
        let mut turn = 0;
        while !game.is_over() && turn < 10_000 {
            match play_any(&mut game, turn) {
                Some(result) => assert!(result.moved),
                None => break,
            }
            turn += 1;
        }
        assert!(game.is_over());
        assert!(!has_legal_move(game.grid()));
        assert_eq!(game.legal_directions(), [false; 4]);
        assert!(game.best_score() >= game.score());
    }

    // -------------------------------------------------------------------------
    // Undo
    // -------------------------------------------------------------------------

    #[test]
    fn test_undo_restores_previous_state() {
        let mut game = Game::new(0);
        game.grid = grid([[2, 2, 0, 0], [0, 0, 4, 0], [0; 4], [0; 4]]);
        let before = game.snapshot();
        game.step(Direction::Left);
        assert_eq!(game.history_len(), 1);

        assert!(game.undo());
        assert_eq!(game.snapshot(), before);
        assert!(!game.grid().differs_from(&before.grid));
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.history_len(), 0);
        // Best score survives an undo.
        assert_eq!(game.best_score(), 4);

        assert!(!game.undo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut game = Game::new(77);
        let mut moves = 0;
        let mut turn = 0;
        while moves < 8 {
            let result = play_any(&mut game, turn).unwrap();
            if result.moved {
                moves += 1;
            }
            turn += 1;
        }
        assert_eq!(game.history_len(), 5);
        for _ in 0..5 {
            assert!(game.undo());
        }
        assert!(!game.undo());
    }

    #[test]
    fn test_undo_after_loss_resumes_play() {
        let mut game = Game::new(2024);
        let mut turn = 0;
        while !game.is_over() {
            if play_any(&mut game, turn).is_none() {
                break;
            }
            turn += 1;
        }
        assert!(game.undo());
        assert_eq!(game.status(), Status::Playing);
    }

    // -------------------------------------------------------------------------
    // Reset and formatting
    // -------------------------------------------------------------------------

    #[test]
    fn test_reset() {
        let mut game = Game::new(42);
        game.grid = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        game.step(Direction::Left);
        let best = game.best_score();
        assert!(best > 0);

        game.reset(42);
        let fresh = Game::new(42);
        assert_eq!(game.grid(), fresh.grid());
        assert_eq!(game.score(), 0);
        assert_eq!(game.best_score(), best);
        assert_eq!(game.history_len(), 0);
    }

    #[test]
    fn test_display_format() {
        let game = Game::new(42);
        let display = format!("{}", game);
        assert!(display.contains("Score:"));
        assert!(display.contains("+------+"));
    }

    #[test]
    fn test_debug_format() {
        let game = Game::new(42);
        let debug = format!("{:?}", game);
        assert!(debug.contains("Game"));
        assert!(debug.contains("score"));
    }
}
