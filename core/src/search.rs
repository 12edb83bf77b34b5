//! Expectimax move selection.
//!
//! The tree alternates max nodes (the player picks the best of the four
//! directions) with chance nodes (a 2 or 4 appears in an empty cell). To keep
//! branching bounded, a chance node looks at no more than
//! [`SearchConfig::candidate_limit`] empty cells, sampled at random when more
//! are available. Depth counts both layers: the default depth of 3 is
//! move, spawn, move, then a static evaluation.
//!
//! ```rust
//! use merge2048_core::{Expectimax, Grid};
//!
//! let grid: Grid = "2 2 0 0 / 0 0 0 0 / 0 0 0 0 / 0 0 0 0".parse().unwrap();
//! let mut ai = Expectimax::seeded(42);
//! assert!(ai.select_move(&grid).is_some());
//! ```

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{Config, SearchConfig, Weights};
use crate::grid::Grid;
use crate::heuristic::evaluate_with;
use crate::merge::resolve_move;
use crate::spawn::SPAWN_TWO_PROBABILITY;
use crate::tile::Position;
use crate::Direction;

/// Value of a max node with no legal move.
pub const LOSS_VALUE: f64 = -100_000.0;

/// Basic search stats for a single move selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    /// Deepest root iteration that ran to completion.
    pub completed_depth: u32,
}

pub struct Expectimax<R = SmallRng> {
    config: SearchConfig,
    weights: Weights,
    rng: R,
    stats: SearchStats,
    deadline: Option<Instant>,
    expired: bool,
}

impl Expectimax<SmallRng> {
    /// Default settings with a seeded generator for chance-node sampling.
    pub fn seeded(seed: u64) -> Self {
        Self::new(
            SearchConfig::default(),
            Weights::default(),
            SmallRng::seed_from_u64(seed),
        )
    }

    pub fn from_config(config: &Config, seed: u64) -> Self {
        Self::new(config.search, config.weights, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Expectimax<R> {
    /// # Panics
    ///
    /// Panics if `config.depth` or `config.candidate_limit` is 0, the same
    /// settings [`Config::validate`] rejects.
    pub fn new(config: SearchConfig, weights: Weights, rng: R) -> Self {
        assert!(config.depth >= 1, "search depth must be at least 1");
        assert!(config.candidate_limit >= 1, "candidate limit must be at least 1");
        Self {
            config,
            weights,
            rng,
            stats: SearchStats::default(),
            deadline: None,
            expired: false,
        }
    }

    /// Stats from the most recent selection.
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Best direction for `grid` at the configured depth, or None when no
    /// direction changes the grid.
    ///
    /// Ties keep the first direction in Up, Down, Left, Right order.
    pub fn select_move(&mut self, grid: &Grid) -> Option<Direction> {
        let started = Instant::now();
        self.stats = SearchStats::default();
        self.deadline = None;
        self.expired = false;

        let best = self.root(grid, self.config.depth);
        self.stats.completed_depth = self.config.depth;
        self.log_result(best, started);
        best.map(|(dir, _)| dir)
    }

    /// Iterative deepening from depth 1 up to the configured depth, giving
    /// up on the iteration in progress once `budget` runs out.
    ///
    /// Depth 1 never expands past a single static evaluation per move, so a
    /// move is returned whenever one exists, however small the budget.
    pub fn select_move_within(&mut self, grid: &Grid, budget: Duration) -> Option<Direction> {
        let started = Instant::now();
        self.stats = SearchStats::default();
        self.deadline = Some(started + budget);
        self.expired = false;

        let mut best = None;
        for depth in 1..=self.config.depth {
            let result = self.root(grid, depth);
            if self.expired && depth > 1 {
                break;
            }
            best = result;
            self.stats.completed_depth = depth;
            if best.is_none() || self.expired {
                break;
            }
        }
        self.deadline = None;
        self.log_result(best, started);
        best.map(|(dir, _)| dir)
    }

    fn log_result(&self, best: Option<(Direction, f64)>, started: Instant) {
        match best {
            Some((dir, value)) => log::debug!(
                "expectimax chose {} (value {:.1}) depth {} nodes {} in {:?}",
                dir,
                value,
                self.stats.completed_depth,
                self.stats.nodes,
                started.elapsed()
            ),
            None => log::debug!("expectimax found no legal move"),
        }
    }

    fn root(&mut self, grid: &Grid, depth: u32) -> Option<(Direction, f64)> {
        let mut best: Option<(Direction, f64)> = None;
        for dir in Direction::all() {
            let outcome = resolve_move(grid, dir);
            if !outcome.moved {
                continue;
            }
            let value = self.chance_node(&outcome.grid, depth - 1);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((dir, value));
            }
        }
        best
    }

    /// Node entry bookkeeping. Returns true when the node must be cut off
    /// and evaluated statically.
    fn enter(&mut self, depth: u32) -> bool {
        self.stats.nodes += 1;
        if let Some(deadline) = self.deadline {
            if !self.expired && Instant::now() >= deadline {
                self.expired = true;
            }
        }
        depth == 0 || self.expired
    }

    fn max_node(&mut self, grid: &Grid, depth: u32) -> f64 {
        if self.enter(depth) {
            return evaluate_with(grid, &self.weights);
        }

        let mut best = f64::NEG_INFINITY;
        let mut has_move = false;
        for dir in Direction::all() {
            let outcome = resolve_move(grid, dir);
            if !outcome.moved {
                continue;
            }
            has_move = true;
            best = best.max(self.chance_node(&outcome.grid, depth - 1));
        }

        if has_move {
            best
        } else {
            LOSS_VALUE
        }
    }

    fn chance_node(&mut self, grid: &Grid, depth: u32) -> f64 {
        if self.enter(depth) {
            return evaluate_with(grid, &self.weights);
        }

        let mut empties = grid.empty_cells();
        if empties.is_empty() {
            return evaluate_with(grid, &self.weights);
        }
        let limit = self.config.candidate_limit;
        if empties.len() > limit {
            empties = empties
                .choose_multiple(&mut self.rng, limit)
                .copied()
                .collect::<Vec<Position>>();
        }

        let mut total = 0.0;
        for &pos in &empties {
            let two = self.max_node(&grid.with_tile(pos, 2), depth - 1);
            let four = self.max_node(&grid.with_tile(pos, 4), depth - 1);
            total += SPAWN_TWO_PROBABILITY * two + (1.0 - SPAWN_TWO_PROBABILITY) * four;
        }
        total / empties.len() as f64
    }
}

/// One-shot selection with default settings and the caller's generator.
pub fn select_move<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Direction> {
    Expectimax::new(SearchConfig::default(), Weights::default(), rng).select_move(grid)
}
