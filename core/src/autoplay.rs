//! Hands a [`Game`] to the expectimax searcher one move at a time.
//!
//! The driver owns no clock; callers decide the cadence (the CLI sleeps
//! `pacing_ms` between ticks).

use std::time::Duration;

use rand::Rng;

use crate::config::Config;
use crate::game::{Game, Status, StepResult};
use crate::search::Expectimax;
use crate::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The game is won or lost.
    NotPlaying(Status),
    /// The searcher found no direction that changes the grid.
    NoMove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoTick {
    Moved {
        direction: Direction,
        result: StepResult,
    },
    Stopped(StopReason),
}

pub struct AutoPlay<R = rand::rngs::SmallRng> {
    searcher: Expectimax<R>,
    budget: Option<Duration>,
}

impl AutoPlay {
    pub fn from_config(config: &Config, seed: u64) -> Self {
        Self::new(Expectimax::from_config(config, seed))
    }
}

impl<R: Rng> AutoPlay<R> {
    pub fn new(searcher: Expectimax<R>) -> Self {
        Self {
            searcher,
            budget: None,
        }
    }

    /// Cap each move's search time; the searcher deepens iteratively.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn searcher(&self) -> &Expectimax<R> {
        &self.searcher
    }

    /// Search the current grid and play the result.
    pub fn tick(&mut self, game: &mut Game) -> AutoTick {
        if game.status() != Status::Playing {
            return AutoTick::Stopped(StopReason::NotPlaying(game.status()));
        }
        let choice = match self.budget {
            Some(budget) => self.searcher.select_move_within(game.grid(), budget),
            None => self.searcher.select_move(game.grid()),
        };
        let Some(direction) = choice else {
            return AutoTick::Stopped(StopReason::NoMove);
        };
        let result = game.step(direction);
        AutoTick::Moved { direction, result }
    }

    /// Tick until the driver stops or `max_moves` moves have been played.
    /// Returns the number of moves played.
    pub fn run(&mut self, game: &mut Game, max_moves: usize) -> usize {
        let mut moves = 0;
        while moves < max_moves {
            match self.tick(game) {
                AutoTick::Moved { .. } => moves += 1,
                AutoTick::Stopped(reason) => {
                    log::debug!("autoplay stopped after {} moves: {:?}", moves, reason);
                    break;
                }
            }
        }
        moves
    }
}
