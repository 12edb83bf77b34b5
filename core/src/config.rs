//! Tunable knobs for the search, the evaluator and the game session.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! gives the stock behaviour:
//!
//! ```toml
//! [search]
//! depth = 3
//! candidate_limit = 3
//!
//! [weights]
//! empty = 500.0
//! max_tile = 1000.0
//! corner = 2000.0
//! monotonicity = 1000.0
//! smoothness = 10.0
//!
//! [game]
//! history_limit = 5
//! win_value = 2048
//!
//! [autoplay]
//! pacing_ms = 100
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub weights: Weights,
    pub game: GameConfig,
    pub autoplay: AutoPlayConfig,
}

/// Expectimax search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched from the root, counting both move and spawn layers.
    pub depth: u32,
    /// Most empty cells examined per chance node; more are sampled down.
    pub candidate_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            candidate_limit: 3,
        }
    }
}

/// Heuristic weights. `smoothness` is a penalty scale; its sign is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub empty: f64,
    pub max_tile: f64,
    pub corner: f64,
    pub monotonicity: f64,
    pub smoothness: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            empty: 500.0,
            max_tile: 1000.0,
            corner: 2000.0,
            monotonicity: 1000.0,
            smoothness: 10.0,
        }
    }
}

/// Upper bound on `game.history_limit`.
pub const MAX_HISTORY_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Snapshots kept for undo.
    pub history_limit: usize,
    /// Reaching this tile for the first time wins the game.
    pub win_value: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            history_limit: 5,
            win_value: 2048,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutoPlayConfig {
    /// Delay between automated moves.
    pub pacing_ms: u64,
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self { pacing_ms: 100 }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.depth == 0 {
            return Err(ConfigError::Invalid("search.depth must be at least 1".into()));
        }
        if self.search.candidate_limit == 0 {
            return Err(ConfigError::Invalid(
                "search.candidate_limit must be at least 1".into(),
            ));
        }
        let win = self.game.win_value;
        if win < 4 || !win.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "game.win_value must be a power of two of at least 4, got {win}"
            )));
        }
        if self.game.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "game.history_limit must be at most {MAX_HISTORY_LIMIT}, got {}",
                self.game.history_limit
            )));
        }
        let w = &self.weights;
        let all = [w.empty, w.max_tile, w.corner, w.monotonicity, w.smoothness];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("weights must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.search.depth, 3);
        assert_eq!(cfg.search.candidate_limit, 3);
        assert_eq!(cfg.weights.corner, 2000.0);
        assert_eq!(cfg.game.history_limit, 5);
        assert_eq!(cfg.game.win_value, 2048);
        assert_eq!(cfg.autoplay.pacing_ms, 100);
    }

    #[test]
    fn test_partial_override() {
        let cfg = Config::from_toml_str(
            r#"
            [search]
            depth = 5

            [weights]
            smoothness = -10.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.search.depth, 5);
        assert_eq!(cfg.search.candidate_limit, 3);
        assert_eq!(cfg.weights.smoothness, -10.0);
        assert_eq!(cfg.weights.empty, 500.0);
    }

    #[test]
    fn test_rejects_zero_depth() {
        let err = Config::from_toml_str("[search]\ndepth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_win_value() {
        let err = Config::from_toml_str("[game]\nwin_value = 1000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_huge_history_limit() {
        let toml = "[game]\nhistory_limit = 9223372036854775807\n";
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let cfg = Config::from_toml_str("[game]\nhistory_limit = 1000\n").unwrap();
        assert_eq!(cfg.game.history_limit, MAX_HISTORY_LIMIT);
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Config::from_toml_str("[search\ndepth = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_toml("/nonexistent/merge2048.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
