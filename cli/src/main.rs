//! # merge2048 CLI
//!
//! Play 2048 in the terminal, watch the expectimax AI play, ask it for a
//! single move, or run headless simulations with configurable policies.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use merge2048_core::{
    AutoPlay, AutoTick, Config, Direction, Expectimax, Game, Grid, Status, StopReason,
};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(name = "merge2048")]
#[command(author, version, about = "Play 2048 in the terminal, watch the AI, or run simulations")]
struct Args {
    /// Run in interactive mode (default if no other mode specified)
    #[arg(short, long)]
    interactive: bool,

    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "expectimax")]
    policy: Policy,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// TOML file with search, weight, game and autoplay settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the search depth from the config
    #[arg(long)]
    depth: Option<u32>,

    /// Per-move search budget in milliseconds (iterative deepening)
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Watch the AI play one game
    #[arg(long)]
    autoplay: bool,

    /// Override the delay between AI moves in autoplay mode
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Print the AI's move for a board such as "2 2 0 0 / 0 4 0 0 / ..."
    #[arg(long, value_name = "BOARD")]
    suggest: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random valid moves
    Random,
    /// Cycle through actions: Left, Down, Right, Up
    Cycle,
    /// Expectimax search
    Expectimax,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(board) = &args.suggest {
        run_suggest(&args, &config, board)
    } else if args.autoplay {
        run_autoplay(&args, &config)
    } else if let Some(episodes) = args.episodes {
        run_headless(&args, &config, episodes)
    } else {
        run_interactive(&args, &config)
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(depth) = args.depth {
        config.search.depth = depth;
    }
    if let Some(pacing) = args.pacing_ms {
        config.autoplay.pacing_ms = pacing;
    }
    config.validate().context("invalid settings")?;
    log::debug!("config: {:?}", config);
    Ok(config)
}

fn budget(args: &Args) -> Option<Duration> {
    args.budget_ms.map(Duration::from_millis)
}

/// Suggest a single move for a board given on the command line.
fn run_suggest(args: &Args, config: &Config, board: &str) -> Result<()> {
    let grid: Grid = board
        .parse()
        .with_context(|| format!("parsing board {board:?}"))?;
    let mut ai = Expectimax::from_config(config, args.seed);
    let started = Instant::now();
    let choice = ai_move(&mut ai, &grid, budget(args));
    let stats = ai.last_stats();

    print!("{grid}");
    match choice {
        Some(dir) => println!("move={dir}"),
        None => println!("move=none"),
    }
    println!("nodes={}", stats.nodes);
    println!("depth={}", stats.completed_depth);
    println!("elapsed_ms={}", started.elapsed().as_millis());
    Ok(())
}

/// Watch the AI play a single game at the configured pace.
fn run_autoplay(args: &Args, config: &Config) -> Result<()> {
    let mut game = Game::with_config(config.game, args.seed);
    let mut auto = AutoPlay::from_config(config, args.seed);
    if let Some(budget) = budget(args) {
        auto = auto.with_budget(budget);
    }
    let pacing = Duration::from_millis(config.autoplay.pacing_ms);
    let mut steps = 0u32;

    redraw(&game, "Watching the AI | Ctrl+C to stop")?;
    loop {
        if args.max_steps != 0 && steps >= args.max_steps {
            break;
        }
        match auto.tick(&mut game) {
            AutoTick::Moved { direction, result } => {
                steps += 1;
                redraw(&game, "Watching the AI | Ctrl+C to stop")?;
                println!("  Step {steps}: {direction}");
                if result.reward > 0 {
                    println!("  +{} points!", result.reward);
                }
            }
            AutoTick::Stopped(StopReason::NotPlaying(Status::Won)) => {
                println!("\n  *** 2048! The AI wins ***");
                break;
            }
            AutoTick::Stopped(reason) => {
                log::debug!("autoplay stopped: {:?}", reason);
                println!("\n  *** GAME OVER ***");
                break;
            }
        }
        thread::sleep(pacing);
    }
    println!("  Final Score: {}", game.score());
    println!("  Max Tile: {}", game.max_tile());
    println!("  Steps: {steps}");
    Ok(())
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(args: &Args, config: &Config) -> Result<()> {
    const CONTROLS: &str = "WASD or Arrow Keys | U undo | H hint | R restart | Q quit";

    let _raw = RawMode::enable();
    let mut game = Game::with_config(config.game, args.seed);
    let mut hinter = Expectimax::from_config(config, args.seed);
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    redraw(&game, CONTROLS)?;

    loop {
        let bytes_read = stdin.read(&mut buffer).context("reading keyboard input")?;
        if bytes_read == 0 {
            return Ok(());
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(dir) => {
                if game.is_over() {
                    continue;
                }
                let before = game.status();
                let result = game.step(dir);
                if !result.moved {
                    continue;
                }
                redraw(&game, CONTROLS)?;
                if result.reward > 0 {
                    println!("  +{} points!", result.reward);
                }
                if before != Status::Won && game.status() == Status::Won {
                    println!("\n  *** YOU WIN! Keep going or press R ***");
                }
                if game.is_over() {
                    println!("\n  *** GAME OVER ***");
                    println!("  Final Score: {}", game.score());
                    println!("  Max Tile: {}", game.max_tile());
                    println!("\n  Press U to undo, R to restart or Q to quit");
                }
            }
            InputAction::Undo => {
                if game.undo() {
                    redraw(&game, CONTROLS)?;
                }
            }
            InputAction::Hint => match hinter.select_move(game.grid()) {
                Some(dir) => println!("  Hint: {dir}"),
                None => println!("  Hint: no moves left"),
            },
            InputAction::Restart => {
                game.reset(args.seed);
                redraw(&game, CONTROLS)?;
            }
            InputAction::Quit => {
                println!("\nGoodbye!");
                return Ok(());
            }
            InputAction::None => {}
        }
    }
}

/// Run headless simulation mode.
fn run_headless(args: &Args, config: &Config, episodes: u32) -> Result<()> {
    if episodes == 0 {
        bail!("--episodes must be at least 1");
    }

    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut max_tiles: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut wins = 0u32;

    // Separate RNG for action selection
    let mut action_rng = SmallRng::seed_from_u64(args.seed.wrapping_add(1000));
    let mut ai = Expectimax::from_config(config, args.seed);
    let started = Instant::now();

    for episode in 0..episodes {
        let episode_seed = args.seed.wrapping_add(u64::from(episode));
        let mut game = Game::with_config(config.game, episode_seed);
        let mut steps = 0;
        let mut action_cycle = 0;
        let mut won = false;

        while !game.is_over() && (args.max_steps == 0 || steps < args.max_steps) {
            let action = match args.policy {
                Policy::Random => select_random_action(&game, &mut action_rng),
                Policy::Cycle => select_cycle_action(&game, &mut action_cycle),
                Policy::Expectimax => ai_move(&mut ai, game.grid(), budget(args)),
            };

            let Some(act) = action else {
                break;
            };
            game.step(act);
            steps += 1;
            won |= game.status() == Status::Won;

            if args.verbose {
                println!("Episode {} Step {}: {}", episode + 1, steps, act);
                print!("{game}");
            }
        }

        let score = game.score();
        let max_tile = game.max_tile();

        scores.push(score);
        max_tiles.push(max_tile);
        total_score += u64::from(score);
        max_tile_overall = max_tile_overall.max(max_tile);
        wins += u32::from(won);

        log::info!(
            "episode {}: score={} max_tile={} steps={}",
            episode + 1,
            score,
            max_tile,
            steps
        );
    }

    let avg_score = total_score as f64 / f64::from(episodes);
    scores.sort_unstable();
    let mid = (episodes / 2) as usize;
    let median_score = if episodes % 2 == 0 {
        (f64::from(scores[mid - 1]) + f64::from(scores[mid])) / 2.0
    } else {
        f64::from(scores[mid])
    };

    let mut tile_counts = std::collections::BTreeMap::new();
    for tile in &max_tiles {
        *tile_counts.entry(*tile).or_insert(0u32) += 1;
    }

    // Parseable key=value output
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", args.seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().copied().unwrap_or(0));
    println!("max_score={}", scores.last().copied().unwrap_or(0));
    println!("max_tile_overall={}", max_tile_overall);
    println!("wins={}", wins);
    println!("elapsed_ms={}", started.elapsed().as_millis());
    let distribution: Vec<String> = tile_counts
        .iter()
        .map(|(tile, count)| format!("{tile}:{count}"))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
    Ok(())
}

/// The AI's pick for `grid`, bounded by `budget` when one is set.
fn ai_move(ai: &mut Expectimax, grid: &Grid, budget: Option<Duration>) -> Option<Direction> {
    match budget {
        Some(budget) => ai.select_move_within(grid, budget),
        None => ai.select_move(grid),
    }
}

fn legal_moves(game: &Game) -> Vec<Direction> {
    let legal = game.legal_directions();
    Direction::all()
        .into_iter()
        .filter(|d| legal[*d as usize])
        .collect()
}

/// Select a random valid action.
fn select_random_action(game: &Game, rng: &mut SmallRng) -> Option<Direction> {
    legal_moves(game).choose(rng).copied()
}

/// Select action in a cycle: Left, Down, Right, Up.
fn select_cycle_action(game: &Game, cycle: &mut usize) -> Option<Direction> {
    let order = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
    let legal = game.legal_directions();

    for _ in 0..4 {
        let action = order[*cycle % 4];
        *cycle += 1;
        if legal[action as usize] {
            return Some(action);
        }
    }
    None
}

enum InputAction {
    Move(Direction),
    Undo,
    Hint,
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        [b'u'] | [b'U'] => InputAction::Undo,
        [b'h'] | [b'H'] => InputAction::Hint,
        [b'r'] | [b'R'] => InputAction::Restart,
        // q, Q, Ctrl+C, Esc
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit,

        _ => InputAction::None,
    }
}

fn redraw(game: &Game, controls: &str) -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?;
    writeln!(out, "=== 2048 ===")?;
    writeln!(out, "{controls}\n")?;
    write!(out, "{game}")?;
    out.flush()?;
    Ok(())
}

/// Puts the terminal in raw mode for single-key input and restores it on drop.
struct RawMode {
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        // SAFETY: termios is plain data and fd is our own stdin.
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                log::warn!("stdin is not a terminal; keys need Enter");
                return Self { saved: None };
            }
            let saved = termios;
            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);
            Self { saved: Some(saved) }
        }
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        if let Some(saved) = self.saved {
            // SAFETY: restores the attributes read in `enable`.
            unsafe {
                libc::tcsetattr(io::stdin().as_raw_fd(), libc::TCSANOW, &saved);
            }
        }
    }
}

// Without raw mode, interactive play needs Enter after each key.
#[cfg(not(unix))]
impl RawMode {
    fn enable() -> Self {
        Self {}
    }
}
