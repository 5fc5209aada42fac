use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use crate::playfield::Coord;

// ============================================================================
// Defaults
// ============================================================================

pub const GRID_WIDTH: usize = 8;
pub const GRID_HEIGHT: usize = 8;
pub const TICK_US: u64 = 10_000;
pub const ROWS_PER_LEVEL: u32 = 2;
pub const INITIAL_STEP_TICKS: u32 = 50;

// ============================================================================
// Game Configuration
// ============================================================================

/// Fixed for the lifetime of a session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub grid: Coord,
    /// Real time between two calls of `Game::tick`.
    pub tick: Duration,
    /// A level is gained every time the cleared row count hits a multiple of this.
    pub rows_per_level: u32,
    /// Ticks per automatic step at level 0.
    pub initial_step_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: Coord::new(GRID_WIDTH, GRID_HEIGHT),
            tick: Duration::from_micros(TICK_US),
            rows_per_level: ROWS_PER_LEVEL,
            initial_step_ticks: INITIAL_STEP_TICKS,
        }
    }
}

impl GameConfig {
    /// Rejects values the game logic cannot run with. The game itself never
    /// calls this.
    pub fn validate(&self) -> Result<()> {
        if self.grid.x == 0 || self.grid.y == 0 {
            bail!("grid must be at least 1x1, got {}x{}", self.grid.x, self.grid.y);
        }
        if self.tick.is_zero() {
            bail!("tick duration must be positive");
        }
        if self.rows_per_level == 0 {
            bail!("rows per level must be at least 1");
        }
        if self.initial_step_ticks == 0 {
            bail!("initial step ticks must be at least 1");
        }
        Ok(())
    }
}

// ============================================================================
// Command Line
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum DisplayMode {
    /// Full screen ratatui view
    Tui,
    /// Plain text frame redrawn in place
    Ascii,
}

#[derive(Debug, Parser)]
#[command(name = "stetris")]
#[command(about = "Falling tile puzzle on an 8x8 field")]
pub struct Cli {
    /// Microseconds per game tick
    #[arg(long, env = "STETRIS_TICK_US", default_value_t = TICK_US)]
    pub tick_us: u64,

    /// Cleared rows needed for each level
    #[arg(long, env = "STETRIS_ROWS_PER_LEVEL", default_value_t = ROWS_PER_LEVEL)]
    pub rows_per_level: u32,

    /// Ticks between automatic steps at level 0
    #[arg(long, env = "STETRIS_INITIAL_STEP_TICKS", default_value_t = INITIAL_STEP_TICKS)]
    pub initial_step_ticks: u32,

    #[arg(long, env = "STETRIS_DISPLAY", value_enum, default_value_t = DisplayMode::Tui)]
    pub display: DisplayMode,
}

impl Cli {
    pub fn game_config(&self) -> Result<GameConfig> {
        let config = GameConfig {
            tick: Duration::from_micros(self.tick_us),
            rows_per_level: self.rows_per_level,
            initial_step_ticks: self.initial_step_ticks,
            ..GameConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
