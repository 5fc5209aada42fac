use std::io::{stdout, Stdout};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::{info, warn};
use ratatui::backend::CrosstermBackend;

use stetris::config::{Cli, DisplayMode};
use stetris::driver::run;
use stetris::game::Game;
use stetris::input::KeyboardSource;
use stetris::render::{AsciiPresenter, TerminalPresenter};

// ============================================================================
// Terminal Setup
// ============================================================================

fn enter_terminal(display: DisplayMode) -> Result<Stdout> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut out = stdout();
    match display {
        DisplayMode::Tui => {
            out.execute(EnterAlternateScreen)?;
        }
        DisplayMode::Ascii => {
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.execute(cursor::Hide)?;
        }
    }
    Ok(out)
}

fn leave_terminal(display: DisplayMode) -> Result<()> {
    disable_raw_mode().context("disabling raw mode")?;
    let mut out = stdout();
    match display {
        DisplayMode::Tui => {
            out.execute(LeaveAlternateScreen)?;
        }
        DisplayMode::Ascii => {
            out.execute(cursor::Show)?;
            println!();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.game_config()?;
    info!(
        "starting on a {}x{} field, {:?} per tick",
        config.grid.x, config.grid.y, config.tick
    );

    let mut game = Game::new(config);
    let mut input = KeyboardSource;

    let out = enter_terminal(cli.display)?;
    let result = match cli.display {
        DisplayMode::Tui => TerminalPresenter::new(CrosstermBackend::new(out))
            .and_then(|mut presenter| run(&mut game, &mut input, &mut presenter)),
        DisplayMode::Ascii => run(&mut game, &mut input, &mut AsciiPresenter::new(out)),
    };
    if let Ok(ticks) = &result {
        info!("quit after {} ticks", ticks);
    }

    if let Err(err) = leave_terminal(cli.display) {
        warn!("could not restore terminal: {err:#}");
    }

    result.map(|_| ())
}
