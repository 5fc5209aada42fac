//! Fixed-cadence loop tying an input source, the game and a presenter together.

use std::thread;
use std::time::Instant;

use anyhow::Result;
use log::info;

use crate::game::{Game, GameEvent};
use crate::input::{InputSource, Polled};
use crate::render::Presenter;

/// Runs one tick per configured interval until the source reports quit.
/// Returns the number of ticks played.
pub fn run(game: &mut Game, source: &mut dyn InputSource, presenter: &mut dyn Presenter) -> Result<u64> {
    let tick = game.config().tick;
    let mut ticks = 0;
    presenter.present(&game.snapshot(), true)?;

    loop {
        let started = Instant::now();

        let input = match source.poll()? {
            Polled::Quit => break,
            Polled::Input(input) => input,
        };

        let changed = game.tick(input);
        presenter.present(&game.snapshot(), changed)?;

        for event in game.take_events() {
            if event == GameEvent::GameOver {
                info!("game over with score {} at level {}", game.score, game.level);
            }
        }

        if let Some(remaining) = tick.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
        game.advance_tick();
        ticks += 1;
    }

    Ok(ticks)
}
