//! Maps keyboard and joystick codes to [`Input`].

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::Input;

// Linux evdev key codes reported by the Sense HAT joystick
pub const JOY_UP: u16 = 103;
pub const JOY_LEFT: u16 = 105;
pub const JOY_RIGHT: u16 = 106;
pub const JOY_DOWN: u16 = 108;
pub const JOY_ENTER: u16 = 28;

/// What an input source produced for one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Polled {
    Quit,
    Input(Input),
}

pub trait InputSource {
    /// Returns immediately, with `Input::None` when nothing is pending.
    fn poll(&mut self) -> Result<Polled>;
}

// ============================================================================
// Key Mapping
// ============================================================================

pub fn map_key(key: KeyEvent) -> Input {
    if key.kind != KeyEventKind::Press {
        return Input::None;
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') | KeyCode::Char('H') => {
            Input::Left
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') | KeyCode::Char('L') => {
            Input::Right
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') | KeyCode::Char('J') => {
            Input::Down
        }
        KeyCode::Enter | KeyCode::Char(' ') => Input::Confirm,
        _ => Input::None,
    }
}

/// Quit is its own signal; Enter never quits.
pub fn should_quit(key: KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && (matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
}

/// Maps a joystick key event. `value` is 1 on press and 2 on auto-repeat;
/// releases (0) are ignored.
pub fn map_joystick(code: u16, value: i32) -> Input {
    if value != 1 && value != 2 {
        return Input::None;
    }
    match code {
        JOY_LEFT => Input::Left,
        JOY_RIGHT => Input::Right,
        JOY_DOWN => Input::Down,
        JOY_ENTER => Input::Confirm,
        _ => Input::None,
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Non-blocking crossterm keyboard reader. Drains everything pending each
/// tick; the last mapped key wins.
#[derive(Default)]
pub struct KeyboardSource;

impl InputSource for KeyboardSource {
    fn poll(&mut self) -> Result<Polled> {
        let mut input = Input::None;
        while event::poll(Duration::ZERO).context("polling terminal input")? {
            if let Event::Key(key) = event::read().context("reading terminal input")? {
                if should_quit(key) {
                    return Ok(Polled::Quit);
                }
                match map_key(key) {
                    Input::None => {}
                    mapped => input = mapped,
                }
            }
        }
        Ok(Polled::Input(input))
    }
}

/// Replays a fixed list, then reports `Input::None` forever.
pub struct ScriptedSource {
    script: VecDeque<Polled>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Polled>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedSource {
    fn poll(&mut self) -> Result<Polled> {
        Ok(self.script.pop_front().unwrap_or(Polled::Input(Input::None)))
    }
}
