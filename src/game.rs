use log::{debug, trace};
use rand::Rng;

use crate::config::GameConfig;
use crate::playfield::{Coord, Playfield};

// ============================================================================
// Configuration
// ============================================================================

/// Tile colours as 0xRRGGBB.
pub const PALETTE: [u32; 8] = [
    0xFF0000, // red
    0x00FF00, // green
    0x0000FF, // blue
    0xFFFF00, // yellow
    0x800080, // purple
    0x00FFFF, // cyan
    0xFFA500, // orange
    0xFFC0CB, // pink
];

// ============================================================================
// Types
// ============================================================================

/// One normalized input per tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Input {
    #[default]
    None,
    Left,
    Right,
    Down,
    Confirm,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    GameOver,
    Active,
}

/// One-step pulses, recomputed on every step boundary.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StepFlags {
    pub row_clear: bool,
    pub tile_added: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted,
    TileAdded,
    RowCleared,
    LevelUp(u32),
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Stats {
    pub tiles: u32,
    pub rows: u32,
    pub score: u32,
    pub level: u32,
}

/// Read-only view handed to presenters.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub playfield: &'a Playfield,
    pub stats: Stats,
    pub status: Status,
    pub flags: StepFlags,
}

// ============================================================================
// Colour Provider Trait
// ============================================================================

pub trait ColourProvider {
    fn next_colour(&mut self) -> u32;
}

pub struct RandomColours;

impl ColourProvider for RandomColours {
    fn next_colour(&mut self) -> u32 {
        PALETTE[rand::thread_rng().gen_range(0..PALETTE.len())]
    }
}

pub struct SequenceColours {
    colours: Vec<u32>,
    index: usize,
}

impl SequenceColours {
    pub fn new(colours: Vec<u32>) -> Self {
        Self { colours, index: 0 }
    }
}

impl ColourProvider for SequenceColours {
    fn next_colour(&mut self) -> u32 {
        let colour = self.colours[self.index % self.colours.len()];
        self.index += 1;
        colour
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub tiles: u32,
    pub rows: u32,
    pub score: u32,
    pub level: u32,
    pub status: Status,
    config: GameConfig,
    playfield: Playfield,
    flags: StepFlags,
    active_tile: Option<Coord>,
    tick: u32,
    step_ticks: u32,
    colours: Box<dyn ColourProvider>,
    events: Vec<GameEvent>,
}

// ============================================================================
// Game Logic
// ============================================================================

impl Game {
    /// Starts in `GameOver`; the first non-`None` input begins a game.
    pub fn new(config: GameConfig) -> Self {
        Self::with_provider(config, Box::new(RandomColours))
    }

    pub fn with_provider(config: GameConfig, colours: Box<dyn ColourProvider>) -> Self {
        Self {
            tiles: 0,
            rows: 0,
            score: 0,
            level: 0,
            status: Status::GameOver,
            config,
            playfield: Playfield::new(config.grid.x, config.grid.y),
            flags: StepFlags::default(),
            active_tile: None,
            tick: 0,
            step_ticks: config.initial_step_ticks,
            colours,
            events: Vec::new(),
        }
    }

    /// An active game on a prepared field, with `active` as the falling tile.
    pub fn with_playfield(config: GameConfig, playfield: Playfield, active: Coord) -> Self {
        assert!(
            playfield.is_occupied(active),
            "active tile ({}, {}) is not occupied",
            active.x,
            active.y
        );
        let mut game = Self::with_provider(config, Box::new(RandomColours));
        game.playfield = playfield;
        game.status = Status::Active;
        game.active_tile = Some(active);
        game
    }

    /// Advances the game by one tick. Returns whether the playfield changed.
    ///
    /// The automatic step (row clear, fall, spawn) only runs when the tick
    /// counter is at 0; the driver moves the counter with [`Game::advance_tick`].
    pub fn tick(&mut self, input: Input) -> bool {
        let mut changed = false;

        if self.status == Status::Active {
            changed = self.apply_input(input);

            if self.tick == 0 {
                self.step();
                changed = true;
            }
        }

        // Any input starts a new game
        if self.status == Status::GameOver && input != Input::None {
            self.new_game();
            changed = true;
        }

        changed
    }

    /// Moves the tick counter on by one, wrapping at the current step length.
    pub fn advance_tick(&mut self) {
        self.tick = (self.tick + 1) % self.step_ticks;
    }

    fn apply_input(&mut self, input: Input) -> bool {
        match input {
            Input::Left => {
                self.move_left();
                true
            }
            Input::Right => {
                self.move_right();
                true
            }
            Input::Down => {
                while self.move_down() {}
                self.tick = 0;
                true
            }
            Input::Confirm | Input::None => false,
        }
    }

    fn step(&mut self) {
        self.flags = StepFlags::default();

        if self.clear_row() {
            self.flags.row_clear = true;
            self.rows += 1;
            self.score += self.level + 1;
            self.events.push(GameEvent::RowCleared);
            if self.rows % self.config.rows_per_level == 0 {
                self.advance_level();
            }
        }

        // No falling tile left, or it cannot fall further: lock and spawn
        let locked = match self.active_tile {
            Some(pos) => !self.playfield.is_occupied(pos) || !self.move_down(),
            None => true,
        };
        if locked {
            if self.add_new_tile() {
                self.flags.tile_added = true;
                self.tiles += 1;
            } else {
                self.game_over();
            }
        }
    }

    /// Clears the bottom row if it is full, shifting every row above it down.
    pub fn clear_row(&mut self) -> bool {
        let floor = self.playfield.height() - 1;
        if !self.playfield.is_row_full(floor) {
            return false;
        }
        for y in (1..=floor).rev() {
            self.playfield.copy_row(y, y - 1);
        }
        self.playfield.reset_row(0);
        trace!("bottom row cleared");
        true
    }

    pub fn advance_level(&mut self) {
        self.level += 1;
        self.step_ticks = match self.step_ticks {
            0 | 1 => self.step_ticks,
            2..=10 => self.step_ticks - 1,
            11..=20 => self.step_ticks - 2,
            _ => self.step_ticks - 10,
        };
        debug!(
            "level {} reached, {} ticks per step",
            self.level, self.step_ticks
        );
        self.events.push(GameEvent::LevelUp(self.level));
    }

    /// Spawns a tile at the top centre. Fails if that cell is taken.
    fn add_new_tile(&mut self) -> bool {
        let spawn = self.spawn_point();
        if self.playfield.is_occupied(spawn) {
            self.active_tile = None;
            return false;
        }
        let colour = self.colours.next_colour();
        self.playfield.place_tile(spawn, colour);
        self.active_tile = Some(spawn);
        self.events.push(GameEvent::TileAdded);
        trace!("tile {:06X} spawned at ({}, {})", colour, spawn.x, spawn.y);
        true
    }

    fn new_game(&mut self) {
        self.status = Status::Active;
        self.flags = StepFlags::default();
        self.tiles = 0;
        self.rows = 0;
        self.score = 0;
        self.level = 0;
        self.tick = 0;
        self.playfield.reset_all();
        self.events.push(GameEvent::GameStarted);
        debug!("new game started");

        let spawned = self.add_new_tile();
        debug_assert!(spawned, "spawn blocked on an empty playfield");
        self.flags.tile_added = true;
        self.tiles += 1;
    }

    fn game_over(&mut self) {
        self.status = Status::GameOver;
        self.step_ticks = self.config.initial_step_ticks;
        self.active_tile = None;
        self.events.push(GameEvent::GameOver);
        debug!(
            "game over: {} tiles, {} rows, score {}, level {}",
            self.tiles, self.rows, self.score, self.level
        );
    }

    fn active(&self) -> Coord {
        match self.active_tile {
            Some(pos) => pos,
            None => panic!("no active tile to move"),
        }
    }

    fn shift_active(&mut self, to: Option<Coord>) -> bool {
        let from = self.active();
        match to {
            Some(to) if !self.playfield.is_occupied(to) => {
                self.playfield.copy_tile(to, from);
                self.playfield.reset_tile(from);
                self.active_tile = Some(to);
                true
            }
            _ => false,
        }
    }

    pub fn move_left(&mut self) -> bool {
        let pos = self.active();
        let to = (pos.x > 0).then(|| Coord::new(pos.x - 1, pos.y));
        self.shift_active(to)
    }

    pub fn move_right(&mut self) -> bool {
        let pos = self.active();
        let to = (pos.x + 1 < self.playfield.width()).then(|| Coord::new(pos.x + 1, pos.y));
        self.shift_active(to)
    }

    pub fn move_down(&mut self) -> bool {
        let pos = self.active();
        let to = (pos.y + 1 < self.playfield.height()).then(|| Coord::new(pos.x, pos.y + 1));
        self.shift_active(to)
    }

    pub fn spawn_point(&self) -> Coord {
        Coord::new((self.playfield.width() - 1) / 2, 0)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn active_tile(&self) -> Option<Coord> {
        self.active_tile
    }

    pub fn flags(&self) -> StepFlags {
        self.flags
    }

    /// Ticks elapsed since the last step boundary.
    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    /// Ticks between automatic steps at the current level. Never 0.
    pub fn step_ticks(&self) -> u32 {
        self.step_ticks
    }

    pub fn stats(&self) -> Stats {
        Stats {
            tiles: self.tiles,
            rows: self.rows,
            score: self.score,
            level: self.level,
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            playfield: &self.playfield,
            stats: self.stats(),
            status: self.status,
            flags: self.flags,
        }
    }

    /// Check if game is over
    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub const FILL_COLOUR: u32 = 0x800080;

    pub fn empty_field() -> Playfield {
        let config = GameConfig::default();
        Playfield::new(config.grid.x, config.grid.y)
    }

    pub fn fill_row(field: &mut Playfield, y: usize) {
        for x in 0..field.width() {
            let pos = Coord::new(x, y);
            if !field.is_occupied(pos) {
                field.place_tile(pos, FILL_COLOUR);
            }
        }
    }

    pub fn fill_row_with_gap(field: &mut Playfield, y: usize, gap_x: usize) {
        fill_row(field, y);
        field.reset_tile(Coord::new(gap_x, y));
    }

    /// A running game whose field holds only the tile at `active`.
    pub fn game_with_tile_at(active: Coord) -> Game {
        let mut field = empty_field();
        field.place_tile(active, FILL_COLOUR);
        Game::with_playfield(GameConfig::default(), field, active)
    }

    /// Calls `tick(Input::None)` then `advance_tick` until the next step
    /// boundary has been processed.
    pub fn run_to_step(game: &mut Game) {
        loop {
            let at_boundary = game.current_tick() == 0;
            game.tick(Input::None);
            game.advance_tick();
            if at_boundary {
                break;
            }
        }
    }
}
