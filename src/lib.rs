//! Single-tile falling block game for an 8x8 field.
//!
//! The game logic lives in [`playfield`] and [`game`] and performs no I/O.
//! [`input`] and [`render`] adapt it to keyboards, joysticks, terminals
//! and LED matrices.

pub mod config;
pub mod driver;
pub mod game;
pub mod input;
pub mod playfield;
pub mod render;
