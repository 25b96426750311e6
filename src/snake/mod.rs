//! Grid Snake game.
//!
//! `game` holds the tick state machine and is free of any browser API;
//! `web` is the presentation layer that renders snapshots to a canvas and
//! turns keyboard / button input into `Command`s via `input`.

pub mod config;
pub mod game;
pub mod input;
pub mod types;
pub mod web;

pub use config::{ConfigError, GameConfig, Layout};
pub use game::{Command, SnakeGame, Snapshot};
pub use types::{Direction, GameOutcome, Lifecycle, Position};
