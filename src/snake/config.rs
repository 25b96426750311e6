use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::Position;

/// Viewports narrower than this (CSS px) use the compact layout and faster tick.
pub const COMPACT_VIEWPORT_PX: f64 = 768.0;

pub const MAX_GRID_SIZE: u32 = 256;
pub const MIN_CELL_PX: u32 = 3;
pub const MAX_CELL_PX: u32 = 64;
/// Upper bound on the tick period; keeps the value inside `setInterval`'s i32.
pub const MAX_TICK_MS: u32 = 60_000;

/// A config value outside the range the game can run with.
#[derive(Debug)]
pub enum ConfigError {
    #[cfg(feature = "serde_json")]
    Json(serde_json::Error),
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "serde_json")]
            ConfigError::Json(e) => write!(f, "invalid config json: {e}"),
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} = {value} is outside {min}..={max}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "serde_json")]
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "serde_json")]
impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Tunables for one game. Every field can be omitted from JSON.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Side of the square grid in cells.
    pub grid_size: u32,
    /// Rendered cell size in CSS px.
    pub cell_px: u32,
    pub compact_cell_px: u32,
    /// Interval between ticks in ms.
    pub tick_ms: u32,
    pub compact_tick_ms: u32,
    /// Score added per food eaten.
    pub food_score: u32,
    /// When set, moving into the cell the tail is leaving is not a collision.
    pub tail_vacates: bool,
    /// Random draws tried before falling back to scanning free cells.
    pub food_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            cell_px: 20,
            compact_cell_px: 15,
            tick_ms: 150,
            compact_tick_ms: 130,
            food_score: 10,
            tail_vacates: false,
            food_attempts: 64,
        }
    }
}

impl GameConfig {
    /// Grid size is clamped to `1..=MAX_GRID_SIZE`.
    pub fn with_grid_size(grid_size: u32) -> Self {
        Self {
            grid_size: grid_size.clamp(1, MAX_GRID_SIZE),
            ..Default::default()
        }
    }

    /// Where the snake spawns on `start()`.
    pub fn origin(&self) -> Position {
        let mid = (self.grid_size / 2) as i32;
        Position::new(mid, mid)
    }

    /// Food shown before the first game starts.
    pub fn preview_food(&self) -> Position {
        let quarter = (self.grid_size / 4) as i32;
        Position::new(quarter, quarter)
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size as usize * self.grid_size as usize
    }

    pub fn is_compact(viewport_width: f64) -> bool {
        viewport_width < COMPACT_VIEWPORT_PX
    }

    /// Tick period and cell size for the given viewport width.
    pub fn layout_for_viewport(&self, viewport_width: f64) -> Layout {
        if Self::is_compact(viewport_width) {
            Layout {
                tick_ms: self.compact_tick_ms,
                cell_px: self.compact_cell_px,
            }
        } else {
            Layout {
                tick_ms: self.tick_ms,
                cell_px: self.cell_px,
            }
        }
    }

    /// Reject values that would overflow coordinates, canvas size or timers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("grid_size", self.grid_size, 1, MAX_GRID_SIZE)?;
        check_range("cell_px", self.cell_px, MIN_CELL_PX, MAX_CELL_PX)?;
        check_range("compact_cell_px", self.compact_cell_px, MIN_CELL_PX, MAX_CELL_PX)?;
        check_range("tick_ms", self.tick_ms, 1, MAX_TICK_MS)?;
        check_range("compact_tick_ms", self.compact_tick_ms, 1, MAX_TICK_MS)?;
        Ok(())
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Viewport-dependent pacing and sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub tick_ms: u32,
    pub cell_px: u32,
}
