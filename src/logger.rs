use std::sync::OnceLock;

use log::Level;

static INIT: OnceLock<()> = OnceLock::new();

/// Route the `log` facade to the browser console. Safe to call repeatedly.
pub fn init_logger(level: Level) {
    INIT.get_or_init(|| {
        // Err only means a logger is already installed by the host.
        let _ = console_log::init_with_level(level);
    });
}

pub fn default_level() -> Level {
    if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    }
}
