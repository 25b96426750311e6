//! Snake Canvas core crate.
//!
//! Two independent browser widgets compiled to WASM: a tick-driven Snake game
//! and a freehand drawing canvas with image export. The host page mounts
//! either one into a container element via the exported entrypoints below.

use wasm_bindgen::prelude::*;

pub mod canvas;
pub mod logger;
pub mod snake;

pub use snake::{Command, Direction, GameConfig, GameOutcome, Lifecycle, Position, SnakeGame, Snapshot};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init_logger(logger::default_level());
}

// -----------------------------------------------------------------------------
// Snake
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game(container_id: &str) -> Result<(), JsValue> {
    snake::web::mount(container_id, GameConfig::default())
}

/// Mount with a JSON `GameConfig`; omitted fields keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(container_id: &str, config_json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(config_json)
        .map_err(|e| JsValue::from_str(&format!("invalid game config: {e}")))?;
    snake::web::mount(container_id, config)
}

/// Current snapshot as JSON, or `null` when no game is mounted.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn game_snapshot_json() -> Result<String, JsValue> {
    let snap = snake::web::snapshot();
    serde_json::to_string(&snap).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn stop_game() {
    snake::web::unmount();
}

// -----------------------------------------------------------------------------
// Drawing surface
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_canvas(container_id: &str) -> Result<(), JsValue> {
    canvas::web::mount(container_id)
}
