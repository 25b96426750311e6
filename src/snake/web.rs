//! Browser presentation layer for the Snake widget.
//!
//! Owns the canvas, the DOM overlays and the tick interval. All game rules live
//! in `SnakeGame`; this module only forwards input and paints snapshots.

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, Window, window};

use super::config::{GameConfig, Layout};
use super::game::{Command, SnakeGame, Snapshot};
use super::input::{command_for_key, is_game_key};
use super::types::{Direction, GameOutcome, Lifecycle};

const CANVAS_ID: &str = "sc-snake-canvas";
const SCORE_ID: &str = "sc-snake-score";
const ACTION_ID: &str = "sc-snake-action";
const PAD_ID: &str = "sc-snake-pad";

// Palette
const BG: &str = "#111827";
const CELL: &str = "#1f2937";
const HEAD: &str = "#16a34a";
const BODY: &str = "#22c55e";
const FOOD: &str = "#ef4444";

struct SnakeView {
    game: SnakeGame,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    layout: Layout,
    /// Live `setInterval` handle and its period; `None` while not running.
    timer: Option<(i32, u32)>,
    /// Elements this mount created, removed again on unmount.
    elements: Vec<Element>,
    /// Click handlers of those elements; dropped after the elements are gone.
    handlers: Vec<ClickHandler>,
}

type ClickHandler = Closure<dyn FnMut(web_sys::MouseEvent)>;

/// What to do with the tick interval after a state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerAction {
    Keep,
    /// (Re)schedule at this period, replacing any live interval.
    Start(u32),
    Stop,
}

/// `current` is the period of the live interval, if any.
fn timer_action(current: Option<u32>, lifecycle: Lifecycle, tick_ms: u32) -> TimerAction {
    match (current, lifecycle.is_running()) {
        (Some(period), true) if period == tick_ms => TimerAction::Keep,
        (_, true) => TimerAction::Start(tick_ms),
        (Some(_), false) => TimerAction::Stop,
        (None, false) => TimerAction::Keep,
    }
}

thread_local! {
    static SNAKE_VIEW: RefCell<Option<SnakeView>> = const { RefCell::new(None) };
    // Created once and never dropped, so clearing the interval from inside a
    // tick cannot free the closure that is currently executing.
    static TICK_CALLBACK: RefCell<Option<Closure<dyn FnMut()>>> = const { RefCell::new(None) };
    static LISTENERS_INSTALLED: Cell<bool> = const { Cell::new(false) };
}

fn win_doc() -> Result<(Window, Document), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    Ok((win, doc))
}

fn viewport_width(win: &Window) -> f64 {
    win.inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(1024.0)
}

/// Mount the game into the element with `container_id` (or `<body>`).
pub fn mount(container_id: &str, config: GameConfig) -> Result<(), JsValue> {
    config
        .validate()
        .map_err(|e| JsValue::from_str(&format!("invalid game config: {e}")))?;
    unmount();
    let (win, doc) = win_doc()?;

    let container: Element = match doc.get_element_by_id(container_id) {
        Some(el) => el,
        None => {
            log::warn!("container #{container_id} not found, mounting snake on <body>");
            doc.body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .into()
        }
    };

    let score = ensure_child(&doc, &container, "div", SCORE_ID)?;
    score.set_attribute("style", "font-family:'Fira Code', monospace; font-size:18px; color:#4ade80; margin:8px 0;").ok();

    let action = ensure_child(&doc, &container, "button", ACTION_ID)?;
    action.set_attribute("style", "padding:6px 18px; border-radius:999px; border:none; font-weight:bold; color:#fff; background:#10b981; margin-bottom:8px;").ok();

    let canvas: HtmlCanvasElement = ensure_child(&doc, &container, "canvas", CANVAS_ID)?.dyn_into()?;
    canvas.set_attribute("style", "display:block; border:4px solid #374151; border-radius:8px; background:#111827; max-width:100%;").ok();
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let pad = ensure_child(&doc, &container, "div", PAD_ID)?;
    pad.set_attribute("style", "display:grid; grid-template-columns:repeat(3, 56px); gap:8px; margin-top:16px;").ok();
    let mut handlers = build_direction_pad(&doc, &pad)?;

    let action_click: ClickHandler = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        let lifecycle = current_lifecycle();
        let command = match lifecycle {
            Some(Lifecycle::Running) | Some(Lifecycle::Paused) => Command::TogglePause,
            Some(_) => Command::Start,
            None => return,
        };
        dispatch(command);
    }) as Box<dyn FnMut(_)>);
    action.add_event_listener_with_callback("click", action_click.as_ref().unchecked_ref())?;
    handlers.push(action_click);

    let layout = config.layout_for_viewport(viewport_width(&win));
    let view = SnakeView {
        game: SnakeGame::new(config),
        elements: vec![score, action, canvas.clone().into(), pad],
        canvas,
        ctx,
        layout,
        timer: None,
        handlers,
    };
    view.resize_canvas();
    view.render();
    SNAKE_VIEW.with(|cell| cell.replace(Some(view)));

    install_tick_callback();
    if !LISTENERS_INSTALLED.with(|c| c.replace(true)) {
        install_listeners(&win, &doc)?;
    }

    log::info!("snake mounted (tick {} ms, cell {} px)", layout.tick_ms, layout.cell_px);
    Ok(())
}

/// Stop the timer, remove the widget's elements and drop the game. The
/// document-level key and resize listeners stay attached but go inert.
pub fn unmount() {
    let view = SNAKE_VIEW.with(|cell| cell.borrow_mut().take());
    if let Some(mut view) = view {
        view.stop_timer();
        for el in view.elements.drain(..) {
            el.remove();
        }
        log::info!(
            "snake unmounted at score {} ({} handlers released)",
            view.game.score(),
            view.handlers.len()
        );
    }
}

pub fn snapshot() -> Option<Snapshot> {
    SNAKE_VIEW.with(|cell| cell.borrow().as_ref().map(|v| v.game.snapshot()))
}

fn current_lifecycle() -> Option<Lifecycle> {
    SNAKE_VIEW.with(|cell| cell.borrow().as_ref().map(|v| v.game.lifecycle()))
}

fn dispatch(command: Command) {
    SNAKE_VIEW.with(|cell| {
        if let Some(view) = cell.borrow_mut().as_mut() {
            if view.game.apply(command) {
                view.sync_timer();
                view.render();
            }
        }
    });
}

fn on_tick() {
    SNAKE_VIEW.with(|cell| {
        if let Some(view) = cell.borrow_mut().as_mut() {
            view.game.tick();
            view.sync_timer();
            view.render();
        }
    });
}

fn install_tick_callback() {
    TICK_CALLBACK.with(|cb| {
        if cb.borrow().is_none() {
            let closure = Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>);
            cb.replace(Some(closure));
        }
    });
}

fn install_listeners(win: &Window, doc: &Document) -> Result<(), JsValue> {
    // Keyboard: arrows / WASD steer, space / P pause, space / Enter start.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let Some(lifecycle) = current_lifecycle() else {
                return;
            };
            let key = evt.key();
            if is_game_key(&key) {
                evt.prevent_default();
            }
            if let Some(command) = command_for_key(&key, lifecycle) {
                dispatch(command);
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Resize: switch between desktop and compact pacing.
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let Some(win) = window() else { return };
            let width = viewport_width(&win);
            SNAKE_VIEW.with(|cell| {
                if let Some(view) = cell.borrow_mut().as_mut() {
                    let layout = view.game.config().layout_for_viewport(width);
                    if layout != view.layout {
                        view.layout = layout;
                        view.resize_canvas();
                        view.sync_timer();
                        view.render();
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn ensure_child(
    doc: &Document,
    parent: &Element,
    tag: &str,
    id: &str,
) -> Result<Element, JsValue> {
    if let Some(old) = doc.get_element_by_id(id) {
        old.remove();
    }
    let el = doc.create_element(tag)?;
    el.set_id(id);
    parent.append_child(&el)?;
    Ok(el)
}

fn build_direction_pad(doc: &Document, pad: &Element) -> Result<Vec<ClickHandler>, JsValue> {
    // 3x3 grid, arrows on the cross
    let cells: [Option<Direction>; 9] = [
        None,
        Some(Direction::Up),
        None,
        Some(Direction::Left),
        None,
        Some(Direction::Right),
        None,
        Some(Direction::Down),
        None,
    ];
    let mut handlers = Vec::with_capacity(4);
    for slot in cells {
        let Some(dir) = slot else {
            let spacer = doc.create_element("div")?;
            pad.append_child(&spacer)?;
            continue;
        };
        let btn = doc.create_element("button")?;
        btn.set_attribute("aria-label", dir.as_str())?;
        btn.set_attribute("data-dir", dir.as_str())?;
        btn.set_text_content(Some(arrow_glyph(dir)));
        btn.set_attribute("style", "height:48px; border-radius:8px; border:none; background:#1f2937; color:#fff; font-size:20px;").ok();
        let closure: ClickHandler = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            dispatch(Command::Turn(dir));
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        handlers.push(closure);
        pad.append_child(&btn)?;
    }
    Ok(handlers)
}

fn arrow_glyph(dir: Direction) -> &'static str {
    match dir {
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Left => "◀",
        Direction::Right => "▶",
    }
}

fn action_label(lifecycle: Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::NotStarted => "Start",
        Lifecycle::Running => "Pause",
        Lifecycle::Paused => "Resume",
        Lifecycle::Over(_) => "Restart",
    }
}

impl SnakeView {
    fn resize_canvas(&self) {
        let side = self.game.config().grid_size * self.layout.cell_px;
        self.canvas.set_width(side);
        self.canvas.set_height(side);
    }

    /// Keep the interval in step with the lifecycle and current period.
    fn sync_timer(&mut self) {
        let current = self.timer.map(|(_, period)| period);
        match timer_action(current, self.game.lifecycle(), self.layout.tick_ms) {
            TimerAction::Keep => {}
            TimerAction::Start(ms) => {
                self.stop_timer();
                self.timer = schedule_interval(ms);
            }
            TimerAction::Stop => self.stop_timer(),
        }
    }

    fn stop_timer(&mut self) {
        if let Some((handle, _)) = self.timer.take() {
            if let Some(win) = window() {
                win.clear_interval_with_handle(handle);
            }
            log::debug!("tick interval {handle} cleared");
        }
    }

    fn render(&self) {
        let snap = self.game.snapshot();
        self.render_grid(&snap);
        self.render_overlay(&snap);
        if let Some(doc) = window().and_then(|w| w.document()) {
            if let Some(el) = doc.get_element_by_id(SCORE_ID) {
                el.set_text_content(Some(&format!("Score: {}", snap.score)));
            }
            if let Some(el) = doc.get_element_by_id(ACTION_ID) {
                el.set_text_content(Some(action_label(snap.lifecycle)));
            }
        }
    }

    fn render_grid(&self, snap: &Snapshot) {
        let ctx = &self.ctx;
        let cell = self.layout.cell_px as f64;
        let side = snap.grid_size as f64 * cell;
        ctx.set_fill_style_str(BG);
        ctx.fill_rect(0.0, 0.0, side, side);

        ctx.set_fill_style_str(CELL);
        for y in 0..snap.grid_size {
            for x in 0..snap.grid_size {
                ctx.fill_rect(x as f64 * cell + 1.0, y as f64 * cell + 1.0, cell - 2.0, cell - 2.0);
            }
        }

        if let Some(food) = snap.food {
            ctx.set_fill_style_str(FOOD);
            ctx.begin_path();
            ctx.arc(
                food.x as f64 * cell + cell / 2.0,
                food.y as f64 * cell + cell / 2.0,
                cell / 2.0 - 2.0,
                0.0,
                std::f64::consts::TAU,
            )
            .ok();
            ctx.fill();
        }

        // tail first so the head paints on top
        for (i, seg) in snap.snake.iter().enumerate().rev() {
            ctx.set_fill_style_str(if i == 0 { HEAD } else { BODY });
            ctx.fill_rect(seg.x as f64 * cell + 1.0, seg.y as f64 * cell + 1.0, cell - 2.0, cell - 2.0);
        }
    }

    fn render_overlay(&self, snap: &Snapshot) {
        let (title, subtitle, color) = match snap.lifecycle {
            Lifecycle::Running => return,
            Lifecycle::NotStarted => ("SNAKE", "Press Space or Enter to start".to_string(), "#4ade80"),
            Lifecycle::Paused => ("PAUSED", "Press Space or P to resume".to_string(), "#facc15"),
            Lifecycle::Over(GameOutcome::BoardFilled) => {
                ("YOU WIN", format!("Final score: {}", snap.score), "#4ade80")
            }
            Lifecycle::Over(_) => ("GAME OVER", format!("Final score: {}", snap.score), "#ef4444"),
        };
        let ctx = &self.ctx;
        let side = self.canvas.width() as f64;
        ctx.set_fill_style_str("rgba(0,0,0,0.6)");
        ctx.fill_rect(0.0, 0.0, side, side);
        ctx.set_text_align("center");
        ctx.set_fill_style_str(color);
        ctx.set_font("bold 36px sans-serif");
        ctx.fill_text(title, side / 2.0, side / 2.0).ok();
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("16px 'Fira Code', monospace");
        ctx.fill_text(&subtitle, side / 2.0, side / 2.0 + 32.0).ok();
    }
}

fn schedule_interval(ms: u32) -> Option<(i32, u32)> {
    let win = window()?;
    let handle = TICK_CALLBACK.with(|cb| {
        cb.borrow().as_ref().map(|closure| {
            win.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                i32::try_from(ms).unwrap_or(i32::MAX),
            )
        })
    });
    match handle {
        Some(Ok(h)) => {
            log::debug!("tick interval {h} every {ms} ms");
            Some((h, ms))
        }
        Some(Err(err)) => {
            log::warn!("setInterval failed: {err:?}");
            None
        }
        None => {
            log::warn!("tick callback not installed");
            None
        }
    }
}
