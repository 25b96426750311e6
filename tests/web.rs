// Browser-only checks; run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use snake_canvas::canvas::ImageFormat;
use snake_canvas::canvas::web::DrawingSurface;
use snake_canvas::canvas::Point;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> HtmlCanvasElement {
    let doc = web_sys::window().unwrap().document().unwrap();
    doc.create_element("canvas").unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn png_export_decodes_to_png_bytes() {
    let mut surface = DrawingSurface::new(canvas()).unwrap();
    surface.resize(32, 32);
    surface.begin_stroke(Point::new(1.0, 1.0));
    surface.extend_stroke(Point::new(30.0, 30.0));
    surface.end_stroke();
    let image = surface.export_image(ImageFormat::Png).unwrap();
    let bytes = image.bytes().unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    assert_eq!(image.file_name(), "canvas.png");
}

#[wasm_bindgen_test]
fn snake_mounts_and_stops() {
    snake_canvas::start_game("missing-container").unwrap();
    let snap = snake_canvas::snake::web::snapshot().unwrap();
    assert_eq!(snap.lifecycle, snake_canvas::Lifecycle::NotStarted);
    snake_canvas::stop_game();
    assert!(snake_canvas::snake::web::snapshot().is_none());
}

#[wasm_bindgen_test]
fn remount_replaces_widget_and_stop_removes_it() {
    let doc = web_sys::window().unwrap().document().unwrap();
    let count = |sel: &str| doc.query_selector_all(sel).unwrap().length();
    snake_canvas::start_game("missing-container").unwrap();
    snake_canvas::start_game("missing-container").unwrap();
    assert_eq!(count("#sc-snake-pad"), 1);
    assert_eq!(count("#sc-snake-canvas"), 1);
    assert_eq!(count("#sc-snake-pad button"), 4);
    snake_canvas::stop_game();
    assert_eq!(count("#sc-snake-pad"), 0);
    assert_eq!(count("#sc-snake-action"), 0);
    assert!(snake_canvas::snake::web::snapshot().is_none());
}

#[wasm_bindgen_test]
fn mount_rejects_out_of_range_config() {
    let config = snake_canvas::GameConfig {
        grid_size: 3_000_000_000,
        ..Default::default()
    };
    snake_canvas::stop_game();
    assert!(snake_canvas::snake::web::mount("missing-container", config).is_err());
    assert!(snake_canvas::snake::web::snapshot().is_none());
}
