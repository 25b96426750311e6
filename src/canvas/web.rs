// DOM binding for the drawing surface: pointer listeners, placeholder paint
// and export-button wiring.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlAnchorElement, HtmlCanvasElement, Window,
    window,
};

use super::{
    BACKGROUND, BORDER, EncodedImage, ExportError, ImageFormat, PLACEHOLDER, Point, Segment,
    Sketch, StrokeStyle, surface_size,
};

const CANVAS_ID: &str = "sc-draw-canvas";
const TOOLBAR_ID: &str = "sc-draw-toolbar";

impl From<ExportError> for JsValue {
    fn from(e: ExportError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// A bitmap canvas that records freehand strokes.
pub struct DrawingSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sketch: Sketch,
}

impl DrawingSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        Ok(Self {
            canvas,
            ctx,
            sketch: Sketch::new(StrokeStyle::default()),
        })
    }

    /// Resize the bitmap; this clears it, so the placeholder is repainted.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.sketch.end_stroke();
        self.paint_placeholder();
    }

    pub fn paint_placeholder(&self) {
        let ctx = &self.ctx;
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;
        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_stroke_style_str(BORDER);
        ctx.set_line_width(1.0);
        ctx.stroke_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str("#999");
        ctx.set_font("20px Arial");
        ctx.set_text_align("center");
        ctx.fill_text(PLACEHOLDER, w / 2.0, h / 2.0).ok();
    }

    pub fn begin_stroke(&mut self, at: Point) {
        self.sketch.begin_stroke(at);
    }

    pub fn extend_stroke(&mut self, to: Point) {
        if let Some(seg) = self.sketch.extend_stroke(to) {
            self.stroke_segment(seg);
        }
    }

    pub fn end_stroke(&mut self) {
        if self.sketch.end_stroke() {
            log::debug!("stroke {} finished", self.sketch.stroke_count());
        }
    }

    fn stroke_segment(&self, seg: Segment) {
        let style = self.sketch.style();
        self.ctx.set_line_width(style.width);
        self.ctx.set_line_cap(style.cap);
        self.ctx.set_stroke_style_str(style.color);
        self.ctx.begin_path();
        self.ctx.move_to(seg.from.x, seg.from.y);
        self.ctx.line_to(seg.to.x, seg.to.y);
        self.ctx.stroke();
    }

    pub fn export_image(&self, format: ImageFormat) -> Result<EncodedImage, ExportError> {
        let url = match format.quality() {
            Some(q) => self
                .canvas
                .to_data_url_with_type_and_encoder_options(format.mime_type(), &JsValue::from_f64(q)),
            None => self.canvas.to_data_url_with_type(format.mime_type()),
        }
        .map_err(|e| ExportError::Dom(format!("{e:?}")))?;
        let image = EncodedImage::from_data_url(url)?;
        if image.format != format {
            log::warn!("browser cannot encode {}, exported {}", format.mime_type(), image.format.mime_type());
        }
        Ok(image)
    }

    /// Export and trigger a browser download named `canvas.<ext>`.
    pub fn download(&self, doc: &Document, format: ImageFormat) -> Result<(), JsValue> {
        let image = self.export_image(format)?;
        let link: HtmlAnchorElement = doc.create_element("a")?.dyn_into()?;
        link.set_download(&format.file_name());
        link.set_href(&image.data_url);
        link.click();
        log::info!("exported {}", format.file_name());
        Ok(())
    }
}

thread_local! {
    static SURFACE: RefCell<Option<DrawingSurface>> = const { RefCell::new(None) };
}

fn with_surface(f: impl FnOnce(&mut DrawingSurface)) {
    SURFACE.with(|cell| {
        if let Some(surface) = cell.borrow_mut().as_mut() {
            f(surface);
        }
    });
}

fn viewport(win: &Window) -> (f64, f64) {
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
    (w, h)
}

/// Mount the drawing surface and its export toolbar into `container_id`.
pub fn mount(container_id: &str) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container: Element = match doc.get_element_by_id(container_id) {
        Some(el) => el,
        None => {
            log::warn!("container #{container_id} not found, mounting canvas on <body>");
            doc.body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .into()
        }
    };
    if doc.get_element_by_id(CANVAS_ID).is_some() {
        log::warn!("drawing surface already mounted");
        return Ok(());
    }

    let toolbar = doc.create_element("div")?;
    toolbar.set_id(TOOLBAR_ID);
    toolbar.set_attribute("style", "display:flex; gap:8px; padding:8px; background:#f3f4f6;").ok();
    for format in ImageFormat::ALL {
        let btn = doc.create_element("button")?;
        btn.set_text_content(Some(format.button_label()));
        btn.set_attribute("style", "padding:4px 12px; background:#3b82f6; color:#fff; border:none; border-radius:4px;").ok();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            let Some(doc) = window().and_then(|w| w.document()) else {
                return;
            };
            with_surface(|surface| {
                if let Err(err) = surface.download(&doc, format) {
                    log::error!("export {} failed: {err:?}", format.extension());
                }
            });
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        toolbar.append_child(&btn)?;
    }
    container.append_child(&toolbar)?;

    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_id(CANVAS_ID);
    canvas.set_attribute("style", "border:1px solid #d1d5db; background:#fff; cursor:crosshair;").ok();
    container.append_child(&canvas)?;

    let mut surface = DrawingSurface::new(canvas.clone())?;
    let (vw, vh) = viewport(&win);
    let (w, h) = surface_size(vw, vh);
    surface.resize(w, h);
    SURFACE.with(|cell| cell.replace(Some(surface)));

    // Pointer listeners use offset coordinates, already canvas-local.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let at = Point::new(evt.offset_x() as f64, evt.offset_y() as f64);
            with_surface(|s| s.begin_stroke(at));
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let to = Point::new(evt.offset_x() as f64, evt.offset_y() as f64);
            with_surface(|s| s.extend_stroke(to));
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    for event in ["mouseup", "mouseleave"] {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_surface(|s| s.end_stroke());
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let Some(win) = window() else { return };
            let (vw, vh) = viewport(&win);
            let (w, h) = surface_size(vw, vh);
            with_surface(|s| s.resize(w, h));
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    log::info!("drawing surface mounted ({w}x{h})");
    Ok(())
}
