//! Freehand drawing surface.
//!
//! The stroke model and export formats are plain Rust so they can be tested
//! on the host; `web` binds them to an `HtmlCanvasElement`.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub mod web;

/// Sidebar width subtracted from wide viewports.
pub const SIDEBAR_PX: f64 = 256.0;
/// Header height subtracted from narrow viewports.
pub const MOBILE_HEADER_PX: f64 = 60.0;
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;
/// Encoder quality for lossy formats.
pub const LOSSY_QUALITY: f64 = 0.9;

pub const BACKGROUND: &str = "#f9f9f9";
pub const BORDER: &str = "#ddd";
pub const PLACEHOLDER: &str = "Canvas Area - Draw something!";

/// Canvas-local pointer position in CSS px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: &'static str,
    pub color: &'static str,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 2.0,
            cap: "round",
            color: "#000000",
        }
    }
}

/// One straight piece of a stroke, ready to be painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Tracks the stroke under the pointer. Strokes are not retained once ended.
#[derive(Debug, Default)]
pub struct Sketch {
    style: StrokeStyle,
    last: Option<Point>,
    strokes: usize,
}

impl Sketch {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            last: None,
            strokes: 0,
        }
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn is_drawing(&self) -> bool {
        self.last.is_some()
    }

    /// Strokes completed since creation.
    pub fn stroke_count(&self) -> usize {
        self.strokes
    }

    pub fn begin_stroke(&mut self, at: Point) {
        self.last = Some(at);
    }

    /// Segment from the previous point, or `None` when no stroke is active.
    pub fn extend_stroke(&mut self, to: Point) -> Option<Segment> {
        let from = self.last.replace(to)?;
        Some(Segment { from, to })
    }

    pub fn end_stroke(&mut self) -> bool {
        if self.last.take().is_some() {
            self.strokes += 1;
            true
        } else {
            false
        }
    }
}

/// Canvas bitmap size for the given viewport.
pub fn surface_size(viewport_width: f64, viewport_height: f64) -> (u32, u32) {
    let (w, h) = if viewport_width > MOBILE_BREAKPOINT_PX {
        (viewport_width - SIDEBAR_PX, viewport_height)
    } else {
        (viewport_width, viewport_height - MOBILE_HEADER_PX)
    };
    (w.max(1.0) as u32, h.max(1.0) as u32)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Webp];

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }

    /// `None` for lossless PNG.
    pub fn quality(self) -> Option<f64> {
        match self {
            ImageFormat::Png => None,
            ImageFormat::Jpeg | ImageFormat::Webp => Some(LOSSY_QUALITY),
        }
    }

    pub fn file_name(self) -> String {
        format!("canvas.{}", self.extension())
    }

    pub fn button_label(self) -> &'static str {
        match self {
            ImageFormat::Png => "Export PNG",
            ImageFormat::Jpeg => "Export JPEG",
            ImageFormat::Webp => "Export WebP",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "webp" => Ok(ImageFormat::Webp),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    UnsupportedFormat(String),
    MalformedDataUrl,
    Base64(base64::DecodeError),
    Dom(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::UnsupportedFormat(s) => write!(f, "unsupported image format '{s}'"),
            ExportError::MalformedDataUrl => f.write_str("canvas returned a malformed data URL"),
            ExportError::Base64(e) => write!(f, "invalid base64 image payload: {e}"),
            ExportError::Dom(msg) => write!(f, "canvas export failed: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Base64(e) => Some(e),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for ExportError {
    fn from(e: base64::DecodeError) -> Self {
        ExportError::Base64(e)
    }
}

/// Encoded bitmap as produced by `canvas.toDataURL`.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedImage {
    /// Format the canvas actually produced; browsers fall back to PNG for
    /// types they cannot encode.
    pub format: ImageFormat,
    pub data_url: String,
}

impl EncodedImage {
    pub fn from_data_url(data_url: String) -> Result<Self, ExportError> {
        let (mime, _) = split_data_url(&data_url)?;
        let format = ImageFormat::ALL
            .into_iter()
            .find(|f| f.mime_type() == mime)
            .ok_or_else(|| ExportError::UnsupportedFormat(mime.to_string()))?;
        Ok(Self { format, data_url })
    }

    pub fn file_name(&self) -> String {
        self.format.file_name()
    }

    /// Raw encoded image bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, ExportError> {
        let (_, payload) = split_data_url(&self.data_url)?;
        Ok(STANDARD.decode(payload)?)
    }
}

/// Splits `data:<mime>;base64,<payload>` into mime and payload.
fn split_data_url(url: &str) -> Result<(&str, &str), ExportError> {
    let rest = url.strip_prefix("data:").ok_or(ExportError::MalformedDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ExportError::MalformedDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ExportError::MalformedDataUrl)?;
    Ok((mime, payload))
}
