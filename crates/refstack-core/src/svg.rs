//! SVG rasterization via resvg.
//!
//! Labels and the format guide are described as small SVG documents and
//! rasterized here, so text layout, rounded corners and dashed strokes
//! all come from one renderer.

use image::{Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::path::Path;
use thiserror::Error;

/// Font stack used by every generated document.
pub const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, Helvetica, sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid svg document: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
}

/// Holds the font database and parse options shared by all renders.
pub struct SvgRasterizer {
    options: usvg::Options<'static>,
}

impl SvgRasterizer {
    /// Rasterizer backed by the system font database.
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        tracing::debug!(faces = options.fontdb.len(), "loaded system fonts");
        Self { options }
    }

    /// Rasterizer backed by the system fonts plus every font under `dir`.
    pub fn with_font_dir(dir: &Path) -> Self {
        let mut rasterizer = Self::new();
        rasterizer.options.fontdb_mut().load_fonts_dir(dir);
        tracing::debug!(
            dir = %dir.display(),
            faces = rasterizer.options.fontdb.len(),
            "loaded font directory"
        );
        rasterizer
    }

    /// Render `svg` onto a transparent `width`×`height` canvas.
    pub fn render(&self, svg: &str, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        let tree = usvg::Tree::from_str(svg, &self.options)?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        Ok(pixmap_to_rgba(&pixmap))
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// tiny-skia stores premultiplied alpha; `image` expects straight alpha.
fn pixmap_to_rgba(pixmap: &tiny_skia::Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// Escape text for use in SVG character data or attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
