//! Caption bitmaps: bold centered text inside a rounded, bordered box.
//!
//! Label width is estimated from the character count rather than measured
//! from font metrics. The estimate is deliberately generous for Latin
//! capitals, which is what the pipeline's labels consist of.

use crate::encode::encode_png;
use crate::svg::{escape_xml, RenderError, SvgRasterizer, FONT_FAMILY};
use image::RgbaImage;
use std::path::Path;

/// Approximate advance of one glyph as a fraction of the font size.
pub const CHAR_WIDTH_FACTOR: f32 = 0.6;
pub const MIN_LABEL_WIDTH: u32 = 100;
pub const MIN_LABEL_HEIGHT: u32 = 28;
/// Added to the font size to get the label height.
const VERTICAL_PADDING: u32 = 16;
const BORDER_WIDTH: u32 = 2;
const CORNER_RADIUS: u32 = 6;
const FILL_OPACITY: f32 = 0.9;

/// Typography for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size: u32,
    /// CSS color used for both the border and the text.
    pub color: String,
    /// Space added on each side of the estimated text width.
    pub padding: u32,
}

impl LabelStyle {
    pub fn new(font_size: u32, color: impl Into<String>, padding: u32) -> Self {
        Self {
            font_size,
            color: color.into(),
            padding,
        }
    }

    /// Composite titles ("FACE REFERENCE", ...).
    pub fn title() -> Self {
        Self::new(22, "#1f2937", 24)
    }

    /// Per-image captions ("FACE-SELFIE1", ...).
    pub fn item() -> Self {
        Self::new(16, "#1f2937", 12)
    }
}

/// Pixel size of a label for `text` without rendering it.
pub fn label_size(text: &str, style: &LabelStyle) -> (u32, u32) {
    let chars = text.chars().count() as f32;
    let text_width = (chars * style.font_size as f32 * CHAR_WIDTH_FACTOR).ceil() as u32;
    let width = text_width
        .saturating_add(style.padding.saturating_mul(2))
        .max(MIN_LABEL_WIDTH);
    let height = style
        .font_size
        .saturating_add(VERTICAL_PADDING)
        .max(MIN_LABEL_HEIGHT);
    (width, height)
}

/// Renders caption bitmaps. Output depends only on the text and style.
pub struct LabelRenderer {
    svg: SvgRasterizer,
}

impl LabelRenderer {
    pub fn new() -> Self {
        Self {
            svg: SvgRasterizer::new(),
        }
    }

    /// Renderer that also loads fonts from `dir`.
    pub fn with_font_dir(dir: &Path) -> Self {
        Self {
            svg: SvgRasterizer::with_font_dir(dir),
        }
    }

    /// The underlying rasterizer, shared with other SVG-drawn references.
    pub fn rasterizer(&self) -> &SvgRasterizer {
        &self.svg
    }

    pub fn render(&self, text: &str, style: &LabelStyle) -> Result<RgbaImage, RenderError> {
        let (width, height) = label_size(text, style);
        let svg = label_svg(text, style, width, height);
        self.svg.render(&svg, width, height)
    }

    /// Render and PNG-encode a label.
    pub fn render_png(&self, text: &str, style: &LabelStyle) -> Result<Vec<u8>, LabelPngError> {
        let image = self.render(text, style)?;
        Ok(encode_png(&image)?)
    }
}

impl Default for LabelRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LabelPngError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn label_svg(text: &str, style: &LabelStyle, width: u32, height: u32) -> String {
    let inset = BORDER_WIDTH as f32 / 2.0;
    let color = escape_xml(&style.color);
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
<rect x="{inset}" y="{inset}" width="{rw}" height="{rh}" rx="{CORNER_RADIUS}" ry="{CORNER_RADIUS}" fill="#ffffff" fill-opacity="{FILL_OPACITY}" stroke="{color}" stroke-width="{BORDER_WIDTH}"/>
<text x="{cx}" y="{cy}" font-family="{FONT_FAMILY}" font-size="{fs}" font-weight="bold" fill="{color}" text-anchor="middle" dominant-baseline="central">{text}</text>
</svg>"##,
        rw = width as f32 - BORDER_WIDTH as f32,
        rh = height as f32 - BORDER_WIDTH as f32,
        cx = width as f32 / 2.0,
        cy = height as f32 / 2.0,
        fs = style.font_size,
        text = escape_xml(text),
    )
}
