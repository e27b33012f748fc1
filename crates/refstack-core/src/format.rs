//! Framing guide telling the generator the required output geometry.
//!
//! The guide is a fully transparent canvas at the exact target size with a
//! dashed rectangle inset from the edges and the aspect-ratio descriptor
//! written in the middle. It carries no subject content.

use crate::svg::{escape_xml, RenderError, SvgRasterizer, FONT_FAMILY};
use crate::types::AspectRatio;
use image::RgbaImage;

/// Distance from the canvas edge to the guide rectangle.
pub const GUIDE_INSET: u32 = 8;
const GUIDE_STROKE: u32 = 4;
const GUIDE_COLOR: &str = "#111827";
const MIN_FONT_SIZE: u32 = 16;

/// Text written inside the guide.
pub fn guide_text(aspect: &AspectRatio) -> String {
    format!(
        "FORMAT {} ({}x{})",
        aspect.description, aspect.width, aspect.height
    )
}

/// Render the framing guide at `aspect.width` × `aspect.height`.
pub fn render_guide(svg: &SvgRasterizer, aspect: &AspectRatio) -> Result<RgbaImage, RenderError> {
    let document = guide_svg(aspect);
    svg.render(&document, aspect.width, aspect.height)
}

fn guide_svg(aspect: &AspectRatio) -> String {
    let (width, height) = (aspect.width, aspect.height);
    let inset = GUIDE_INSET as f32 + GUIDE_STROKE as f32 / 2.0;
    let font_size = (width.min(height) / 16).max(MIN_FONT_SIZE);
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
<rect x="{inset}" y="{inset}" width="{rw}" height="{rh}" fill="none" stroke="{GUIDE_COLOR}" stroke-width="{GUIDE_STROKE}" stroke-dasharray="{dash} {gap}"/>
<text x="{cx}" y="{cy}" font-family="{FONT_FAMILY}" font-size="{font_size}" font-weight="bold" fill="{GUIDE_COLOR}" text-anchor="middle" dominant-baseline="central">{text}</text>
</svg>"##,
        rw = (width as f32 - 2.0 * inset).max(0.0),
        rh = (height as f32 - 2.0 * inset).max(0.0),
        dash = GUIDE_STROKE * 4,
        gap = GUIDE_STROKE * 2,
        cx = width as f32 / 2.0,
        cy = height as f32 / 2.0,
        text = escape_xml(&guide_text(aspect)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_text() {
        let aspect = AspectRatio::new(1024, 1536, "2:3 portrait");
        assert_eq!(guide_text(&aspect), "FORMAT 2:3 portrait (1024x1536)");
    }

    #[test]
    fn test_guide_has_exact_dimensions() {
        let aspect = AspectRatio::new(320, 200, "16:10");
        let img = render_guide(&SvgRasterizer::new(), &aspect).unwrap();
        assert_eq!((img.width(), img.height()), (320, 200));
    }

    #[test]
    fn test_guide_is_transparent_outside_rectangle() {
        let aspect = AspectRatio::new(200, 200, "1:1");
        let img = render_guide(&SvgRasterizer::new(), &aspect).unwrap();

        // Corner margin outside the guide
        assert_eq!(img.get_pixel(2, 2)[3], 0);
        assert_eq!(img.get_pixel(197, 197)[3], 0);
        // Between the top stroke and the centered text
        assert_eq!(img.get_pixel(100, 40)[3], 0);
    }

    #[test]
    fn test_guide_draws_border() {
        let aspect = AspectRatio::new(200, 200, "1:1");
        let img = render_guide(&SvgRasterizer::new(), &aspect).unwrap();
        // Left stroke spans x = 8..12; count opaque pixels along it.
        let x = GUIDE_INSET + GUIDE_STROKE / 2;
        let painted = (0..200).filter(|&y| img.get_pixel(x, y)[3] > 128).count();
        assert!(painted > 50, "expected a dashed border, painted = {painted}");
    }

    #[test]
    fn test_zero_sized_guide_fails() {
        let aspect = AspectRatio::new(0, 512, "broken");
        assert!(matches!(
            render_guide(&SvgRasterizer::new(), &aspect),
            Err(RenderError::Canvas { .. })
        ));
    }
}
