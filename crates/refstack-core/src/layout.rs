//! Vertical stacking of a title and (image, label) pairs onto one canvas.
//!
//! Layout is split in two: [`plan`] is pure geometry over element sizes,
//! [`render`] flattens a plan onto an opaque white canvas. Every element
//! is centered horizontally against the widest element, so the canvas is
//! exactly `2 * MARGIN + widest` wide.
//!
//! ```text
//! y = MARGIN
//! title                       y += title.h + SPACING
//! for each item:
//!     image                   at y
//!     label                   at y + image.h + LABEL_GAP
//!                             y += image.h + label.h + SPACING + LABEL_GAP
//! height = y + MARGIN
//! ```

use crate::types::Dimensions;
use image::{imageops, Rgba, RgbaImage};

/// Outer margin on all four sides.
pub const MARGIN: u32 = 20;
/// Vertical space after the title and after each item.
pub const SPACING: u32 = 10;
/// Gap between an image and its label.
pub const LABEL_GAP: u32 = 5;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// One stacked entry: a picture and the caption drawn beneath it.
#[derive(Debug, Clone)]
pub struct CompositeItem {
    pub image: RgbaImage,
    pub label: RgbaImage,
}

/// Which source bitmap a placement draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Title,
    Image(usize),
    Label(usize),
}

/// Top-left position and size of one element on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub element: Element,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Positioned draw operations for one composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub canvas: Dimensions,
    pub placements: Vec<Placement>,
}

/// Compute the layout for a title and `(image, label)` size pairs.
pub fn plan(title: Dimensions, items: &[(Dimensions, Dimensions)]) -> LayoutPlan {
    // Pass 1: widest element.
    let content_width = items
        .iter()
        .flat_map(|(image, label)| [image.width, label.width])
        .fold(title.width, u32::max);

    let centered = |width: u32| MARGIN + (content_width - width) / 2;

    // Pass 2: place everything against that width.
    let mut placements = Vec::with_capacity(1 + items.len() * 2);
    let mut y = MARGIN;

    placements.push(Placement {
        element: Element::Title,
        x: centered(title.width),
        y,
        width: title.width,
        height: title.height,
    });
    y += title.height + SPACING;

    for (index, (image, label)) in items.iter().enumerate() {
        placements.push(Placement {
            element: Element::Image(index),
            x: centered(image.width),
            y,
            width: image.width,
            height: image.height,
        });
        placements.push(Placement {
            element: Element::Label(index),
            x: centered(label.width),
            y: y + image.height + LABEL_GAP,
            width: label.width,
            height: label.height,
        });
        y += image.height + label.height + SPACING + LABEL_GAP;
    }

    LayoutPlan {
        canvas: Dimensions::new(content_width + 2 * MARGIN, y + MARGIN),
        placements,
    }
}

/// Flatten a plan onto an opaque white canvas.
///
/// `plan` must have been computed from the sizes of `title` and `items`.
pub fn render(plan: &LayoutPlan, title: &RgbaImage, items: &[CompositeItem]) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(plan.canvas.width, plan.canvas.height, BACKGROUND);

    for placement in &plan.placements {
        let source = match placement.element {
            Element::Title => Some(title),
            Element::Image(i) => items.get(i).map(|item| &item.image),
            Element::Label(i) => items.get(i).map(|item| &item.label),
        };
        if let Some(source) = source {
            imageops::overlay(
                &mut canvas,
                source,
                i64::from(placement.x),
                i64::from(placement.y),
            );
        }
    }

    canvas
}

/// Plan and render in one step.
pub fn build_composite(title: &RgbaImage, items: &[CompositeItem]) -> RgbaImage {
    let sizes: Vec<(Dimensions, Dimensions)> = items
        .iter()
        .map(|item| (size_of(&item.image), size_of(&item.label)))
        .collect();
    let plan = plan(size_of(title), &sizes);
    tracing::debug!(
        width = plan.canvas.width,
        height = plan.canvas.height,
        items = items.len(),
        "composite layout planned"
    );
    render(&plan, title, items)
}

fn size_of(image: &RgbaImage) -> Dimensions {
    Dimensions::new(image.width(), image.height())
}
