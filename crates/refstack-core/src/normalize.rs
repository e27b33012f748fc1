//! Source image normalization.
//!
//! Phone selfies usually store pixels in sensor order and record the
//! display rotation in the EXIF Orientation tag (0x0112). Normalization
//! bakes that rotation into the pixel grid, then shrinks the result to
//! fit a square bounding box. Layout always works from the dimensions
//! returned here, never from the raw decoded size.

use crate::encode::encode_png;
use crate::types::Dimensions;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Longest edge allowed after normalization.
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

const RESIZE_FILTER: FilterType = FilterType::Triangle;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("empty image buffer")]
    EmptyInput,
    #[error("not a decodable raster image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("png encoding failed: {0}")]
    Encode(#[source] image::ImageError),
}

/// EXIF orientation values (TIFF 6.0, tag 0x0112).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Map a raw tag value. Out-of-range values are treated as `Normal`.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    pub fn exif_value(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::FlipHorizontal => 2,
            Self::Rotate180 => 3,
            Self::FlipVertical => 4,
            Self::Transpose => 5,
            Self::Rotate90 => 6,
            Self::Transverse => 7,
            Self::Rotate270 => 8,
        }
    }

    /// Read the orientation of an encoded image (JPEG, TIFF, PNG, WebP, HEIF).
    ///
    /// Missing or unreadable EXIF data yields `Normal`.
    pub fn read(bytes: &[u8]) -> Self {
        let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(_) => return Self::Normal,
        };
        exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map_or(Self::Normal, Self::from_exif)
    }

    /// Whether displaying the image swaps its width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Transverse | Self::Rotate270
        )
    }

    /// Transform stored pixels into display orientation.
    fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image,
            Self::FlipHorizontal => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::FlipVertical => image.flipv(),
            Self::Transpose => image.rotate90().fliph(),
            Self::Rotate90 => image.rotate90(),
            Self::Transverse => image.rotate270().fliph(),
            Self::Rotate270 => image.rotate270(),
        }
    }
}

/// A decoded, upright, size-capped image.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pixels: RgbaImage,
    source_orientation: Orientation,
    resized: bool,
}

impl NormalizedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Orientation recorded in the source bytes (already applied).
    pub fn source_orientation(&self) -> Orientation {
        self.source_orientation
    }

    /// Whether the size ceiling forced a resize.
    pub fn was_resized(&self) -> bool {
        self.resized
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Re-encode as PNG. The output carries no EXIF, so readers see
    /// orientation 1.
    pub fn to_png(&self) -> Result<Vec<u8>, NormalizeError> {
        encode_png(&self.pixels).map_err(NormalizeError::Encode)
    }
}

/// Corrects EXIF rotation and caps image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageNormalizer {
    max_dimension: u32,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION)
    }
}

impl ImageNormalizer {
    /// Create a normalizer capping both edges at `max_dimension` (at least 1).
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Decode `bytes`, rotate upright, and downsize to fit the bounding box.
    pub fn normalize(&self, bytes: &[u8]) -> Result<NormalizedImage, NormalizeError> {
        if bytes.is_empty() {
            return Err(NormalizeError::EmptyInput);
        }

        let decoded = image::load_from_memory(bytes).map_err(NormalizeError::Decode)?;
        let (raw_width, raw_height) = (decoded.width(), decoded.height());

        let orientation = Orientation::read(bytes);
        let upright = orientation.apply(decoded);
        let (image, resized) = downsample(upright, self.max_dimension);

        tracing::debug!(
            raw_width,
            raw_height,
            orientation = orientation.exif_value(),
            swapped = orientation.swaps_axes(),
            width = image.width(),
            height = image.height(),
            resized,
            "normalized image"
        );

        Ok(NormalizedImage {
            pixels: image.into_rgba8(),
            source_orientation: orientation,
            resized,
        })
    }
}

/// Shrink `image` so neither edge exceeds `max_dimension`, preserving
/// aspect ratio. Never upscales. Returns whether a resize happened.
fn downsample(image: DynamicImage, max_dimension: u32) -> (DynamicImage, bool) {
    if image.width() <= max_dimension && image.height() <= max_dimension {
        return (image, false);
    }
    let resized = image.resize(max_dimension, max_dimension, RESIZE_FILTER);
    (resized, true)
}
