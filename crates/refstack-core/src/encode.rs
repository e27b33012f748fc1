//! PNG encoding and base64 asset transcoding.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetDecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a decodable image: {0}")]
    Image(#[source] image::ImageError),
    #[error("png encoding failed: {0}")]
    Encode(#[source] image::ImageError),
}

/// Encode an RGBA buffer as PNG. The output carries no metadata chunks,
/// so identical pixels always produce identical bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Convert a base64 asset payload (any format the `image` crate decodes,
/// optionally wrapped in a `data:` URL) into PNG bytes.
pub fn base64_asset_to_png(payload: &str) -> Result<Vec<u8>, AssetDecodeError> {
    let encoded = strip_data_url(payload.trim());
    let bytes = BASE64_STANDARD.decode(encoded)?;
    let image = image::load_from_memory(&bytes).map_err(AssetDecodeError::Image)?;
    encode_png(&image.into_rgba8()).map_err(AssetDecodeError::Encode)
}

fn strip_data_url(payload: &str) -> &str {
    match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(6, 4, |x, y| Rgba([x as u8 * 40, y as u8 * 60, 90, 255]));
        encode_png(&img).unwrap()
    }

    #[test]
    fn test_encode_png_is_deterministic() {
        assert_eq!(sample_png(), sample_png());
    }

    #[test]
    fn test_base64_asset_roundtrip_dimensions() {
        let payload = BASE64_STANDARD.encode(sample_png());
        let png = base64_asset_to_png(&payload).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
    }

    #[test]
    fn test_base64_asset_accepts_data_url() {
        let payload = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(sample_png()));
        assert!(base64_asset_to_png(&payload).is_ok());
    }

    #[test]
    fn test_base64_asset_rejects_garbage() {
        assert!(matches!(
            base64_asset_to_png("not base64 at all!"),
            Err(AssetDecodeError::Base64(_))
        ));
        let not_an_image = BASE64_STANDARD.encode(b"plain text, not pixels");
        assert!(matches!(
            base64_asset_to_png(&not_an_image),
            Err(AssetDecodeError::Image(_))
        ));
    }
}
