//! Image content inspection: decoding and metadata removal.

use std::io::Cursor;

use bytes::Bytes;
use image::{GenericImageView, ImageFormat, ImageReader, Limits};
use img_parts::{jpeg::Jpeg, ImageEXIF};

use crate::error::SecurityError;

/// Fully decode `data` and return its dimensions.
///
/// The sniffed format must agree with `declared_content_type`, and neither
/// side may exceed `max_dimension`. This is CPU-bound; call it from a
/// blocking task.
pub fn decode_dimensions(
    data: &[u8],
    declared_content_type: &str,
    max_dimension: u32,
) -> Result<(u32, u32), SecurityError> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| SecurityError::Undecodable(e.to_string()))?;

    let sniffed = reader
        .format()
        .ok_or_else(|| SecurityError::Undecodable("unrecognized image format".to_string()))?;
    if ImageFormat::from_mime_type(declared_content_type) != Some(sniffed) {
        return Err(SecurityError::ContentSniffMismatch(
            declared_content_type.to_string(),
        ));
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);
    reader.limits(limits);

    let img = reader
        .decode()
        .map_err(|e| SecurityError::Undecodable(e.to_string()))?;

    Ok(img.dimensions())
}

/// Remove the EXIF segment from a JPEG.
///
/// Returns `Ok(None)` when the file carries no EXIF data, so callers can keep
/// the original bytes untouched.
pub fn strip_jpeg_exif(data: &Bytes) -> Result<Option<Bytes>, SecurityError> {
    let mut jpeg =
        Jpeg::from_bytes(data.clone()).map_err(|e| SecurityError::ExifStripFailed(e.to_string()))?;

    if jpeg.exif().is_none() {
        return Ok(None);
    }

    jpeg.set_exif(None);
    Ok(Some(jpeg.encoder().bytes()))
}

/// Whether a JPEG carries an EXIF segment. Non-JPEG input yields `false`.
pub fn jpeg_has_exif(data: &Bytes) -> bool {
    Jpeg::from_bytes(data.clone())
        .map(|jpeg| jpeg.exif().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod test_images {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Encode a noisy test image; noise keeps small PNGs above the minimum
    /// upload size.
    pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let seed = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
            let [a, b, c, _] = seed.wrapping_mul(0x9E37_79B9).to_le_bytes();
            Rgb([a, b, c])
        });
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    /// JPEG with a minimal big-endian TIFF block in its EXIF segment.
    pub fn jpeg_with_exif(width: u32, height: u32) -> Bytes {
        let plain = encode(width, height, ImageFormat::Jpeg);
        let mut jpeg = Jpeg::from_bytes(Bytes::from(plain)).unwrap();
        jpeg.set_exif(Some(Bytes::from_static(
            b"MM\x00\x2a\x00\x00\x00\x08\x00\x00\x00\x00\x00\x00",
        )));
        jpeg.encoder().bytes()
    }
}
