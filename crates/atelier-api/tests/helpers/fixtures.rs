use std::io::Cursor;

use axum_test::multipart::{MultipartForm, Part};
use image::{ImageFormat, Rgb, RgbImage};

/// Noisy pixels so even small images stay above the minimum upload size.
fn noise_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let seed = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
        let [a, b, c, _] = seed.wrapping_mul(0x9E37_79B9).to_le_bytes();
        Rgb([a, b, c])
    })
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    noise_image(width, height)
        .write_to(&mut buf, format)
        .expect("Failed to encode test image");
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn image_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(data).file_name(file_name).mime_type(mime_type)
}

/// Upload form with the given text fields and image part.
pub fn artwork_form(title: &str, description: &str, category: &str, image: Part) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("description", description.to_string())
        .add_text("category", category.to_string())
        .add_part("imageFile", image)
}

/// A valid 64x48 PNG painting.
pub fn valid_png_form(title: &str) -> MultipartForm {
    artwork_form(
        title,
        "Oil on canvas",
        "painting",
        image_part(png_bytes(64, 48), "sunset.png", "image/png"),
    )
}
