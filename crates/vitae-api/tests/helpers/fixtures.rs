//! Test fixtures: small encoded images and multipart parts.

use axum_test::multipart::Part;
use image::{ImageBuffer, ImageFormat, Rgb, Rgba};
use std::io::Cursor;

pub fn png_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_fn(20, 10, |x, y| Rgba([(x * 12) as u8, (y * 25) as u8, 90, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode png fixture");
    out.into_inner()
}

pub fn jpeg_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_fn(20, 10, |x, y| Rgb([(x * 12) as u8, 40, (y * 25) as u8]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("Failed to encode jpeg fixture");
    out.into_inner()
}

pub fn image_part(data: Vec<u8>, file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime)
}

pub fn text_part(file_name: &str) -> Part {
    Part::bytes(bytes::Bytes::from_static(b"these are just some notes\n"))
        .file_name(file_name)
        .mime_type("text/plain")
}
