//! Getting RGB samples out of images.
//!
//! Alpha is dropped, not used as a mask. Large images can be shrunk first so
//! clustering cost stays bounded.

use std::path::Path;

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use palette::Srgb;
use tracing::debug;

use crate::error::{PaletteError, Result};
use crate::kmeans::Pixel;

/// Decode an in-memory image in any format the `image` crate recognises.
pub fn decode(input: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(input)?)
}

/// Read and decode an image file.
pub fn open(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Size to shrink a `width`×`height` image to so that neither side exceeds
/// `max_dimension`, keeping the aspect ratio. Images already small enough are
/// left alone.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return (width, height);
    }
    let max = max_dimension as f64;
    if width > height {
        let h = (height as f64 * max / width as f64).round().max(1.0) as u32;
        (max_dimension, h)
    } else {
        let w = (width as f64 * max / height as f64).round().max(1.0) as u32;
        (w, max_dimension)
    }
}

/// Flatten an image into RGB samples, optionally downscaling it first.
pub fn pixels_from_image(img: &DynamicImage, max_dimension: Option<u32>) -> Vec<Pixel> {
    let (orig_w, orig_h) = img.dimensions();
    let (w, h) = match max_dimension {
        Some(max) => target_dimensions(orig_w, orig_h, max),
        None => (orig_w, orig_h),
    };

    let rgb = if (w, h) == (orig_w, orig_h) {
        img.to_rgb8()
    } else {
        debug!(orig_w, orig_h, w, h, "downscaling before clustering");
        image::imageops::resize(&img.to_rgb8(), w, h, FilterType::Triangle)
    };

    rgb.pixels()
        .map(|p| Srgb::new(p.0[0], p.0[1], p.0[2]))
        .collect()
}

/// Flatten a raw RGBA buffer (four bytes per pixel, row-major) into RGB
/// samples.
pub fn pixels_from_rgba(data: &[u8]) -> Result<Vec<Pixel>> {
    if data.len() % 4 != 0 {
        return Err(PaletteError::InvalidRgbaLength(data.len()));
    }
    Ok(data
        .chunks_exact(4)
        .map(|chunk| Srgb::new(chunk[0], chunk[1], chunk[2]))
        .collect())
}
