//! PNG export of track frames

use std::path::Path;

use image::{ImageBuffer, ImageResult, Rgb as Pixel, RgbImage};

use crate::sim::TrackSurface;

/// Convert a surface into an RGB image
pub fn to_image(surface: &TrackSurface) -> RgbImage {
    let width = surface.width();
    let pixels = surface.pixels();
    ImageBuffer::from_fn(width, surface.height(), |x, y| {
        let c = pixels[y as usize * width as usize + x as usize];
        Pixel([c.r, c.g, c.b])
    })
}

/// Write a surface to `path` as PNG
pub fn save_png(surface: &TrackSurface, path: impl AsRef<Path>) -> ImageResult<()> {
    let path = path.as_ref();
    to_image(surface).save(path)?;
    log::info!("Snapshot written to {}", path.display());
    Ok(())
}
