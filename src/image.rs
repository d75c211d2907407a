//! Conversion of rendered buffers to images and saving them to disk.

use std::path::Path;

use image::{GrayImage, ImageBuffer, ImageResult, Luma, Rgb, RgbImage};
use log::info;

use crate::resource::{Buffer2D, Color};

fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    return x as usize + y as usize * width as usize;
}

/// Copies color buffer into an rgb8 image, row 0 stays the top row.
pub fn to_rgb_image(buffer: &Buffer2D<Color>) -> RgbImage {
    let data = buffer.as_slice();
    let width = buffer.width();
    return ImageBuffer::from_fn(width, buffer.height(), |x, y| {
        let color = data[pixel_index(width, x, y)];
        Rgb([color.r, color.g, color.b])
    });
}

/// Image, representing depth buffer values. Nearest fragment is white, farthest is black,
/// pixels that never got a finite depth are black too.
pub fn depth_to_image(buffer: &Buffer2D<f32>) -> GrayImage {
    let data = buffer.as_slice();
    let finite = || data.iter().copied().filter(|z| z.is_finite());
    let z_min = finite().fold(f32::INFINITY, f32::min);
    let z_max = finite().fold(f32::NEG_INFINITY, f32::max);
    let scale = if z_max > z_min { z_max - z_min } else { 1.0 };

    let width = buffer.width();
    return ImageBuffer::from_fn(width, buffer.height(), |x, y| {
        let z = data[pixel_index(width, x, y)];
        if !z.is_finite() {
            return Luma([0]);
        }
        let scaled_z = (1.0 - (z - z_min) / scale) * 255.0;
        Luma([scaled_z.round() as u8])
    });
}

/// Saves color buffer, format is deduced from the extension.
pub fn save_color_buffer<P: AsRef<Path>>(buffer: &Buffer2D<Color>, path: P) -> ImageResult<()> {
    to_rgb_image(buffer).save(path.as_ref())?;
    info!("Saved color buffer to {}", path.as_ref().display());
    return Ok(());
}

pub fn save_depth_buffer<P: AsRef<Path>>(buffer: &Buffer2D<f32>, path: P) -> ImageResult<()> {
    depth_to_image(buffer).save(path.as_ref())?;
    info!("Saved depth buffer to {}", path.as_ref().display());
    return Ok(());
}
