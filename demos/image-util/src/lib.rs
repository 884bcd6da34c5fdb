use std::path::Path;

use anyhow::Context;
use image::{GrayImage, Luma};
use ndarray::Array2;

/// Decode an image as grayscale intensities in `[0, 255]`, shape
/// `(height, width)`.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> anyhow::Result<Array2<f64>> {
    let img = image::open(&path)
        .with_context(|| format!("failed to read image {}", path.as_ref().display()))?
        .into_luma8();

    let (w, h) = img.dimensions();

    Ok(Array2::from_shape_fn((h as usize, w as usize), |(i, j)| {
        img.get_pixel(j as u32, i as u32)[0] as f64
    }))
}

/// Clip samples to `[0, 255]` and write an 8-bit grayscale image.
pub fn save_grayscale<P: AsRef<Path>>(path: P, x: &Array2<f64>) -> anyhow::Result<()> {
    let (m, n) = x.dim();

    let mut img = GrayImage::new(n as u32, m as u32);

    for i in 0..m {
        for j in 0..n {
            let l = x[[i, j]].max(0.0).min(255.0) as u8;
            img.put_pixel(j as u32, i as u32, Luma([l]));
        }
    }

    img.save(path.as_ref())
        .with_context(|| format!("failed to write image {}", path.as_ref().display()))?;

    Ok(())
}

/// Numbered snapshot for step visualization, `dir/{prefix}_{index:06}.png`.
pub fn save_frame<P: AsRef<Path>>(
    dir: P,
    prefix: &str,
    index: usize,
    x: &Array2<f64>,
) -> anyhow::Result<()> {
    save_grayscale(
        dir.as_ref().join(format!("{}_{:06}.png", prefix, index)),
        x,
    )
}
