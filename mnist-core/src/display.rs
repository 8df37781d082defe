//! Inspection and preprocessing helpers
//!
//! Pure transforms over a single image or a slice of samples.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{MnistError, Result};

/// Shades from dark to bright, one per 64-value band
pub const SHADES: [&str; 4] = ["░", "▒", "▓", "█"];

/// Side length of an MNIST image
pub const IMAGE_SIDE: usize = 28;

/// Render a square image as shaded text, one line per row.
///
/// ```
/// let image = [0u8, 255, 128, 64];
/// let text = mnist_core::display::print_digit(&image).unwrap();
/// assert_eq!(text, "░ █\n▓ ▒");
/// ```
pub fn print_digit<T: Copy + Into<f32>>(image: &[T]) -> Result<String> {
    let side = (image.len() as f64).sqrt() as usize;
    if side * side != image.len() {
        return Err(MnistError::format(
            "image",
            format!("{} pixels is not a square image", image.len()),
        ));
    }
    if side == 0 {
        return Ok(String::new());
    }

    let rows: Vec<String> = image
        .chunks(side)
        .map(|row| {
            row.iter()
                .map(|&v| shade(v.into()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    Ok(rows.join("\n"))
}

fn shade(value: f32) -> &'static str {
    let band = (value / 64.0).floor().clamp(0.0, (SHADES.len() - 1) as f32);
    SHADES[band as usize]
}

/// Reduce a 28×28 image to 14×14 by averaging each 2×2 block
pub fn downscale_image(image: &[u8]) -> Result<Vec<f32>> {
    if image.len() != IMAGE_SIDE * IMAGE_SIDE {
        return Err(MnistError::format(
            "image",
            format!(
                "downscaling needs {} pixels, got {}",
                IMAGE_SIDE * IMAGE_SIDE,
                image.len()
            ),
        ));
    }

    let half = IMAGE_SIDE / 2;
    let mut scaled = Vec::with_capacity(half * half);
    for i in (0..IMAGE_SIDE).step_by(2) {
        for j in (0..IMAGE_SIDE).step_by(2) {
            let sum = image[i * IMAGE_SIDE + j] as f32
                + image[i * IMAGE_SIDE + j + 1] as f32
                + image[(i + 1) * IMAGE_SIDE + j] as f32
                + image[(i + 1) * IMAGE_SIDE + j + 1] as f32;
            scaled.push(sum / 4.0);
        }
    }
    Ok(scaled)
}

/// Map pixels from 0..=255 to 0.0..=1.0
pub fn normalize(image: &[u8]) -> Vec<f32> {
    image.iter().map(|&v| v as f32 / 255.0).collect()
}

/// Shuffle in place (Fisher-Yates). Pass a seeded RNG for reproducible order.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
