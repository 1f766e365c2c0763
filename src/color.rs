use image::{DynamicImage, RgbImage};
use serde::Serialize;

use crate::error::{AssayError, Result};

// ---------------------------------------------------------------------------
// ColorSample
// ---------------------------------------------------------------------------

/// Per-channel mean of a pixel region, each channel in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorSample {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ColorSample {
    /// Nearest 8-bit colour, for drawing a swatch.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        [q(self.red), q(self.green), q(self.blue)]
    }

    /// `#rrggbb` of [`Self::to_rgb8`].
    pub fn hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

// ---------------------------------------------------------------------------
// Centre crop
// ---------------------------------------------------------------------------

/// Pixel rectangle `[left, left + width) x [top, top + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Central region spanning `H/2 ± H/k` vertically and `W/2 ± W/k`
/// horizontally (integer division), clipped to the frame.
pub fn center_crop(width: u32, height: u32, divisor: u32) -> Result<CropRegion> {
    let collapsed = AssayError::Dimension {
        width,
        height,
        divisor,
    };
    if divisor == 0 {
        return Err(collapsed);
    }

    let span = |len: u32| {
        let center = len / 2;
        let half = len / divisor;
        let start = center.saturating_sub(half);
        let end = center.saturating_add(half).min(len);
        (start, end.saturating_sub(start))
    };
    let (top, crop_h) = span(height);
    let (left, crop_w) = span(width);

    if crop_w == 0 || crop_h == 0 {
        return Err(collapsed);
    }
    Ok(CropRegion {
        left,
        top,
        width: crop_w,
        height: crop_h,
    })
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Decode JPEG/PNG bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Average colour of the centre crop.
///
/// The image is reduced to exactly three 8-bit channels first, so alpha (or
/// a 16-bit depth) never reaches the averaging step.
pub fn sample_center(image: &DynamicImage, divisor: u32) -> Result<(ColorSample, CropRegion)> {
    let rgb = image.to_rgb8();
    let region = center_crop(rgb.width(), rgb.height(), divisor)?;
    log::debug!(
        "centre crop of {}x{} frame: {:?}",
        rgb.width(),
        rgb.height(),
        region
    );
    let color = average_region(&rgb, region);
    log::info!("sampled centre colour {}", color.hex());
    Ok((color, region))
}

fn average_region(rgb: &RgbImage, region: CropRegion) -> ColorSample {
    let mut sums = [0u64; 3];
    for y in region.top..region.top + region.height {
        for x in region.left..region.left + region.width {
            let px = rgb.get_pixel(x, y);
            for (sum, &channel) in sums.iter_mut().zip(px.0.iter()) {
                *sum += u64::from(channel);
            }
        }
    }
    let count = u64::from(region.width) * u64::from(region.height);
    let mean = |sum: u64| sum as f64 / count as f64;
    ColorSample {
        red: mean(sums[0]),
        green: mean(sums[1]),
        blue: mean(sums[2]),
    }
}
