//! Pixel transforms that turn a photographed page into OCR-friendly pixels.
//!
//! All transforms read an opaque RGB image and produce 8-bit grayscale.

use image::{GrayImage, Luma, RgbImage, RgbaImage};
use imageproc::integral_image::integral_image;

/// Contrast factor for `text-enhance`.
pub const TEXT_ENHANCE_CONTRAST: f32 = 1.5;
/// Contrast factor for the default mode.
pub const DEFAULT_CONTRAST: f32 = 1.2;
/// Half-width of the adaptive-threshold neighborhood, in pixels.
pub const ADAPTIVE_RADIUS: u32 = 11;
/// Subtracted from the local mean before comparing.
pub const ADAPTIVE_OFFSET: f32 = 15.0;

/// Blend RGBA onto an opaque white background.
pub fn composite_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

fn average(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 + g as f32 + b as f32) / 3.0
}

fn stretch(value: f32, factor: f32) -> f32 {
    factor * (value - 128.0) + 128.0
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Luma grayscale followed by a contrast stretch around mid-gray.
pub fn text_enhance(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([to_u8(stretch(luma(r, g, b), TEXT_ENHANCE_CONTRAST))])
    })
}

/// Average grayscale, then a hard global threshold.
pub fn binarize(image: &RgbImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([if average(r, g, b) > threshold as f32 { 255 } else { 0 }])
    })
}

/// Average grayscale, mild contrast stretch, then a global threshold.
pub fn default_process(image: &RgbImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let value = stretch(average(r, g, b), DEFAULT_CONTRAST);
        Luma([if value > threshold as f32 { 255 } else { 0 }])
    })
}

/// Local-mean threshold over a (2r+1)² window, clipped at the edges.
///
/// Window sums come from an integral image, so cost does not grow with the
/// window size; the output matches the direct per-window average.
pub fn adaptive_threshold(image: &RgbImage, radius: u32, offset: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    let gray = GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([to_u8(average(r, g, b))])
    });

    // (width+1)×(height+1); entry (x, y) sums gray[..x][..y].
    let integral = integral_image::<_, u64>(&gray);
    let at = |x: u32, y: u32| integral.get_pixel(x, y).0[0];

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(width);
        let y1 = (y + radius + 1).min(height);
        let sum = at(x1, y1) + at(x0, y0) - at(x1, y0) - at(x0, y1);
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        let mean = sum as f64 / count;
        let pixel = gray.get_pixel(x, y).0[0] as f64;
        Luma([if pixel > mean - offset as f64 { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    fn naive_adaptive(image: &RgbImage, radius: i64, offset: f64) -> GrayImage {
        let (w, h) = (image.width() as i64, image.height() as i64);
        let gray: Vec<f64> = image
            .pixels()
            .map(|p| to_u8(average(p.0[0], p.0[1], p.0[2])) as f64)
            .collect();
        GrayImage::from_fn(w as u32, h as u32, |x, y| {
            let (x, y) = (x as i64, y as i64);
            let mut sum = 0.0;
            let mut count = 0.0;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx >= 0 && nx < w && ny >= 0 && ny < h {
                        sum += gray[(ny * w + nx) as usize];
                        count += 1.0;
                    }
                }
            }
            let pixel = gray[(y * w + x) as usize];
            Luma([if pixel > sum / count - offset { 255 } else { 0 }])
        })
    }

    #[test]
    fn transparent_pixels_become_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let rgb = composite_on_white(&rgba);
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn binarize_splits_at_threshold() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([120, 120, 120]));
        rgb.put_pixel(1, 0, Rgb([121, 121, 121]));
        rgb.put_pixel(2, 0, Rgb([250, 0, 0]));
        let out = binarize(&rgb, 120);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 255);
        assert_eq!(out.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn text_enhance_uses_luma_and_stretches() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, Rgb([128, 128, 128]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        let out = text_enhance(&rgb);
        assert_eq!(out.get_pixel(0, 0).0[0], 128);
        // luma 149.685 -> 1.5 * 21.685 + 128 = 160.5
        assert_eq!(out.get_pixel(1, 0).0[0], 161);
    }

    #[test]
    fn adaptive_matches_direct_window_average() {
        let rgb = RgbImage::from_fn(40, 30, |x, y| {
            let v = ((x * 37 + y * 91) % 256) as u8;
            Rgb([v, v.wrapping_mul(3), 255 - v])
        });
        let fast = adaptive_threshold(&rgb, 5, 15.0);
        let slow = naive_adaptive(&rgb, 5, 15.0);
        assert_eq!(fast, slow);
    }

    #[test]
    fn adaptive_handles_a_single_pixel() {
        let rgb = RgbImage::from_pixel(1, 1, Rgb([40, 40, 40]));
        let out = adaptive_threshold(&rgb, ADAPTIVE_RADIUS, ADAPTIVE_OFFSET);
        assert_eq!(out.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn adaptive_keeps_dark_text_under_a_shadow() {
        // Left half shadowed, right half bright; a dark stroke in each.
        let rgb = RgbImage::from_fn(60, 20, |x, y| {
            let background = if x < 30 { 90 } else { 230 };
            let v = if y == 10 && x % 30 > 5 && x % 30 < 25 { background - 60 } else { background };
            Rgb([v, v, v])
        });
        let out = adaptive_threshold(&rgb, ADAPTIVE_RADIUS, ADAPTIVE_OFFSET);
        assert_eq!(out.get_pixel(15, 10).0[0], 0);
        assert_eq!(out.get_pixel(45, 10).0[0], 0);
        assert_eq!(out.get_pixel(15, 2).0[0], 255);
        assert_eq!(out.get_pixel(45, 2).0[0], 255);
    }
}
