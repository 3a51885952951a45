//! Pie chart of a run's successful and failed layers.

use std::f64::consts::TAU;
use std::io::Cursor;

use image::{ImageFormat, ImageResult, Rgb, RgbImage};

pub const CHART_SIZE: u32 = 600;

pub const SUCCESS_COLOR: Rgb<u8> = Rgb([0x4C, 0xAF, 0x50]);
pub const FAILURE_COLOR: Rgb<u8> = Rgb([0xF4, 0x43, 0x36]);
pub const EMPTY_COLOR: Rgb<u8> = Rgb([0xBD, 0xBD, 0xBD]);
const BACKGROUND: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

const CENTER_X: f64 = 300.0;
const CENTER_Y: f64 = 270.0;
const RADIUS: f64 = 220.0;

const SWATCH: u32 = 20;
const SWATCH_Y: u32 = 530;
const SUCCESS_SWATCH_X: u32 = 170;
const FAILURE_SWATCH_X: u32 = 410;

/// Draw the chart.
///
/// The successful slice starts at 12 o'clock and runs counter-clockwise; the
/// failed slice fills the rest. With nothing processed the disc is grey. Two
/// legend swatches sit under the pie, successful on the left.
pub fn render_pie(successful: usize, failed: usize) -> RgbImage {
    let processed = successful + failed;
    let success_sweep = if processed == 0 {
        0.0
    } else {
        TAU * successful as f64 / processed as f64
    };

    RgbImage::from_fn(CHART_SIZE, CHART_SIZE, |x, y| {
        if let Some(color) = legend_pixel(x, y) {
            return color;
        }

        let dx = x as f64 + 0.5 - CENTER_X;
        let dy = CENTER_Y - (y as f64 + 0.5);
        if dx * dx + dy * dy > RADIUS * RADIUS {
            return BACKGROUND;
        }
        if processed == 0 {
            return EMPTY_COLOR;
        }
        if slice_angle(dx, dy) < success_sweep {
            SUCCESS_COLOR
        } else {
            FAILURE_COLOR
        }
    })
}

/// Angle of a point, counter-clockwise from 12 o'clock, in `[0, TAU)`.
fn slice_angle(dx: f64, dy: f64) -> f64 {
    let angle = (-dx).atan2(dy);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

fn legend_pixel(x: u32, y: u32) -> Option<Rgb<u8>> {
    if !(SWATCH_Y..SWATCH_Y + SWATCH).contains(&y) {
        return None;
    }
    if (SUCCESS_SWATCH_X..SUCCESS_SWATCH_X + SWATCH).contains(&x) {
        Some(SUCCESS_COLOR)
    } else if (FAILURE_SWATCH_X..FAILURE_SWATCH_X + SWATCH).contains(&x) {
        Some(FAILURE_COLOR)
    } else {
        None
    }
}

/// PNG bytes of [`render_pie`].
pub fn render_pie_png(successful: usize, failed: usize) -> ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    render_pie(successful, failed).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Points well inside the pie, relative to its center.
    fn at(img: &RgbImage, dx: i32, dy: i32) -> Rgb<u8> {
        let x = (CENTER_X as i32 + dx) as u32;
        let y = (CENTER_Y as i32 - dy) as u32;
        *img.get_pixel(x, y)
    }

    #[test]
    fn quarter_success_sits_between_twelve_and_nine() {
        let img = render_pie(1, 3);
        // upper-left quadrant: first quarter counter-clockwise from 12
        assert_eq!(at(&img, -100, 100), SUCCESS_COLOR);
        assert_eq!(at(&img, 100, 100), FAILURE_COLOR);
        assert_eq!(at(&img, -100, -100), FAILURE_COLOR);
    }

    #[test]
    fn all_success_is_green() {
        let img = render_pie(5, 0);
        assert_eq!(at(&img, 0, 150), SUCCESS_COLOR);
        assert_eq!(at(&img, 150, -10), SUCCESS_COLOR);
    }

    #[test]
    fn nothing_processed_is_grey() {
        let img = render_pie(0, 0);
        assert_eq!(at(&img, 0, 0), EMPTY_COLOR);
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn legend_swatches_are_drawn() {
        let img = render_pie(1, 1);
        assert_eq!(*img.get_pixel(SUCCESS_SWATCH_X + 5, SWATCH_Y + 5), SUCCESS_COLOR);
        assert_eq!(*img.get_pixel(FAILURE_SWATCH_X + 5, SWATCH_Y + 5), FAILURE_COLOR);
    }

    #[test]
    fn png_has_signature() {
        let png = render_pie_png(2, 1).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
