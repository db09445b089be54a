//! Colour-mapped rendering of a single digit.
//!
//! Mirrors the course's matplotlib view of one image: the pixels under the
//! default viridis colormap, with a colour-scale legend alongside. The
//! output is an in-memory RGB raster; saving it is the caller's concern.

use image::{Rgb, RgbImage};
use ndarray::ArrayView2;

/// Side length of the square block each pixel is blown up to.
const CELL: u32 = 8;

/// Width of the colour-scale legend strip.
const BAR_WIDTH: u32 = 16;

/// Gap between the image and the legend.
const GAP: u32 = 8;

/// Evenly spaced anchors of matplotlib's viridis colormap.
const ANCHORS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [72, 40, 120],
    [62, 74, 137],
    [49, 104, 142],
    [38, 130, 142],
    [31, 158, 137],
    [53, 183, 121],
    [109, 205, 89],
    [253, 231, 37],
];

/// Maps `t` in [0, 1] onto the viridis colormap.
///
/// Values outside the range are clamped.
pub fn viridis(t: f32) -> Rgb<u8> {
    let position = t.clamp(0.0, 1.0) * (ANCHORS.len() - 1) as f32;
    let index = (position.floor() as usize).min(ANCHORS.len() - 2);
    let fraction = position - index as f32;

    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * fraction).round() as u8;
    let [low, high] = [ANCHORS[index], ANCHORS[index + 1]];
    Rgb([
        lerp(low[0], high[0]),
        lerp(low[1], high[1]),
        lerp(low[2], high[2]),
    ])
}

/// Renders one image as a colour-mapped raster with a legend strip.
///
/// Intensities are normalized over the image's own min..max range, so the
/// full colormap is always used; a constant image maps to the low end.
pub fn render_digit(image: ArrayView2<'_, f32>) -> RgbImage {
    let (rows, cols) = image.dim();
    let (min, max) = image.iter().fold((f32::MAX, f32::MIN), |(min, max), &v| {
        (min.min(v), max.max(v))
    });
    let span = if max > min { max - min } else { 1.0 };

    let image_width = cols as u32 * CELL;
    let height = rows as u32 * CELL;
    let mut out = RgbImage::from_pixel(image_width + GAP + BAR_WIDTH, height, Rgb([255, 255, 255]));

    for ((row, col), &value) in image.indexed_iter() {
        let colour = viridis((value - min) / span);
        for dy in 0..CELL {
            for dx in 0..CELL {
                out.put_pixel(col as u32 * CELL + dx, row as u32 * CELL + dy, colour);
            }
        }
    }

    // legend runs from max at the top to min at the bottom
    let denom = height.saturating_sub(1).max(1) as f32;
    for y in 0..height {
        let colour = viridis(1.0 - y as f32 / denom);
        for x in 0..BAR_WIDTH {
            out.put_pixel(image_width + GAP + x, y, colour);
        }
    }

    out
}
