//! Module sampler: reduce a rectified pixel raster to one averaged color
//! per module, then quantize to palette indices or bytes (spec.md §4.6).

use ndarray::Array3;

use crate::visual::layout::{data_positions, get_pixel, new_raster, set_pixel, Raster};
use crate::visual::palette::{EncodingMode, Rgb};

/// Reduce a rectified `(S, S, 3)` pixel image to a `(module_count,
/// module_count, 3)` raster by averaging the central 60% square of each
/// module's pixel block (spec.md §4.6). Runs over every module position,
/// reserved or not, so the metadata region and data region share one
/// uniform representation.
pub fn sample_modules_raster(warped: &Array3<u8>, module_count: usize) -> Raster {
    let pixels_per_module = warped.shape()[0] / module_count;
    let margin = pixels_per_module / 5; // central 60%: trim 20% off each side
    let mut out = new_raster(module_count);

    for y in 0..module_count {
        for x in 0..module_count {
            let y_start = y * pixels_per_module + margin;
            let y_end = ((y + 1) * pixels_per_module).saturating_sub(margin).max(y_start + 1);
            let x_start = x * pixels_per_module + margin;
            let x_end = ((x + 1) * pixels_per_module).saturating_sub(margin).max(x_start + 1);

            let mut sums = [0u64; 3];
            let mut count = 0u64;
            for py in y_start..y_end.min(warped.shape()[0]) {
                for px in x_start..x_end.min(warped.shape()[1]) {
                    for c in 0..3 {
                        sums[c] += warped[[py, px, c]] as u64;
                    }
                    count += 1;
                }
            }
            let color = if count == 0 {
                [0, 0, 0]
            } else {
                [
                    (sums[0] / count) as u8,
                    (sums[1] / count) as u8,
                    (sums[2] / count) as u8,
                ]
            };
            set_pixel(&mut out, x, y, color);
        }
    }
    out
}

/// Nearest palette color by squared-RGB distance.
pub fn quantize_color(color: Rgb, palette: &[Rgb]) -> usize {
    palette
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| {
            let dr = color[0] as i32 - p[0] as i32;
            let dg = color[1] as i32 - p[1] as i32;
            let db = color[2] as i32 - p[2] as i32;
            dr * dr + dg * dg + db * db
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Grayscale fallback: first threshold index whose value exceeds the mean
/// intensity (spec.md §4.6).
pub fn quantize_intensity(color: Rgb, thresholds: &[u8]) -> usize {
    let mean = (color[0] as u32 + color[1] as u32 + color[2] as u32) / 3;
    for (i, &t) in thresholds.iter().enumerate() {
        if (mean as u8) < t {
            return i;
        }
    }
    thresholds.len()
}

/// Walk the non-reserved module positions in traversal order, quantize each
/// sampled color to a palette index, and pack `bits_per_module` bits per
/// module MSB-first into bytes, discarding any trailing partial byte
/// (spec.md §4.6).
pub fn modules_to_bytes(raster: &Raster, module_count: usize, mode: EncodingMode, grayscale: bool) -> Vec<u8> {
    let palette = mode.palette();
    let thresholds = mode.intensity_thresholds();
    let bits_per_module = mode.bits_per_module();

    let mut bitstream: Vec<u8> = Vec::new();
    for (x, y) in data_positions(module_count) {
        let color = get_pixel(raster, x, y);
        let value = if grayscale {
            quantize_intensity(color, thresholds)
        } else {
            quantize_color(color, palette)
        };
        for bit_pos in (0..bits_per_module).rev() {
            bitstream.push(((value >> bit_pos) & 1) as u8);
        }
    }

    bitstream
        .chunks(8)
        .filter(|chunk| chunk.len() == 8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit))
        .collect()
}
