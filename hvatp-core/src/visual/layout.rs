//! Visual frame raster layout: reserved-region predicate, finder/timing
//! patterns, and metadata embedding (spec.md §4.4).

use ndarray::Array3;

use crate::config::VisualConfig;
use crate::sequencing::FrameMetadata;
use crate::visual::palette::{EncodingMode, Rgb};

/// RGB raster, shape `(module_count, module_count, 3)`.
pub type Raster = Array3<u8>;

pub fn new_raster(module_count: usize) -> Raster {
    Array3::zeros((module_count, module_count, 3))
}

pub fn set_pixel(raster: &mut Raster, x: usize, y: usize, color: Rgb) {
    raster[[y, x, 0]] = color[0];
    raster[[y, x, 1]] = color[1];
    raster[[y, x, 2]] = color[2];
}

pub fn get_pixel(raster: &Raster, x: usize, y: usize) -> Rgb {
    [raster[[y, x, 0]], raster[[y, x, 1]], raster[[y, x, 2]]]
}

/// Side length, in modules, of a full-size corner finder block.
pub const FINDER_SIZE: usize = 10;

/// Reserved region predicate (spec.md §4.4). Encoder and decoder MUST agree
/// on this exact function — it is the contract between frame layout and
/// module sampling.
pub fn is_reserved(x: usize, y: usize, module_count: usize) -> bool {
    let finder = (x < 10 && y < 10)
        || (x >= module_count - 10 && y < 10)
        || (x < 10 && y >= module_count - 10)
        || (x >= module_count - 10 && y >= module_count - 10);
    let timing = x == 6 || y == 6;
    let metadata = (10..20).contains(&x) && (10..18).contains(&y);
    finder || timing || metadata
}

/// Count of reserved modules for a given grid size, computed directly from
/// `is_reserved` rather than a hand-maintained constant, so
/// `VisualConfig::data_modules` never drifts out of sync with the actual
/// finder/timing/metadata footprint (spec.md §3's `reserved_modules = 100`
/// undercounts all four corner finders plus timing and metadata).
pub fn reserved_module_count(module_count: usize) -> usize {
    (0..module_count)
        .map(|y| (0..module_count).filter(|&x| is_reserved(x, y, module_count)).count())
        .sum()
}

/// Palette-index grid for a concentric-ring finder pattern of side `size`:
/// outer ring white, next ring black, next white, innermost black.
pub fn finder_pattern(size: usize) -> Vec<Vec<usize>> {
    (0..size)
        .map(|y| {
            (0..size)
                .map(|x| {
                    let d = x.min(y).min(size - 1 - x).min(size - 1 - y);
                    match d {
                        0 => 1,
                        1 => 0,
                        2 => 1,
                        _ => 0,
                    }
                })
                .collect()
        })
        .collect()
}

fn stamp_pattern(raster: &mut Raster, pattern: &[Vec<usize>], origin_x: usize, origin_y: usize, palette: &[Rgb]) {
    for (dy, row) in pattern.iter().enumerate() {
        for (dx, &idx) in row.iter().enumerate() {
            set_pixel(raster, origin_x + dx, origin_y + dy, palette[idx]);
        }
    }
}

/// Stamp all four corner finders and, for `module_count > 150`, a
/// half-size advisory copy at the geometric center (spec.md §4.4 as
/// resolved by the true 4-corner detector the decoder's rectification
/// needs — see DESIGN.md).
pub fn write_finder_patterns(raster: &mut Raster, module_count: usize, palette: &[Rgb]) {
    let finder = finder_pattern(10);
    stamp_pattern(raster, &finder, 0, 0, palette);
    stamp_pattern(raster, &finder, module_count - 10, 0, palette);
    stamp_pattern(raster, &finder, 0, module_count - 10, palette);
    stamp_pattern(raster, &finder, module_count - 10, module_count - 10, palette);

    if module_count > 150 {
        let half = finder_pattern(5);
        let center = module_count / 2;
        stamp_pattern(raster, &half, center - 2, center - 2, palette);
    }
}

/// Alternating white/black along row 6 and column 6 for `x ∈ [10, M−10)`,
/// starting white at the even index (spec.md §4.4).
pub fn write_timing_patterns(raster: &mut Raster, module_count: usize, palette: &[Rgb]) {
    for i in 10..module_count - 10 {
        let color = if i % 2 == 0 { palette[1] } else { palette[0] };
        set_pixel(raster, i, 6, color);
        set_pixel(raster, 6, i, color);
    }
}

/// Embed the 9-byte frame metadata header as a flat bitstream over the
/// 10×8 (= 80-bit = 10-byte) metadata region, MSB-first, row-major,
/// 1 bit per module against `palette[0]`/`palette[1]` (spec.md §4.4).
pub fn embed_metadata(raster: &mut Raster, metadata: &FrameMetadata, palette: &[Rgb]) {
    let bytes = metadata.encode();
    let mut bit_idx = 0usize;
    'outer: for y in 10..18 {
        for x in 10..20 {
            let byte = bytes.get(bit_idx / 8).copied().unwrap_or(0);
            let bit = (byte >> (7 - (bit_idx % 8))) & 1;
            set_pixel(raster, x, y, palette[bit as usize]);
            bit_idx += 1;
            if bit_idx >= 80 {
                break 'outer;
            }
        }
    }
}

/// Read back the metadata region, sampling each module's color against a
/// binary black/white threshold, and decode the resulting 9-byte header.
pub fn read_metadata(raster: &Raster) -> Result<FrameMetadata, crate::errors::VisualDecodeError> {
    let mut bits = Vec::with_capacity(80);
    'outer: for y in 10..18 {
        for x in 10..20 {
            let [r, g, b] = get_pixel(raster, x, y);
            let intensity = (r as u32 + g as u32 + b as u32) / 3;
            bits.push(if intensity > 128 { 1u8 } else { 0u8 });
            if bits.len() >= 80 {
                break 'outer;
            }
        }
    }

    let mut bytes = [0u8; FrameMetadata::ENCODED_LEN];
    for (i, byte) in bytes.iter_mut().enumerate() {
        let mut value = 0u8;
        for bit in &bits[i * 8..i * 8 + 8] {
            value = (value << 1) | bit;
        }
        *byte = value;
    }

    FrameMetadata::decode(&bytes)
}

/// Module positions in row-major traversal order, excluding reserved cells.
pub fn data_positions(module_count: usize) -> Vec<(usize, usize)> {
    let mut positions = Vec::new();
    for y in 0..module_count {
        for x in 0..module_count {
            if !is_reserved(x, y, module_count) {
                positions.push((x, y));
            }
        }
    }
    positions
}

/// Derive the visual config's color palette, shared by encoder and decoder.
pub fn palette_for(config: &VisualConfig) -> &'static [Rgb] {
    config.mode.palette()
}

pub fn mode_from_config(config: &VisualConfig) -> EncodingMode {
    config.mode
}
