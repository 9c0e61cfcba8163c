//! Visual frame encoder (spec.md §4.4, §4.7).

use rayon::prelude::*;

use crate::config::VisualConfig;
use crate::errors::VisualEncodeError;
use crate::rs_code::RsCodec;
use crate::sequencing::FrameMetadata;
use crate::visual::layout::{
    data_positions, embed_metadata, new_raster, palette_for, set_pixel, write_finder_patterns,
    write_timing_patterns, Raster,
};

/// Encodes one chunk of data into a single `VisualFrame` raster.
#[derive(Debug, Clone)]
pub struct VisualEncoder {
    pub config: VisualConfig,
}

impl VisualEncoder {
    pub fn new(config: VisualConfig) -> Self {
        Self { config }
    }

    /// Encode `data` (truncated or zero-padded to `data_symbols`) into one
    /// raster: RS-encode, map to module colors, stamp structural patterns,
    /// embed metadata.
    pub fn encode_frame(
        &self,
        data: &[u8],
        frame_id: u32,
        total_frames: u16,
    ) -> Result<Raster, VisualEncodeError> {
        let data_symbols = self.config.data_symbols();
        if data.len() > data_symbols {
            return Err(VisualEncodeError::CapacityExceeded {
                data_len: data.len(),
                capacity: data_symbols,
            });
        }
        let actual_data_length = data.len();

        let mut chunk = data.to_vec();
        chunk.resize(data_symbols, 0);

        let encoded = RsCodec::new().encode(&chunk, self.config.parity_symbols());

        let palette = palette_for(&self.config);
        let bits_per_module = self.config.mode.bits_per_module();
        let positions = data_positions(self.config.module_count);

        let mut raster = new_raster(self.config.module_count);
        let bit_len = encoded.len() * 8;

        for (module_idx, &(x, y)) in positions.iter().enumerate() {
            let start_bit = module_idx * bits_per_module;
            let end_bit = start_bit + bits_per_module;
            if end_bit > bit_len {
                break;
            }
            let mut value = 0u8;
            for bit_idx in start_bit..end_bit {
                let byte = encoded[bit_idx / 8];
                let bit = (byte >> (7 - (bit_idx % 8))) & 1;
                value = (value << 1) | bit;
            }
            set_pixel(&mut raster, x, y, palette[value as usize]);
        }

        write_finder_patterns(&mut raster, self.config.module_count, palette);
        write_timing_patterns(&mut raster, self.config.module_count, palette);

        let metadata = FrameMetadata {
            frame_id,
            total_frames,
            data_length: actual_data_length as u16,
        };
        embed_metadata(&mut raster, &metadata, palette);

        Ok(raster)
    }

    /// Nearest-neighbor upscale for on-screen display (spec.md §4.4).
    pub fn render_for_display(&self, raster: &Raster, scale: usize) -> Raster {
        let module_count = self.config.module_count;
        let new_size = module_count * scale;
        let mut out = new_raster(new_size);
        for y in 0..new_size {
            for x in 0..new_size {
                let src_x = x / scale;
                let src_y = y / scale;
                let color = [raster[[src_y, src_x, 0]], raster[[src_y, src_x, 1]], raster[[src_y, src_x, 2]]];
                set_pixel(&mut out, x, y, color);
            }
        }
        out
    }
}

/// Splits a byte stream across however many frames its length requires and
/// encodes each one independently (spec.md §4.7).
#[derive(Debug, Clone)]
pub struct FrameSequenceEncoder {
    pub encoder: VisualEncoder,
}

impl FrameSequenceEncoder {
    pub fn new(encoder: VisualEncoder) -> Self {
        Self { encoder }
    }

    pub fn encode_data(&self, data: &[u8]) -> Result<Vec<Raster>, VisualEncodeError> {
        let data_symbols = self.encoder.config.data_symbols();
        if data.is_empty() {
            return Ok(vec![self.encoder.encode_frame(&[], 0, 1)?]);
        }

        let total_frames = data.len().div_ceil(data_symbols);
        let chunks: Vec<&[u8]> = (0..total_frames)
            .map(|i| {
                let start = i * data_symbols;
                let end = (start + data_symbols).min(data.len());
                &data[start..end]
            })
            .collect();

        chunks
            .par_iter()
            .enumerate()
            .map(|(frame_id, chunk)| {
                self.encoder
                    .encode_frame(chunk, frame_id as u32, total_frames as u16)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::palette::EncodingMode;

    fn test_config() -> VisualConfig {
        VisualConfig {
            mode: EncodingMode::Balanced,
            module_count: 200,
            ecc_level: 0.35,
        }
    }

    #[test]
    fn encode_frame_rejects_oversized_chunk() {
        let encoder = VisualEncoder::new(test_config());
        let huge = vec![0u8; encoder.config.data_symbols() + 1];
        let result = encoder.encode_frame(&huge, 0, 1);
        assert!(matches!(result, Err(VisualEncodeError::CapacityExceeded { .. })));
    }

    #[test]
    fn s1_scenario_splits_into_one_frame() {
        let encoder = VisualEncoder::new(test_config());
        let sequencer = FrameSequenceEncoder::new(encoder);
        let data = b"Hello, HVATP! ".repeat(100); // ~1.4KB
        let frames = sequencer.encode_data(&data).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn render_for_display_scales_dimensions() {
        let encoder = VisualEncoder::new(test_config());
        let raster = encoder.encode_frame(b"hi", 0, 1).unwrap();
        let scaled = encoder.render_for_display(&raster, 3);
        assert_eq!(scaled.shape(), [600, 600, 3]);
    }
}
