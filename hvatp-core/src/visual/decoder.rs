//! Camera-side visual decoder: detect, rectify, sample, RS-decode, parse
//! metadata (spec.md §4.5, §4.6, §6).

use ndarray::Array3;

use crate::config::VisualConfig;
use crate::errors::VisualDecodeError;
use crate::rs_code::RsCodec;
use crate::sequencing::FrameMetadata;
use crate::visual::detector::{detect_finder_patterns, enhance_image, order_corners};
use crate::visual::layout::read_metadata;
use crate::visual::palette::EncodingMode;
use crate::visual::rectify::{compute_homography, warp_perspective};
use crate::visual::sampler::{modules_to_bytes, sample_modules_raster};

/// Result of a successful frame decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub frame_id: u32,
    pub total_frames: u16,
    pub data: Vec<u8>,
    pub error_count: usize,
}

/// Camera-side decoder bound to one `VisualConfig`, tracking running
/// success statistics across frames (spec.md §6).
#[derive(Debug, Clone)]
pub struct VisualDecoder {
    pub config: VisualConfig,
    frames_attempted: usize,
    frames_successful: usize,
}

impl VisualDecoder {
    pub fn new(config: VisualConfig) -> Self {
        Self {
            config,
            frames_attempted: 0,
            frames_successful: 0,
        }
    }

    pub fn frames_attempted(&self) -> usize {
        self.frames_attempted
    }

    pub fn frames_successful(&self) -> usize {
        self.frames_successful
    }

    pub fn success_rate(&self) -> f64 {
        if self.frames_attempted == 0 {
            0.0
        } else {
            self.frames_successful as f64 / self.frames_attempted as f64
        }
    }

    /// Decode a single camera frame: enhance, detect corners, rectify,
    /// sample modules, RS-decode, parse metadata.
    pub fn decode_frame(&mut self, camera_image: &Array3<u8>, grayscale_fallback: bool) -> Result<DecodedFrame, VisualDecodeError> {
        self.frames_attempted += 1;
        let result = self.decode_frame_inner(camera_image, grayscale_fallback);
        if result.is_ok() {
            self.frames_successful += 1;
        }
        result
    }

    fn decode_frame_inner(
        &self,
        camera_image: &Array3<u8>,
        grayscale_fallback: bool,
    ) -> Result<DecodedFrame, VisualDecodeError> {
        let enhanced = enhance_image(camera_image);
        let corners = detect_finder_patterns(&enhanced);
        if corners.len() < 3 {
            return Err(VisualDecodeError::NotDetected);
        }
        if corners.len() != 4 {
            // Matches the reference design: partial (3-corner) detections
            // are reported as not-detected rather than guessed at.
            return Err(VisualDecodeError::NotDetected);
        }

        let ordered = order_corners(&corners);
        let src = [ordered[0], ordered[1], ordered[2], ordered[3]];

        // Detected corners are finder *centers* (spec.md §4.5), inset
        // `(FINDER_SIZE-1)/2` modules from the true grid edge — the
        // homography's destination points need the same inset, not the
        // canonical square's extreme corners, or the whole module grid
        // rescales around the wrong reference frame.
        const CANONICAL_PX_PER_MODULE: f64 = 4.0;
        let size = self.config.module_count as f64 * CANONICAL_PX_PER_MODULE;
        let inset = (crate::visual::layout::FINDER_SIZE as f64 - 1.0) / 2.0 * CANONICAL_PX_PER_MODULE;
        let dst = [
            (inset, inset),
            (size - inset, inset),
            (size - inset, size - inset),
            (inset, size - inset),
        ];

        let homography = compute_homography(&src, &dst).ok_or(VisualDecodeError::RectificationFailed)?;
        let warped =
            warp_perspective(camera_image, &homography, size as usize).ok_or(VisualDecodeError::RectificationFailed)?;

        let module_raster = sample_modules_raster(&warped, self.config.module_count);

        let metadata = read_metadata(&module_raster)?;

        let encoded = modules_to_bytes(&module_raster, self.config.module_count, self.config.mode, grayscale_fallback);

        let data_symbols = self.config.data_symbols();
        let parity_symbols = self.config.parity_symbols();
        let (decoded_data, error_count) = RsCodec::new().decode(&encoded, data_symbols, parity_symbols)?;

        if metadata.data_length as usize > decoded_data.len() {
            return Err(VisualDecodeError::BadMetadata {
                reason: format!(
                    "data_length {} exceeds decoded payload of {} bytes",
                    metadata.data_length,
                    decoded_data.len()
                ),
            });
        }

        Ok(DecodedFrame {
            frame_id: metadata.frame_id,
            total_frames: metadata.total_frames,
            data: decoded_data[..metadata.data_length as usize].to_vec(),
            error_count,
        })
    }
}

/// Resolve the encoding mode a raw `color_mode` integer names (spec.md §6),
/// the same mapping `VisualDecoder::decode_frame`'s caller uses to pick a
/// `VisualConfig`.
pub fn mode_for_color_mode(color_mode: usize) -> Option<EncodingMode> {
    EncodingMode::from_color_mode(color_mode)
}
