//! Color palette / module codec (spec.md §3 `EncodingMode`, §4.4).

use serde::{Deserialize, Serialize};

/// An RGB triple, one palette entry.
pub type Rgb = [u8; 3];

/// Visual encoding mode: tagged variant carrying its own palette, per
/// spec.md §9 ("tagged variants over class hierarchy").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// 2 colors, 1 bit/module.
    Robust,
    /// 4 colors, 2 bits/module.
    Balanced,
    /// 8 colors, 3 bits/module.
    HighDensity,
}

impl EncodingMode {
    pub const fn colors(self) -> usize {
        match self {
            EncodingMode::Robust => 2,
            EncodingMode::Balanced => 4,
            EncodingMode::HighDensity => 8,
        }
    }

    pub const fn bits_per_module(self) -> usize {
        match self {
            EncodingMode::Robust => 1,
            EncodingMode::Balanced => 2,
            EncodingMode::HighDensity => 3,
        }
    }

    /// Number of colors as the camera-side grayscale/color mode identifier
    /// used by `VisualDecoder::decode_frame` (spec.md §6).
    pub const fn color_mode(self) -> usize {
        self.colors()
    }

    pub fn from_color_mode(color_mode: usize) -> Option<Self> {
        match color_mode {
            2 => Some(EncodingMode::Robust),
            4 => Some(EncodingMode::Balanced),
            8 => Some(EncodingMode::HighDensity),
            _ => None,
        }
    }

    /// Ordered palette: index 0 is always black, index 1 is always white,
    /// matching the encoder/decoder agreement in spec.md §4.4/§4.6.
    pub fn palette(self) -> &'static [Rgb] {
        match self {
            EncodingMode::Robust => &[[0, 0, 0], [255, 255, 255]],
            EncodingMode::Balanced => &[[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 0, 255]],
            EncodingMode::HighDensity => &[
                [0, 0, 0],
                [255, 255, 255],
                [255, 0, 0],
                [0, 255, 0],
                [0, 0, 255],
                [255, 255, 0],
                [255, 0, 255],
                [0, 255, 255],
            ],
        }
    }

    /// Grayscale intensity thresholds used by the decoder's fallback path
    /// (spec.md §4.6): first index whose threshold exceeds the sampled mean.
    pub fn intensity_thresholds(self) -> &'static [u8] {
        match self {
            EncodingMode::Robust => &[128],
            EncodingMode::Balanced => &[64, 128, 192],
            EncodingMode::HighDensity => &[32, 64, 96, 128, 160, 192, 224],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lengths_match_color_count() {
        for mode in [
            EncodingMode::Robust,
            EncodingMode::Balanced,
            EncodingMode::HighDensity,
        ] {
            assert_eq!(mode.palette().len(), mode.colors());
            assert_eq!(mode.intensity_thresholds().len(), mode.colors() - 1);
        }
    }

    #[test]
    fn color_mode_roundtrip() {
        for mode in [
            EncodingMode::Robust,
            EncodingMode::Balanced,
            EncodingMode::HighDensity,
        ] {
            assert_eq!(EncodingMode::from_color_mode(mode.color_mode()), Some(mode));
        }
    }
}
