//! Configuration types for the HVATP visual and acoustic codecs.
//!
//! Mirrors the teacher's `ProtocolConfig`/`SimulationConfig` pattern: plain
//! `serde`-derived structs with a `Default` impl for every tunable, fatal
//! validation performed once at construction time (spec.md §7).

use serde::{Deserialize, Serialize};

use crate::constellation::ModulationType;
use crate::errors::ConfigError;
use crate::visual::palette::EncodingMode;

/// Visual symbol carrier configuration (spec.md §3 `VisualFrameParams`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualConfig {
    pub mode: EncodingMode,
    pub module_count: usize,
    pub ecc_level: f64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            mode: EncodingMode::Balanced,
            module_count: 200,
            ecc_level: 0.35,
        }
    }
}

impl VisualConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(50..=500).contains(&self.module_count) {
            return Err(ConfigError::InvalidModuleCount {
                count: self.module_count,
            });
        }
        if !(0.25..=0.50).contains(&self.ecc_level) {
            return Err(ConfigError::InvalidEccLevel {
                level: format!("{:.4}", self.ecc_level),
            });
        }
        Ok(())
    }

    /// `data_modules = module_count^2 - reserved_modules`. `reserved_modules`
    /// is computed from `visual::layout::is_reserved` rather than the
    /// nominal `100` spec.md §3 quotes, which undercounts the real
    /// finder/timing/metadata footprint and would otherwise let the encoder
    /// plan a codeword longer than what the raster can actually carry.
    pub fn data_modules(&self) -> usize {
        self.module_count * self.module_count - crate::visual::layout::reserved_module_count(self.module_count)
    }

    /// `total_symbols = floor(data_modules * bits_per_module / 8)`.
    pub fn total_symbols(&self) -> usize {
        (self.data_modules() * self.mode.bits_per_module()) / 8
    }

    /// `parity_symbols = floor(total_symbols * ecc_level)`.
    pub fn parity_symbols(&self) -> usize {
        (self.total_symbols() as f64 * self.ecc_level) as usize
    }

    /// `data_symbols = total_symbols - parity_symbols`.
    pub fn data_symbols(&self) -> usize {
        self.total_symbols() - self.parity_symbols()
    }
}

/// Acoustic OFDM packet configuration (spec.md §3 `AudioParams`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: usize,
    pub num_subcarriers: usize,
    pub carrier_start: f64,
    pub carrier_spacing: f64,
    pub modulation: ModulationType,
    pub packet_duration: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            num_subcarriers: 48,
            carrier_start: 2_500.0,
            carrier_spacing: 250.0,
            modulation: ModulationType::Qpsk,
            packet_duration: 0.05,
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        if self.num_subcarriers == 0 {
            return Err(ConfigError::InvalidSubcarrierCount);
        }
        if self.carrier_spacing <= 0.0 {
            return Err(ConfigError::InvalidCarrierSpacing);
        }
        if self.packet_duration <= 0.0 {
            return Err(ConfigError::InvalidPacketDuration);
        }
        Ok(())
    }

    /// `samples_per_packet = round(sample_rate * packet_duration)`.
    pub fn samples_per_packet(&self) -> usize {
        (self.sample_rate as f64 * self.packet_duration).round() as usize
    }

    /// `symbol_duration = packet_duration / 4`.
    pub fn symbol_duration(&self) -> f64 {
        self.packet_duration / 4.0
    }

    /// `samples_per_symbol = round(sample_rate * symbol_duration)`.
    pub fn samples_per_symbol(&self) -> usize {
        (self.sample_rate as f64 * self.symbol_duration()).round() as usize
    }

    /// `carrier_freqs[i] = carrier_start + i * carrier_spacing`.
    pub fn carrier_freqs(&self) -> Vec<f64> {
        (0..self.num_subcarriers)
            .map(|i| self.carrier_start + i as f64 * self.carrier_spacing)
            .collect()
    }

    /// Bytes of payload one OFDM symbol can carry for this modulation.
    pub fn bytes_per_symbol(&self) -> usize {
        (self.num_subcarriers * self.modulation.bits_per_symbol()) / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visual_default_rejects_nothing() {
        assert!(VisualConfig::default().validate().is_ok());
    }

    #[test]
    fn visual_config_rejects_out_of_range_module_count() {
        let cfg = VisualConfig {
            module_count: 10,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidModuleCount { count: 10 })
        ));
    }

    #[test]
    fn visual_config_rejects_out_of_range_ecc() {
        let cfg = VisualConfig {
            ecc_level: 0.9,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidEccLevel { .. })));
    }

    #[test]
    fn s1_scenario_derived_capacity() {
        // S1: Balanced mode, module_count=200, ecc=0.35
        let cfg = VisualConfig {
            mode: EncodingMode::Balanced,
            module_count: 200,
            ecc_level: 0.35,
        };
        let data_modules = 200 * 200 - crate::visual::layout::reserved_module_count(200);
        assert_eq!(cfg.data_modules(), data_modules);
        let total_symbols = (data_modules * 2) / 8;
        assert_eq!(cfg.total_symbols(), total_symbols);
        assert!(cfg.data_symbols() >= 1400);
    }

    #[test]
    fn s2_scenario_packet_length() {
        // S2: sample_rate=48000, packet_duration=0.05 -> 2400 samples
        let cfg = AudioConfig {
            sample_rate: 48_000,
            num_subcarriers: 48,
            packet_duration: 0.05,
            modulation: ModulationType::Qpsk,
            ..Default::default()
        };
        assert_eq!(cfg.samples_per_packet(), 2400);
        assert_eq!(cfg.samples_per_symbol(), 600);
    }

    #[test]
    fn audio_config_rejects_zero_sample_rate() {
        let cfg = AudioConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSampleRate)));
    }
}
