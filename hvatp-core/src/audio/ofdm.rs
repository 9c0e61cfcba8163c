//! Time-domain OFDM waveform assembly (spec.md §4.3).
//!
//! Direct sinusoid summation rather than an FFT/IFFT pair — each subcarrier
//! is synthesized and summed explicitly, matching the reference encoder
//! this module is grounded on (`audio_encoder.py`'s `_ofdm_modulate`).

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::config::AudioConfig;

const BARKER_7: [i8; 7] = [1, 1, 1, -1, -1, 1, -1];

fn hann_window(len: usize) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / (len - 1) as f64).cos())
        .collect()
}

/// `s[n] = Re( sum_i symbol_i * exp(j*2*pi*f_i*t_n) )`, normalized to peak
/// amplitude 0.7 (spec.md §4.3). A silent symbol (all-zero input) stays
/// silent rather than dividing by zero.
pub fn modulate_symbols_to_samples(symbols: &[Complex64], config: &AudioConfig) -> Vec<f64> {
    let samples_per_symbol = config.samples_per_symbol();
    let sample_rate = config.sample_rate as f64;
    let freqs = config.carrier_freqs();

    let mut audio = vec![0.0f64; samples_per_symbol];
    for (symbol, freq) in symbols.iter().zip(freqs.iter()) {
        for (n, sample) in audio.iter_mut().enumerate() {
            let t = n as f64 / sample_rate;
            let carrier = Complex64::new(0.0, 2.0 * PI * freq * t).exp();
            *sample += (symbol * carrier).re;
        }
    }

    let peak = audio.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
    if peak > 0.0 {
        for sample in &mut audio {
            *sample = *sample / peak * 0.7;
        }
    }
    audio
}

/// 5ms Hann-windowed linear chirp from `carrier_start` to the top subcarrier
/// frequency, at 80% amplitude (spec.md §4.3).
pub fn generate_preamble(config: &AudioConfig) -> Vec<f64> {
    let duration = 0.005;
    let samples = (config.sample_rate as f64 * duration) as usize;
    let sample_rate = config.sample_rate as f64;
    let freqs = config.carrier_freqs();
    let f0 = config.carrier_start;
    let f1 = *freqs.last().unwrap_or(&f0);
    let window = hann_window(samples);

    (0..samples)
        .map(|n| {
            let t = n as f64 / sample_rate;
            let phase = 2.0 * PI * (f0 * t + (f1 - f0) * t * t / (2.0 * duration));
            phase.sin() * window[n] * 0.8
        })
        .collect()
}

/// 2ms Barker-7-modulated pilot sync word on every 4th subcarrier, at 60%
/// amplitude (spec.md §4.3).
pub fn generate_sync_word(config: &AudioConfig) -> Vec<f64> {
    let duration = 0.002;
    let samples = (config.sample_rate as f64 * duration) as usize;
    let sample_rate = config.sample_rate as f64;
    let freqs = config.carrier_freqs();
    let pilot_freqs: Vec<f64> = freqs.iter().step_by(4).copied().collect();

    let mut sync = vec![0.0f64; samples];
    for (i, freq) in pilot_freqs.iter().take(BARKER_7.len()).enumerate() {
        let phase_offset = if BARKER_7[i] > 0 { 0.0 } else { PI };
        for (n, sample) in sync.iter_mut().enumerate() {
            let t = n as f64 / sample_rate;
            *sample += (2.0 * PI * freq * t + phase_offset).sin();
        }
    }

    if !pilot_freqs.is_empty() {
        for sample in &mut sync {
            *sample = *sample / pilot_freqs.len() as f64 * 0.6;
        }
    }
    sync
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constellation::ModulationType;

    fn test_config() -> AudioConfig {
        AudioConfig {
            sample_rate: 48_000,
            num_subcarriers: 48,
            carrier_start: 2_500.0,
            carrier_spacing: 250.0,
            modulation: ModulationType::Qpsk,
            packet_duration: 0.05,
        }
    }

    #[test]
    fn preamble_has_expected_sample_count() {
        let cfg = test_config();
        let preamble = generate_preamble(&cfg);
        assert_eq!(preamble.len(), (cfg.sample_rate as f64 * 0.005) as usize);
        assert!(preamble.iter().all(|&s| s.abs() <= 0.8 + 1e-9));
    }

    #[test]
    fn sync_word_has_expected_sample_count() {
        let cfg = test_config();
        let sync = generate_sync_word(&cfg);
        assert_eq!(sync.len(), (cfg.sample_rate as f64 * 0.002) as usize);
    }

    #[test]
    fn ofdm_modulate_normalizes_to_point_seven_peak() {
        let cfg = test_config();
        let symbols = vec![Complex64::new(1.0, 0.0); cfg.num_subcarriers];
        let audio = modulate_symbols_to_samples(&symbols, &cfg);
        assert_eq!(audio.len(), cfg.samples_per_symbol());
        let peak = audio.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
        assert!((peak - 0.7).abs() < 1e-9);
    }

    #[test]
    fn silent_symbols_produce_silent_audio() {
        let cfg = test_config();
        let symbols = vec![Complex64::new(0.0, 0.0); cfg.num_subcarriers];
        let audio = modulate_symbols_to_samples(&symbols, &cfg);
        assert!(audio.iter().all(|&s| s == 0.0));
    }
}
