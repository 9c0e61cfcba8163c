//! Full audio packet assembly: preamble + sync + header + payload, padded or
//! truncated to the configured packet length (spec.md §4.3).

use crate::audio::header::PacketHeader;
use crate::audio::ofdm::{generate_preamble, generate_sync_word, modulate_symbols_to_samples};
use crate::config::AudioConfig;
use crate::constellation::modulate_symbols;

/// OFDM packet encoder bound to one `AudioConfig`.
#[derive(Debug, Clone)]
pub struct AudioEncoder {
    pub config: AudioConfig,
}

impl AudioEncoder {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    /// Assemble a complete packet: 5ms preamble, 2ms sync word, 2-OFDM-symbol
    /// header, payload symbols, then pad/truncate to
    /// `config.samples_per_packet()`.
    pub fn encode_packet(
        &self,
        payload: &[u8],
        frame_id: u32,
        packet_seq: u16,
        payload_type: u8,
    ) -> Vec<f64> {
        let mut samples = Vec::with_capacity(self.config.samples_per_packet());

        samples.extend(generate_preamble(&self.config));
        samples.extend(generate_sync_word(&self.config));

        let header = PacketHeader {
            frame_id,
            packet_seq,
            payload_type,
        }
        .encode();
        let header_symbols1 = modulate_symbols(self.config.modulation, &header[0..4], self.config.num_subcarriers);
        let header_symbols2 = modulate_symbols(self.config.modulation, &header[4..8], self.config.num_subcarriers);
        samples.extend(modulate_symbols_to_samples(&header_symbols1, &self.config));
        samples.extend(modulate_symbols_to_samples(&header_symbols2, &self.config));

        let chunk_len = self.config.bytes_per_symbol().max(1);
        for chunk in payload.chunks(chunk_len) {
            let mut padded = chunk.to_vec();
            padded.resize(chunk_len, 0);
            let symbols = modulate_symbols(self.config.modulation, &padded, self.config.num_subcarriers);
            samples.extend(modulate_symbols_to_samples(&symbols, &self.config));
        }

        let target = self.config.samples_per_packet();
        samples.resize(target, 0.0);
        samples
    }
}
