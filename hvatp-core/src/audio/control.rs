//! Control-plane packet builders over the OFDM codec (spec.md §4.3, §5).

use crate::audio::packet::AudioEncoder;

/// Audio payload type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    FrameSync = 0x01,
    Operators = 0x02,
    PrngSeeds = 0x03,
    VisualParity = 0x04,
    Dictionary = 0x05,
    Control = 0x06,
}

impl PayloadType {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Builds fully-assembled control packets for the acoustic channel.
#[derive(Debug, Clone)]
pub struct AudioPacketBuilder {
    encoder: AudioEncoder,
}

impl AudioPacketBuilder {
    pub fn new(encoder: AudioEncoder) -> Self {
        Self { encoder }
    }

    /// 8-byte bitmap ACK/NACK packet (spec.md §5), one bit per visual frame.
    pub fn build_ack_packet(&self, frame_id: u32, ack_bitmap: u64, packet_seq: u16) -> Vec<f64> {
        let payload = ack_bitmap.to_be_bytes();
        self.encoder
            .encode_packet(&payload, frame_id, packet_seq, PayloadType::FrameSync.as_u8())
    }

    /// Operator instruction packet: a sequence of `(opcode, params)` pairs
    /// concatenated as `opcode || params`.
    pub fn build_operator_packet(
        &self,
        frame_id: u32,
        operators: &[(u8, Vec<u8>)],
        packet_seq: u16,
    ) -> Vec<f64> {
        let mut payload = Vec::new();
        for (opcode, params) in operators {
            payload.push(*opcode);
            payload.extend_from_slice(params);
        }
        self.encoder
            .encode_packet(&payload, frame_id, packet_seq, PayloadType::Operators.as_u8())
    }

    /// PRNG seed packet: `algorithm: u8 || seed: u32 (BE) || length: u64 (BE)`.
    pub fn build_prng_packet(
        &self,
        frame_id: u32,
        algorithm: u8,
        seed: u32,
        length: u64,
        packet_seq: u16,
    ) -> Vec<f64> {
        let mut payload = Vec::with_capacity(13);
        payload.push(algorithm);
        payload.extend_from_slice(&seed.to_be_bytes());
        payload.extend_from_slice(&length.to_be_bytes());
        self.encoder
            .encode_packet(&payload, frame_id, packet_seq, PayloadType::PrngSeeds.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AudioConfig;

    fn builder() -> AudioPacketBuilder {
        AudioPacketBuilder::new(AudioEncoder::new(AudioConfig::default()))
    }

    #[test]
    fn ack_packet_has_configured_length() {
        let b = builder();
        let packet = b.build_ack_packet(42, 0xFFFF_FFFF_FFFF_FFFF, 0);
        assert_eq!(packet.len(), b.encoder.config.samples_per_packet());
    }

    #[test]
    fn operator_packet_has_configured_length() {
        let b = builder();
        let ops = vec![(1u8, vec![0x10, 0x20]), (2u8, vec![])];
        let packet = b.build_operator_packet(1, &ops, 0);
        assert_eq!(packet.len(), b.encoder.config.samples_per_packet());
    }

    #[test]
    fn prng_packet_has_configured_length() {
        let b = builder();
        let packet = b.build_prng_packet(1, 1, 0xDEAD_BEEF, 4096, 0);
        assert_eq!(packet.len(), b.encoder.config.samples_per_packet());
    }
}
