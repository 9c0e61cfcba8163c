//! Reed-Solomon outer code (spec.md §4.1).
//!
//! Systematic RS over GF(2^8) with the standard primitive polynomial 0x11D,
//! provided by the `reed-solomon` crate (the same codec family
//! `HeZeBang-TrackMaker-rs`'s `error_correction::reed_solomon` module wraps
//! for its own acoustic link). A single RS block is limited to 255 total
//! symbols, so messages are split into independently-encoded shards of at
//! most 255 bytes each and concatenated in order, as spec.md §4.1 requires.

use reed_solomon::{Decoder, Encoder};

use crate::errors::VisualDecodeError;

const MAX_BLOCK: usize = 255;

/// Plans how a `(data_len, parity_len)` pair is split into ≤255-byte RS
/// shards, spreading both the data and the parity budget as evenly as
/// possible across shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShardPlan {
    num_shards: usize,
    data_len: usize,
    parity_len: usize,
}

impl ShardPlan {
    fn new(data_len: usize, parity_len: usize) -> Self {
        let total = data_len + parity_len;
        let num_shards = total.div_ceil(MAX_BLOCK).max(1);
        Self {
            num_shards,
            data_len,
            parity_len,
        }
    }

    /// `(data_len, parity_len)` for shard `index`.
    fn shard_sizes(&self, index: usize) -> (usize, usize) {
        let data_base = self.data_len / self.num_shards;
        let data_rem = self.data_len % self.num_shards;
        let parity_base = self.parity_len / self.num_shards;
        let parity_rem = self.parity_len % self.num_shards;

        let shard_data = data_base + usize::from(index < data_rem);
        let shard_parity = parity_base + usize::from(index < parity_rem);
        (shard_data, shard_parity)
    }
}

/// Systematic Reed-Solomon codec, sharding at the 255-byte RS block limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsCodec;

impl RsCodec {
    pub fn new() -> Self {
        Self
    }

    /// `encode(data[data_len]) -> bytes[data_len + parity_len]` (spec.md
    /// §4.1's `encode` contract, generalized over the shard boundaries).
    pub fn encode(&self, data: &[u8], parity_len: usize) -> Vec<u8> {
        let plan = ShardPlan::new(data.len(), parity_len);
        let mut out = Vec::with_capacity(data.len() + parity_len);
        let mut offset = 0;

        for shard_index in 0..plan.num_shards {
            let (shard_data_len, shard_parity_len) = plan.shard_sizes(shard_index);
            let shard_data = &data[offset..offset + shard_data_len];
            offset += shard_data_len;

            out.extend_from_slice(shard_data);
            if shard_parity_len > 0 {
                let encoder = Encoder::new(shard_parity_len);
                let encoded = encoder.encode(shard_data);
                out.extend_from_slice(encoded.ecc());
            }
        }

        out
    }

    /// `decode(received[data_len + parity_len]) -> (data[data_len],
    /// corrected_count)`, or `Err(Uncorrectable)` naming the first shard
    /// whose correction radius was exceeded (spec.md §4.1/§7).
    pub fn decode(
        &self,
        received: &[u8],
        data_len: usize,
        parity_len: usize,
    ) -> Result<(Vec<u8>, usize), VisualDecodeError> {
        let plan = ShardPlan::new(data_len, parity_len);
        let mut recovered = Vec::with_capacity(data_len);
        let mut corrected_total = 0usize;
        let mut offset = 0;

        for shard_index in 0..plan.num_shards {
            let (shard_data_len, shard_parity_len) = plan.shard_sizes(shard_index);
            let shard_len = shard_data_len + shard_parity_len;
            if offset + shard_len > received.len() {
                return Err(VisualDecodeError::Uncorrectable { shard_index });
            }
            let shard = &received[offset..offset + shard_len];
            offset += shard_len;

            if shard_parity_len == 0 {
                recovered.extend_from_slice(shard);
                continue;
            }

            let decoder = Decoder::new(shard_parity_len);
            let mut buf = shard.to_vec();
            match decoder.correct(&mut buf, None) {
                Ok(corrected) => {
                    let data_part = corrected.data();
                    let errors = shard
                        .iter()
                        .zip(buf.iter())
                        .filter(|(a, b)| a != b)
                        .count();
                    corrected_total += errors;
                    recovered.extend_from_slice(data_part);
                }
                Err(_) => return Err(VisualDecodeError::Uncorrectable { shard_index }),
            }
        }

        Ok((recovered, corrected_total))
    }

    /// Maximum number of byte errors the sharding for `(data_len,
    /// parity_len)` can guarantee correcting (spec.md §4.1: `floor(parity
    /// symbols / 2)` — per shard, since correction is independent per
    /// shard and a worst-case adversarial distribution concentrates errors
    /// in the weakest shard).
    pub fn guaranteed_correction_radius(&self, data_len: usize, parity_len: usize) -> usize {
        let plan = ShardPlan::new(data_len, parity_len);
        (0..plan.num_shards)
            .map(|i| plan.shard_sizes(i).1 / 2)
            .min()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_message_single_shard_roundtrip() {
        let codec = RsCodec::new();
        let data = b"Hello, HVATP!".to_vec();
        let parity_len = 16;
        let encoded = codec.encode(&data, parity_len);
        assert_eq!(encoded.len(), data.len() + parity_len);

        let (decoded, corrected) = codec.decode(&encoded, data.len(), parity_len).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(corrected, 0);
    }

    #[test]
    fn large_message_shards_and_roundtrips() {
        let codec = RsCodec::new();
        let data: Vec<u8> = (0..1400u32).map(|i| (i % 256) as u8).collect();
        let parity_len = (1400.0 * 0.35) as usize;
        let encoded = codec.encode(&data, parity_len);
        assert_eq!(encoded.len(), data.len() + parity_len);

        let (decoded, _) = codec.decode(&encoded, data.len(), parity_len).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn corrects_errors_up_to_guaranteed_radius() {
        let codec = RsCodec::new();
        let data = vec![0u8; 200];
        let parity_len = 100; // ecc_level = 0.50 applied to 200 data bytes
        let encoded = codec.encode(&data, parity_len);

        let radius = codec.guaranteed_correction_radius(data.len(), parity_len);
        assert!(radius >= 1);

        let mut corrupted = encoded.clone();
        // Flip one byte per shard, staying within each shard's own radius.
        let plan = ShardPlan::new(data.len(), parity_len);
        let mut offset = 0;
        for shard_index in 0..plan.num_shards {
            let (shard_data, shard_parity) = plan.shard_sizes(shard_index);
            let shard_len = shard_data + shard_parity;
            if shard_parity >= 2 {
                corrupted[offset] ^= 0xFF;
            }
            offset += shard_len;
        }

        let (decoded, corrected) = codec.decode(&corrupted, data.len(), parity_len).unwrap();
        assert_eq!(decoded, data);
        assert!(corrected > 0);
    }

    #[test]
    fn uncorrectable_when_errors_exceed_radius() {
        let codec = RsCodec::new();
        let data = vec![7u8; 20];
        let parity_len = 4; // radius = 2
        let encoded = codec.encode(&data, parity_len);

        let mut corrupted = encoded;
        for b in corrupted.iter_mut().take(4) {
            *b ^= 0xFF;
        }

        let result = codec.decode(&corrupted, data.len(), parity_len);
        assert!(result.is_err());
    }
}
