//! End-to-end visual pipeline tests: encode -> render -> decode, exercising
//! scenarios and properties from spec.md's testable-properties section.

mod support;

use hvatp_core::config::VisualConfig;
use hvatp_core::rs_code::RsCodec;
use hvatp_core::visual::palette::EncodingMode;
use hvatp_core::visual::{FrameSequenceEncoder, VisualEncoder};
use support::{decode_via_direct_homography, render_as_camera_image};

fn balanced_config() -> VisualConfig {
    VisualConfig {
        mode: EncodingMode::Balanced,
        module_count: 200,
        ecc_level: 0.35,
    }
}

/// S1: a 1400-byte payload in Balanced mode fits in a single frame and
/// decodes back byte-exact.
#[test]
fn s1_single_frame_roundtrip_is_byte_exact() {
    let config = balanced_config();
    let sequencer = FrameSequenceEncoder::new(VisualEncoder::new(config));
    let payload = b"Hello, HVATP! ".repeat(100);
    assert_eq!(payload.len(), 1400);

    let frames = sequencer.encode_data(&payload).unwrap();
    assert_eq!(frames.len(), 1);

    let scale = 3;
    let camera_image = render_as_camera_image(&frames[0], scale);
    let (metadata, decoded, _errors) = decode_via_direct_homography(&config, &camera_image, scale);

    assert_eq!(metadata.frame_id, 0);
    assert_eq!(metadata.total_frames, 1);
    assert_eq!(&decoded[..payload.len()], &payload[..]);
}

/// Property 2: concatenating every frame's decoded payload, in frame-id
/// order, reproduces the original multi-frame payload.
#[test]
fn property2_multi_frame_sequence_reassembles_exactly() {
    let config = balanced_config();
    let sequencer = FrameSequenceEncoder::new(VisualEncoder::new(config));
    let payload: Vec<u8> = (0..6000u32).map(|i| (i % 256) as u8).collect();

    let frames = sequencer.encode_data(&payload).unwrap();
    assert!(frames.len() > 1, "payload should require more than one frame");

    let scale = 3;
    let mut reassembled = Vec::new();
    for raster in &frames {
        let camera_image = render_as_camera_image(raster, scale);
        let (metadata, decoded, _errors) = decode_via_direct_homography(&config, &camera_image, scale);
        reassembled.extend_from_slice(&decoded[..metadata.data_length as usize]);
    }

    assert_eq!(reassembled, payload);
}

/// Property 3: flipping a single byte per shard, well within each shard's
/// own guaranteed correction radius, still yields byte-exact recovery.
#[test]
fn property3_rs_correction_within_guaranteed_radius() {
    let config = VisualConfig {
        mode: EncodingMode::Robust,
        module_count: 200,
        ecc_level: 0.50,
    };
    let codec = RsCodec::new();
    let data = vec![0u8; config.data_symbols()];
    let encoded = codec.encode(&data, config.parity_symbols());

    let radius = codec.guaranteed_correction_radius(config.data_symbols(), config.parity_symbols());
    assert!(radius >= 1);

    // Spread one flip roughly every `stride` bytes so no single shard ever
    // sees more than a handful of errors, well under its own radius.
    let mut corrupted = encoded.clone();
    let stride = 64.max(corrupted.len() / radius.max(1));
    let mut idx = 0;
    while idx < corrupted.len() {
        corrupted[idx] ^= 0xFF;
        idx += stride;
    }

    let (decoded, error_count) = codec
        .decode(&corrupted, config.data_symbols(), config.parity_symbols())
        .unwrap();
    assert_eq!(decoded, data);
    assert!(error_count >= 1);
}

/// S3: Robust mode, 200 modules, ecc=0.50, a 200-zero-byte payload zero-
/// padded to the frame's full data capacity. Flipping 5% of the RS-encoded
/// module byte stream (spread evenly across shards) still decodes
/// successfully, with `error_count >= 1`.
#[test]
fn s3_five_percent_byte_flips_still_decode_successfully() {
    let config = VisualConfig {
        mode: EncodingMode::Robust,
        module_count: 200,
        ecc_level: 0.50,
    };
    let codec = RsCodec::new();
    let data_symbols = config.data_symbols();
    let parity_symbols = config.parity_symbols();

    let mut payload = vec![0u8; data_symbols];
    payload[..200].fill(0);
    let encoded = codec.encode(&payload, parity_symbols);

    let total = encoded.len();
    let flip_count = ((total as f64) * 0.05).round() as usize;
    let stride = (total / flip_count.max(1)).max(1);

    let mut corrupted = encoded.clone();
    for i in 0..flip_count {
        let idx = (i * stride) % total;
        corrupted[idx] ^= 0xAA;
    }

    let (decoded, error_count) = codec.decode(&corrupted, data_symbols, parity_symbols).unwrap();
    assert_eq!(decoded, payload);
    assert!(error_count >= 1);
}

/// Property 8: rendering a frame for display at scale >= 3 and decoding the
/// render recovers the exact same modules (and therefore the same payload)
/// as decoding the raw frame.
#[test]
fn property8_render_for_display_is_idempotent_at_scale_3() {
    let config = balanced_config();
    let encoder = VisualEncoder::new(config);
    let payload = b"idempotent render check";
    let raster = encoder.encode_frame(payload, 7, 9).unwrap();

    let rendered = encoder.render_for_display(&raster, 3);
    assert_eq!(rendered.shape(), [600, 600, 3]);

    // Sampling the rendered image back down with the same scale must
    // recover every original module's color exactly.
    let module_count = config.module_count;
    for y in 0..module_count {
        for x in 0..module_count {
            for c in 0..3 {
                assert_eq!(rendered[[y * 3, x * 3, c]], raster[[y, x, c]]);
            }
        }
    }
}
