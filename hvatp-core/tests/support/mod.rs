//! Shared test fixtures: render a module raster into a synthetic camera
//! image and decode straight through rectify/sample/RS without needing the
//! finder detector, since none of these rasters carry photographic texture
//! for it to lock onto.

use hvatp_core::config::VisualConfig;
use hvatp_core::rs_code::RsCodec;
use hvatp_core::sequencing::FrameMetadata;
use hvatp_core::visual::layout::{read_metadata, Raster};
use hvatp_core::visual::rectify::{compute_homography, warp_perspective};
use hvatp_core::visual::sampler::{modules_to_bytes, sample_modules_raster};
use ndarray::Array3;

/// Draw each module as a `scale`x`scale` solid block, producing a
/// module-aligned "camera image" with no geometric distortion.
pub fn render_as_camera_image(raster: &Raster, scale: usize) -> Array3<u8> {
    let module_count = raster.shape()[0];
    let size = module_count * scale;
    let mut out = Array3::zeros((size, size, 3));
    for y in 0..size {
        for x in 0..size {
            let my = y / scale;
            let mx = x / scale;
            for c in 0..3 {
                out[[y, x, c]] = raster[[my, mx, c]];
            }
        }
    }
    out
}

/// Full rectify -> sample -> RS-decode -> metadata pipeline over a
/// module-aligned camera image, skipping finder-pattern detection.
pub fn decode_via_direct_homography(
    config: &VisualConfig,
    camera_image: &Array3<u8>,
    scale: usize,
) -> (FrameMetadata, Vec<u8>, usize) {
    let size = config.module_count * scale;
    let src = [
        (0.0, 0.0),
        (size as f64 - 1.0, 0.0),
        (size as f64 - 1.0, size as f64 - 1.0),
        (0.0, size as f64 - 1.0),
    ];
    let dst = [
        (0.0, 0.0),
        (size as f64, 0.0),
        (size as f64, size as f64),
        (0.0, size as f64),
    ];
    let homography = compute_homography(&src, &dst).expect("homography solve failed");
    let warped = warp_perspective(camera_image, &homography, size).expect("warp failed");
    let module_raster = sample_modules_raster(&warped, config.module_count);

    let metadata = read_metadata(&module_raster).expect("metadata read failed");
    let encoded = modules_to_bytes(&module_raster, config.module_count, config.mode, false);
    let (decoded, error_count) = RsCodec::new()
        .decode(&encoded, config.data_symbols(), config.parity_symbols())
        .expect("RS decode failed");

    (metadata, decoded, error_count)
}
