//! Finder pattern detection: template matching, clustering, and corner
//! ordering (spec.md §4.5).
//!
//! No imaging crate appears anywhere in the reference pack, so the
//! grayscale conversion and normalized cross-correlation below are
//! hand-rolled over `ndarray`, the way the homography solve in
//! `rectify.rs` is.

use ndarray::Array2;

use crate::visual::layout::finder_pattern;

/// Simplified stand-in for CLAHE + bilateral smoothing: per-pixel
/// luminance, globally contrast-stretched.
pub fn enhance_image(image: &ndarray::Array3<u8>) -> Array2<f64> {
    let (h, w) = (image.shape()[0], image.shape()[1]);
    let mut gray = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let r = image[[y, x, 0]] as f64;
            let g = image[[y, x, 1]] as f64;
            let b = image[[y, x, 2]] as f64;
            gray[[y, x]] = 0.299 * r + 0.587 * g + 0.114 * b;
        }
    }

    let min = gray.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = gray.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        gray.mapv_inplace(|v| (v - min) / (max - min) * 255.0);
    }
    gray
}

fn finder_template() -> Array2<f64> {
    let pattern = finder_pattern(10);
    let mut template = Array2::zeros((10, 10));
    for (y, row) in pattern.iter().enumerate() {
        for (x, &idx) in row.iter().enumerate() {
            template[[y, x]] = if idx == 1 { 255.0 } else { 0.0 };
        }
    }
    template
}

fn resize_nearest(template: &Array2<f64>, new_h: usize, new_w: usize) -> Array2<f64> {
    let (h, w) = (template.shape()[0], template.shape()[1]);
    let mut out = Array2::zeros((new_h, new_w));
    for y in 0..new_h {
        for x in 0..new_w {
            let src_y = (y * h / new_h).min(h - 1);
            let src_x = (x * w / new_w).min(w - 1);
            out[[y, x]] = template[[src_y, src_x]];
        }
    }
    out
}

/// Normalized cross-correlation of `template` against every window of
/// `image` the same size as `template`.
fn match_template(image: &Array2<f64>, template: &Array2<f64>) -> Array2<f64> {
    let (ih, iw) = (image.shape()[0], image.shape()[1]);
    let (th, tw) = (template.shape()[0], template.shape()[1]);
    if th > ih || tw > iw {
        return Array2::zeros((0, 0));
    }

    let t_mean = template.mean().unwrap_or(0.0);
    let t_centered: Vec<f64> = template.iter().map(|&v| v - t_mean).collect();
    let t_norm = t_centered.iter().map(|v| v * v).sum::<f64>().sqrt();

    let out_h = ih - th + 1;
    let out_w = iw - tw + 1;
    let mut result = Array2::zeros((out_h, out_w));

    if t_norm == 0.0 {
        return result;
    }

    for oy in 0..out_h {
        for ox in 0..out_w {
            let window_mean: f64 = (0..th)
                .flat_map(|dy| (0..tw).map(move |dx| (dy, dx)))
                .map(|(dy, dx)| image[[oy + dy, ox + dx]])
                .sum::<f64>()
                / (th * tw) as f64;

            let mut num = 0.0;
            let mut w_sq = 0.0;
            for dy in 0..th {
                for dx in 0..tw {
                    let w_centered = image[[oy + dy, ox + dx]] - window_mean;
                    num += w_centered * t_centered[dy * tw + dx];
                    w_sq += w_centered * w_centered;
                }
            }
            let denom = (w_sq.sqrt() * t_norm).max(1e-9);
            result[[oy, ox]] = num / denom;
        }
    }
    result
}

/// Greedy single-link clustering matching the reference's pass: visit
/// points in order, absorb any unused point within `min_distance`, emit the
/// cluster centroid (spec.md §4.5).
pub fn cluster_points(points: &[(f64, f64)], min_distance: f64) -> Vec<(f64, f64)> {
    let mut used = vec![false; points.len()];
    let mut clusters = Vec::new();

    for i in 0..points.len() {
        if used[i] {
            continue;
        }
        let mut members = vec![points[i]];
        used[i] = true;
        for j in (i + 1)..points.len() {
            if used[j] {
                continue;
            }
            let dist = ((points[i].0 - points[j].0).powi(2) + (points[i].1 - points[j].1).powi(2)).sqrt();
            if dist < min_distance {
                members.push(points[j]);
                used[j] = true;
            }
        }
        let cx = members.iter().map(|p| p.0).sum::<f64>() / members.len() as f64;
        let cy = members.iter().map(|p| p.1).sum::<f64>() / members.len() as f64;
        clusters.push((cx, cy));
    }
    clusters
}

/// Multi-scale normalized cross-correlation finder detection (spec.md
/// §4.5): scales `{0.8, 1.0, 1.2}`, threshold 0.6, single-link clustering
/// at 50px, capped at 4 clusters.
pub fn detect_finder_patterns(image: &Array2<f64>) -> Vec<(f64, f64)> {
    let template = finder_template();
    let mut all_locations = Vec::new();

    for &scale in &[0.8, 1.0, 1.2] {
        let (th, tw) = (
            (template.shape()[0] as f64 * scale) as usize,
            (template.shape()[1] as f64 * scale) as usize,
        );
        if th == 0 || tw == 0 {
            continue;
        }
        let scaled = resize_nearest(&template, th, tw);
        let result = match_template(image, &scaled);
        if result.is_empty() {
            continue;
        }

        let threshold = 0.6;
        for ((oy, ox), &score) in result.indexed_iter() {
            if score >= threshold {
                all_locations.push((ox as f64 + tw as f64 / 2.0, oy as f64 + th as f64 / 2.0));
            }
        }
    }

    if all_locations.len() < 3 {
        return Vec::new();
    }

    let mut clustered = cluster_points(&all_locations, 50.0);
    clustered.truncate(4);
    clustered
}

/// Sort clusters by angle about their centroid, then rotate so the cluster
/// minimizing `x+y` is first (spec.md §4.5). Yields `(TL, TR, BR, BL)` for
/// 4 corners.
pub fn order_corners(corners: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if corners.len() < 3 {
        return corners.to_vec();
    }

    let cx = corners.iter().map(|c| c.0).sum::<f64>() / corners.len() as f64;
    let cy = corners.iter().map(|c| c.1).sum::<f64>() / corners.len() as f64;

    let mut with_angle: Vec<(f64, (f64, f64))> = corners
        .iter()
        .map(|&(x, y)| ((y - cy).atan2(x - cx), (x, y)))
        .collect();
    with_angle.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let sorted: Vec<(f64, f64)> = with_angle.into_iter().map(|(_, p)| p).collect();

    let min_idx = sorted
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.0 + a.1).partial_cmp(&(b.0 + b.1)).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut rotated = sorted[min_idx..].to_vec();
    rotated.extend_from_slice(&sorted[..min_idx]);
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_corner_ordering() {
        let corners = vec![(900.0, 100.0), (100.0, 100.0), (900.0, 900.0), (100.0, 900.0)];
        let ordered = order_corners(&corners);
        assert_eq!(
            ordered,
            vec![(100.0, 100.0), (900.0, 100.0), (900.0, 900.0), (100.0, 900.0)]
        );
    }

    #[test]
    fn cluster_merges_nearby_points() {
        let points = vec![(0.0, 0.0), (5.0, 5.0), (500.0, 500.0)];
        let clusters = cluster_points(&points, 50.0);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn fewer_than_three_locations_yields_no_corners() {
        let image = Array2::from_elem((20, 20), 128.0);
        let corners = detect_finder_patterns(&image);
        assert!(corners.is_empty());
    }
}
