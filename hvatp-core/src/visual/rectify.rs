//! Perspective rectification: 4-point homography solve and warp (spec.md
//! §4.5). Hand-rolled Gaussian elimination — no linear-algebra crate
//! appears anywhere in the reference pack, and an 8-unknown solve doesn't
//! warrant pulling one in.

use ndarray::Array3;

/// Solve the 3×3 homography (with `h[2][2] = 1`) mapping `src[i] -> dst[i]`
/// for `i in 0..4`, via Gaussian elimination on the standard 8-equation
/// linear system. Returns `None` if the system is singular.
pub fn compute_homography(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Option<[[f64; 3]; 3]> {
    let mut a = [[0.0f64; 9]; 8];
    let mut b = [0.0f64; 8];

    for i in 0..4 {
        let (x, y) = src[i];
        let (u, v) = dst[i];
        a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, 0.0];
        b[2 * i] = u;
        a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, 0.0];
        b[2 * i + 1] = v;
    }

    let h = solve_linear_8(&a, &b)?;
    Some([[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]])
}

/// Gaussian elimination with partial pivoting over an 8x8 system (the 9th
/// column of `a` is unused scratch matching the 3x3 homography layout).
fn solve_linear_8(a_in: &[[f64; 9]; 8], b_in: &[f64; 8]) -> Option<[f64; 8]> {
    let mut a = [[0.0f64; 9]; 8];
    for i in 0..8 {
        a[i][..8].copy_from_slice(&a_in[i][..8]);
        a[i][8] = b_in[i];
    }

    for col in 0..8 {
        let mut pivot = col;
        for row in (col + 1)..8 {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);

        let pivot_val = a[col][col];
        for v in a[col].iter_mut() {
            *v /= pivot_val;
        }

        for row in 0..8 {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor != 0.0 {
                for k in 0..9 {
                    a[row][k] -= factor * a[col][k];
                }
            }
        }
    }

    let mut h = [0.0f64; 8];
    for (i, slot) in h.iter_mut().enumerate() {
        *slot = a[i][8];
    }
    Some(h)
}

fn invert_3x3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() < 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;

    let mut out = [[0.0f64; 3]; 3];
    out[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
    out[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
    out[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
    out[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
    out[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
    out[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
    out[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
    out[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
    out[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;
    Some(out)
}

/// Warp `image` by `homography` (mapping source -> destination) into a
/// `size x size` canonical raster, sampling nearest-neighbor by inverse
/// mapping each destination pixel back to source space.
pub fn warp_perspective(image: &Array3<u8>, homography: &[[f64; 3]; 3], size: usize) -> Option<Array3<u8>> {
    let inv = invert_3x3(homography)?;
    let (ih, iw) = (image.shape()[0], image.shape()[1]);
    let mut out = Array3::zeros((size, size, 3));

    for y in 0..size {
        for x in 0..size {
            let (u, v) = (x as f64, y as f64);
            let w = inv[2][0] * u + inv[2][1] * v + inv[2][2];
            if w.abs() < 1e-12 {
                continue;
            }
            let src_x = (inv[0][0] * u + inv[0][1] * v + inv[0][2]) / w;
            let src_y = (inv[1][0] * u + inv[1][1] * v + inv[1][2]) / w;

            let sx = src_x.round() as i64;
            let sy = src_y.round() as i64;
            if sx < 0 || sy < 0 || sx as usize >= iw || sy as usize >= ih {
                continue;
            }
            for c in 0..3 {
                out[[y, x, c]] = image[[sy as usize, sx as usize, c]];
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_square_solves_to_identity_like_mapping() {
        let src = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let dst = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let h = compute_homography(&src, &dst).unwrap();
        // Mapping the source corners through h should land back on dst.
        for (i, &(x, y)) in src.iter().enumerate() {
            let w = h[2][0] * x + h[2][1] * y + h[2][2];
            let u = (h[0][0] * x + h[0][1] * y + h[0][2]) / w;
            let v = (h[1][0] * x + h[1][1] * y + h[1][2]) / w;
            assert!((u - dst[i].0).abs() < 1e-6);
            assert!((v - dst[i].1).abs() < 1e-6);
        }
    }

    #[test]
    fn warp_of_uniform_image_stays_uniform() {
        let src = [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)];
        let dst = [(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0)];
        let h = compute_homography(&src, &dst).unwrap();
        let mut image = Array3::zeros((20, 20, 3));
        image.mapv_inplace(|_: u8| 42);
        let warped = warp_perspective(&image, &h, 40).unwrap();
        assert_eq!(warped[[20, 20, 0]], 42);
    }
}
