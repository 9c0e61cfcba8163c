//! Binary PPM (P6) raster I/O.
//!
//! The pack carries no imaging crate, so frames are written/read as plain
//! PPM: a human-inspectable stand-in for whatever image format a real
//! printer/camera pipeline would use, same rationale as the hand-rolled
//! homography solver in `hvatp_core::visual::rectify`.

use color_eyre::eyre::{bail, eyre, Context, Result};
use ndarray::Array3;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a raster (module grid or rendered display image) as a binary PPM file.
pub fn write_ppm<P: AsRef<Path>>(raster: &Array3<u8>, path: P) -> Result<()> {
    let path = path.as_ref();
    let shape = raster.shape();
    let (height, width) = (shape[0], shape[1]);

    let file = std::fs::File::create(path).wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    write!(writer, "P6\n{} {}\n255\n", width, height)?;
    for y in 0..height {
        for x in 0..width {
            writer.write_all(&[raster[[y, x, 0]], raster[[y, x, 1]], raster[[y, x, 2]]])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read a binary PPM file back into a raster.
pub fn read_ppm<P: AsRef<Path>>(path: P) -> Result<Array3<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    let mut cursor = 0usize;
    let magic = read_token(&bytes, &mut cursor)?;
    if magic != "P6" {
        bail!("{}: not a binary PPM (P6) file", path.display());
    }
    let width: usize = read_token(&bytes, &mut cursor)?.parse().wrap_err("invalid PPM width")?;
    let height: usize = read_token(&bytes, &mut cursor)?.parse().wrap_err("invalid PPM height")?;
    let maxval: usize = read_token(&bytes, &mut cursor)?.parse().wrap_err("invalid PPM maxval")?;
    if maxval != 255 {
        bail!("{}: only maxval=255 PPM files are supported", path.display());
    }
    // Header parsing consumes exactly one whitespace byte after maxval.
    cursor += 1;

    let expected = width * height * 3;
    let pixel_bytes = &bytes[cursor..];
    if pixel_bytes.len() < expected {
        bail!(
            "{}: truncated pixel data, expected {} bytes, got {}",
            path.display(),
            expected,
            pixel_bytes.len()
        );
    }

    let mut raster = Array3::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let offset = (y * width + x) * 3;
            raster[[y, x, 0]] = pixel_bytes[offset];
            raster[[y, x, 1]] = pixel_bytes[offset + 1];
            raster[[y, x, 2]] = pixel_bytes[offset + 2];
        }
    }
    Ok(raster)
}

/// Read one whitespace-delimited token from a PPM header, skipping `#` comments.
fn read_token(bytes: &[u8], cursor: &mut usize) -> Result<String> {
    loop {
        while *cursor < bytes.len() && bytes[*cursor].is_ascii_whitespace() {
            *cursor += 1;
        }
        if *cursor < bytes.len() && bytes[*cursor] == b'#' {
            while *cursor < bytes.len() && bytes[*cursor] != b'\n' {
                *cursor += 1;
            }
            continue;
        }
        break;
    }

    let start = *cursor;
    while *cursor < bytes.len() && !bytes[*cursor].is_ascii_whitespace() {
        *cursor += 1;
    }
    if start == *cursor {
        return Err(eyre!("unexpected end of PPM header"));
    }
    Ok(String::from_utf8_lossy(&bytes[start..*cursor]).into_owned())
}
