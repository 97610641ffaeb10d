//! Decodes QR Code symbols from raw pixel buffers.
//!
//! This crate reads a QR Code; it does not write one. Given a width, height
//! and row-major pixel buffer (grayscale, RGB or RGBA), [`decode`] locates
//! the symbol, rectifies its perspective, recovers its format/version,
//! corrects transmission errors with Reed-Solomon, and returns the decoded
//! UTF-8 payload.
//!
//! Image file decoding (JPEG/PNG) and QR **encoding** are out of scope —
//! callers supply already-decoded pixels.
//!
//! # Examples
//!
//! ```no_run
//! let width = 210;
//! let height = 210;
//! let pixels: Vec<u8> = vec![255; width * height];
//! match qr_reader::decode(width, height, &pixels) {
//!     Ok(text) => println!("{text}"),
//!     Err(e) => eprintln!("no symbol: {e}"),
//! }
//! ```

mod binarizer;
mod bitmap;
mod code_ecc;
mod decoder;
#[cfg(test)]
mod end_to_end;
mod error;
mod finder;
mod gf256;
mod image;
mod interleave;
mod mask;
mod options;
mod pattern;
mod point;
mod reed_solomon;
mod rectifier;
mod runs;
mod segment_mode;
mod tables;
mod template;
mod version;

pub use code_ecc::ErrorCorrection;
pub use error::{QrError, QrResult};
pub use mask::Mask;
pub use options::DecodeOptions;
pub use point::Point;
pub use version::Version;

use bitmap::Bitmap;
use finder::FinderTriple;
use image::Image;
use rectifier::{sample_grid, Transform};

/// Decodes a QR Code from a raw pixel buffer using the default
/// [`DecodeOptions`].
pub fn decode(width: usize, height: usize, bytes: &[u8]) -> QrResult<String> {
    decode_with_options(width, height, bytes, &DecodeOptions::default())
}

/// Decodes a QR Code, retrying the binarizer's brightness offset on
/// failure per `options`.
pub fn decode_with_options(
    width: usize,
    height: usize,
    bytes: &[u8],
    options: &DecodeOptions,
) -> QrResult<String> {
    let mut last_err = None;
    for &offset in &options.brightness_offsets {
        log::trace!("decode attempt at brightness offset {offset}");
        match decode_attempt(width, height, bytes, offset, options) {
            Ok(text) => return Ok(text),
            // Programmer errors are never worth retrying with a different offset.
            Err(e @ QrError::InvalidArgument(_)) | Err(e @ QrError::ImageTooSmall { .. }) => {
                return Err(e)
            }
            Err(e) => last_err = Some(e),
        }
    }
    log::warn!("exhausted all {} brightness offsets", options.brightness_offsets.len());
    Err(last_err.unwrap_or(QrError::FinderNotFound))
}

fn adjust_brightness(bytes: &[u8], offset: i32) -> Vec<u8> {
    bytes.iter().map(|&b| (i32::from(b) + offset).clamp(0, 255) as u8).collect()
}

fn decode_attempt(
    width: usize,
    height: usize,
    bytes: &[u8],
    offset: i32,
    options: &DecodeOptions,
) -> QrResult<String> {
    let adjusted;
    let buf: &[u8] = if offset == 0 {
        bytes
    } else {
        adjusted = adjust_brightness(bytes, offset);
        &adjusted
    };

    let image = Image::new(width, height, buf)?;
    let bmp = binarizer::binarize(&image)?;

    let triple = finder::find_finder_triple(&bmp, &options.finder_variance_factors)?;
    let module_size = estimate_module_size(&triple);
    if module_size < 1.0 {
        return Err(QrError::Decode("estimated module size below 1 pixel".into()));
    }

    let size = estimate_size(&triple, module_size);
    let version = Version::size_decode(size)?;

    let sampled = rectify(&bmp, &triple, version, size, module_size, options);
    decoder::decode_symbol(&sampled)
}

fn estimate_module_size(triple: &FinderTriple) -> f64 {
    (triple.top_left.module_size + triple.top_right.module_size + triple.bottom_left.module_size) / 3.0
}

/// `size = round(dist(tl,tr)/moduleSize) + round(dist(tl,bl)/moduleSize))/2 +
/// 7`, snapped to the nearest valid QR size modulo 4.
fn estimate_size(triple: &FinderTriple, module_size: f64) -> i32 {
    let d1 = (triple.top_left.center().distance(triple.top_right.center()) / module_size).round();
    let d2 = (triple.top_left.center().distance(triple.bottom_left.center()) / module_size).round();
    let mut size = ((d1 + d2) / 2.0) as i32 + 7;
    match size % 4 {
        0 => size += 1,
        2 => size -= 1,
        3 => size -= 2,
        _ => {}
    }
    size
}

fn rectify(
    bmp: &Bitmap,
    triple: &FinderTriple,
    version: Version,
    size: i32,
    module_size: f64,
    options: &DecodeOptions,
) -> Bitmap {
    let estimate = Point::new(
        triple.top_right.x - triple.top_left.x + triple.bottom_left.x,
        triple.top_right.y - triple.top_left.y + triple.bottom_left.y,
    );

    let align_positions = tables::alignment_positions(version);
    let (br_pixel, br_module) = match align_positions.last() {
        Some(&last) => {
            let found = options.alignment_allowance_factors.iter().find_map(|&allowance| {
                log::debug!("searching alignment pattern with allowance factor {allowance}");
                finder::find_alignment(bmp, estimate.x, estimate.y, module_size, allowance)
            });
            match found {
                Some(p) => (p.center(), Point::new(last as f64 + 0.5, last as f64 + 0.5)),
                None => (estimate, Point::new(size as f64 - 3.5, size as f64 - 3.5)),
            }
        }
        None => (estimate, Point::new(size as f64 - 3.5, size as f64 - 3.5)),
    };

    let src = [
        Point::new(3.5, 3.5),
        Point::new(size as f64 - 3.5, 3.5),
        br_module,
        Point::new(3.5, size as f64 - 3.5),
    ];
    let dst = [triple.top_left.center(), triple.top_right.center(), br_pixel, triple.bottom_left.center()];
    let transform = Transform::quad_to_quad(src, dst);
    sample_grid(bmp, &transform, size as usize)
}
