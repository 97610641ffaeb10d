//! Raw pixel buffer input. Image file decoding (JPEG/PNG) is out of scope —
//! this crate consumes already-decoded bytes, as spec.md §6 requires.
use crate::error::{QrError, QrResult};

/// A raw, row-major, top-left-origin pixel buffer. Format (grayscale, RGB,
/// RGBA) is inferred from `bytes.len() / (width * height)`.
pub struct Image<'a> {
    pub width: usize,
    pub height: usize,
    bytes: &'a [u8],
    bytes_per_pixel: usize,
}

impl<'a> Image<'a> {
    pub fn new(width: usize, height: usize, bytes: &'a [u8]) -> QrResult<Self> {
        if width == 0 || height == 0 {
            return Err(QrError::InvalidArgument("width and height must be positive".into()));
        }
        if bytes.is_empty() {
            return Err(QrError::InvalidArgument("pixel buffer must not be empty".into()));
        }
        let pixels = width * height;
        if bytes.len() % pixels != 0 {
            return Err(QrError::InvalidArgument(format!(
                "buffer length {} does not divide evenly into {}x{} pixels",
                bytes.len(),
                width,
                height
            )));
        }
        let bytes_per_pixel = bytes.len() / pixels;
        if !matches!(bytes_per_pixel, 1 | 3 | 4) {
            return Err(QrError::InvalidArgument(format!(
                "unsupported bytes-per-pixel {bytes_per_pixel}, expected 1, 3 or 4"
            )));
        }
        Ok(Self { width, height, bytes, bytes_per_pixel })
    }

    /// Luma of the pixel at `(x, y)`, clamped to a byte.
    ///
    /// `Y = (R + 2G + B) / 4` for color input; grayscale input bypasses the
    /// formula and is treated as pre-computed luma, per spec.md §4.4/§6.
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        let i = (y * self.width + x) * self.bytes_per_pixel;
        match self.bytes_per_pixel {
            1 => self.bytes[i],
            3 | 4 => {
                let r = self.bytes[i] as u32;
                let g = self.bytes[i + 1] as u32;
                let b = self.bytes[i + 2] as u32;
                ((r + 2 * g + b) / 4).min(255) as u8
            }
            _ => unreachable!(),
        }
    }
}
