//! Function-pattern template construction and the zigzag data-module walk
//! (spec.md §4.3). The decoder regenerates this template for a candidate
//! `(version, mask)` to know which cells of the rectified symbol carry data
//! versus which are finder/timing/alignment/format/version modules.
//!
//! Finder/alignment/timing/format/version drawing is adapted from the
//! teacher's `QrCode::draw_function_patterns` family (`draw_finder_pattern`,
//! `draw_alignment_pattern`, `draw_format_bits`, `draw_version`), which draws
//! the same modules for the opposite (encode) purpose. The zigzag order is
//! adapted from `QrCode::draw_codewords`.
use crate::bitmap::{Bitmap, Cell};
use crate::code_ecc::ErrorCorrection;
use crate::mask::Mask;
use crate::tables::{self, alignment_positions};
use crate::version::Version;

/// Draws every function module for `version`, leaving all data cells
/// `Unknown`. The format-information bits are drawn with a dummy mask value
/// of 0 (their content doesn't matter here, only that the cells are
/// claimed as non-data, exactly as the teacher's constructor does before
/// the real mask is known).
pub fn draw_template(version: Version) -> Bitmap {
    let size = version.size() as usize;
    let mut b = Bitmap::new(size, size);

    draw_timing_patterns(&mut b, size);
    draw_finder_pattern(&mut b, 3, 3, size);
    draw_finder_pattern(&mut b, size as i32 - 4, 3, size);
    draw_finder_pattern(&mut b, 3, size as i32 - 4, size);

    let positions = alignment_positions(version);
    let n = positions.len();
    for (i, &px) in positions.iter().enumerate() {
        for (j, &py) in positions.iter().enumerate() {
            let is_finder_corner =
                (i == 0 && j == 0) || (i == 0 && j == n - 1) || (i == n - 1 && j == 0);
            if !is_finder_corner {
                draw_alignment_pattern(&mut b, px, py, size);
            }
        }
    }

    draw_format_bits(&mut b, ErrorCorrection::Low, Mask::new(0), size);
    draw_version_bits(&mut b, version, size);

    b
}

fn set_fn(b: &mut Bitmap, x: i32, y: i32, size: usize, dark: bool) {
    if x >= 0 && (x as usize) < size && y >= 0 && (y as usize) < size {
        b.set(x as usize, y as usize, if dark { Cell::On } else { Cell::Off });
    }
}

fn draw_timing_patterns(b: &mut Bitmap, size: usize) {
    for i in 0..size as i32 {
        set_fn(b, 6, i, size, i % 2 == 0);
        set_fn(b, i, 6, size, i % 2 == 0);
    }
}

fn draw_finder_pattern(b: &mut Bitmap, x: i32, y: i32, size: usize) {
    for dy in -4..=4 {
        for dx in -4..=4 {
            let dist = dx.abs().max(dy.abs());
            set_fn(b, x + dx, y + dy, size, dist != 2 && dist != 4);
        }
    }
}

fn draw_alignment_pattern(b: &mut Bitmap, x: i32, y: i32, size: usize) {
    for dy in -2..=2 {
        for dx in -2..=2 {
            set_fn(b, x + dx, y + dy, size, dx.abs().max(dy.abs()) != 1);
        }
    }
}

fn get_bit(x: u32, i: u32) -> bool {
    (x >> i) & 1 != 0
}

fn draw_format_bits(b: &mut Bitmap, ecc: ErrorCorrection, mask: Mask, size: usize) {
    let bits = tables::format_bits(ecc, mask.value());

    for i in 0..6 {
        set_fn(b, 8, i, size, get_bit(bits, i as u32));
    }
    set_fn(b, 8, 7, size, get_bit(bits, 6));
    set_fn(b, 8, 8, size, get_bit(bits, 7));
    set_fn(b, 7, 8, size, get_bit(bits, 8));
    for i in 9..15 {
        set_fn(b, 14 - i, 8, size, get_bit(bits, i as u32));
    }

    let size_i = size as i32;
    for i in 0..8 {
        set_fn(b, size_i - 1 - i, 8, size, get_bit(bits, i as u32));
    }
    for i in 8..15 {
        set_fn(b, 8, size_i - 15 + i, size, get_bit(bits, i as u32));
    }
    set_fn(b, 8, size_i - 8, size, true); // always dark
}

fn draw_version_bits(b: &mut Bitmap, version: Version, size: usize) {
    if version.value() < 7 {
        return;
    }
    let bits = tables::version_bits(version);
    let size_i = size as i32;
    for i in 0..18u32 {
        let bit = get_bit(bits, i);
        let a = size_i - 11 + (i as i32 % 3);
        let bv = i as i32 / 3;
        set_fn(b, a, bv, size, bit);
        set_fn(b, bv, a, size, bit);
    }
}

/// Visits data (`Unknown`) cells of `template` in the standard QR zigzag
/// order, invoking `f(x, y, mask_bit)` for each one.
///
/// Starts at the bottom-right corner, pairs of columns moving right to
/// left (skipping column 6, the vertical timing column), alternating scan
/// direction every column pair.
pub fn walk_zigzag(template: &Bitmap, mask: Mask, mut f: impl FnMut(usize, usize, bool)) {
    let size = template.width as i32;
    let mut right = size - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        for vert in 0..size {
            for j in 0..2 {
                let x = right - j;
                let upward = (right + 1) & 2 == 0;
                let y = if upward { size - 1 - vert } else { vert };
                if template.get(x as usize, y as usize) == Cell::Unknown {
                    f(x as usize, y as usize, mask.at(x, y));
                }
            }
        }
        right -= 2;
    }
}
