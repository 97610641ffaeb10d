//! Adaptive binarization: turns a raw [`Image`] into a [`Bitmap`] of only
//! `On`/`Off` cells via an 8x8-block local threshold (spec.md §4.4).
use log::debug;

use crate::bitmap::{Bitmap, Cell};
use crate::error::{QrError, QrResult};
use crate::image::Image;

const BLOCK: usize = 8;
const MIN_DIM: usize = 40; // 5 blocks per side

pub fn binarize(img: &Image) -> QrResult<Bitmap> {
    if img.width < MIN_DIM || img.height < MIN_DIM {
        return Err(QrError::ImageTooSmall { width: img.width, height: img.height });
    }

    let b_width = img.width.div_ceil(BLOCK);
    let b_height = img.height.div_ceil(BLOCK);
    let mut thresholds = vec![0i32; b_width * b_height];

    for by in 0..b_height {
        for bx in 0..b_width {
            let x0 = bx * BLOCK;
            let y0 = by * BLOCK;
            let x1 = (x0 + BLOCK).min(img.width);
            let y1 = (y0 + BLOCK).min(img.height);

            let mut min = 255i32;
            let mut max = 0i32;
            let mut sum = 0i32;
            let mut count = 0i32;
            for y in y0..y1 {
                for x in x0..x1 {
                    let l = img.luma(x, y) as i32;
                    min = min.min(l);
                    max = max.max(l);
                    sum += l;
                    count += 1;
                }
            }

            let threshold = if max - min > 24 {
                sum / count
            } else {
                let mut t = min / 2;
                debug!("block ({bx}, {by}) is nearly uniform (max-min={}), falling back to min/2 with neighbor smoothing", max - min);
                if bx > 0 && by > 0 {
                    let left = thresholds[by * b_width + (bx - 1)];
                    let above = thresholds[(by - 1) * b_width + bx];
                    let above_left = thresholds[(by - 1) * b_width + (bx - 1)];
                    let prev = (above + 2 * left + above_left) / 4;
                    if t < prev {
                        t = prev;
                    }
                }
                t
            };
            thresholds[by * b_width + bx] = threshold;
        }
    }

    let mut out = Bitmap::new(img.width, img.height);
    for y in 0..img.height {
        for x in 0..img.width {
            let by = ((y / BLOCK) as i64).clamp(2, b_height as i64 - 3) as usize;
            let bx = ((x / BLOCK) as i64).clamp(2, b_width as i64 - 3) as usize;

            let mut sum = 0i32;
            for dy in -2..=2i64 {
                for dx in -2..=2i64 {
                    let ny = (by as i64 + dy) as usize;
                    let nx = (bx as i64 + dx) as usize;
                    sum += thresholds[ny * b_width + nx];
                }
            }
            let mean = sum / 25;

            let on = (img.luma(x, y) as i32) <= mean;
            out.set(x, y, if on { Cell::On } else { Cell::Off });
        }
    }

    Ok(out)
}
