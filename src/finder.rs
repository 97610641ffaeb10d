//! Finder-pattern and alignment-pattern search (spec.md §4.5): scans a
//! binarized [`Bitmap`] for 1:1:3:1:1 finder stripes and 1:1:1 alignment
//! stripes, confirms each candidate along the perpendicular and diagonal
//! axes, merges near-duplicates, and picks the finder triple whose geometry
//! best matches a right isoceles triangle.
use crate::bitmap::Bitmap;
use crate::error::{QrError, QrResult};
use crate::pattern::Pattern;
use crate::runs::{find_ratio_matches, run_at, scan_runs, window_center};

const FINDER_IDEAL: [f64; 5] = [1.0, 1.0, 3.0, 1.0, 1.0];
const ALIGNMENT_IDEAL: [f64; 3] = [1.0, 1.0, 1.0];

/// Matches a run window around `hint` (an absolute sample index) that has
/// `hint` falling in its middle run.
fn scan_match(
    len: i32,
    hint: i32,
    ideal: &[f64],
    variance: f64,
    is_on: impl Fn(i32) -> bool,
) -> Option<(f64, f64)> {
    let runs = scan_runs(len, is_on);
    let hint_run = run_at(&runs, hint)?;
    let mid = ideal.len() / 2;
    find_ratio_matches(&runs, ideal, variance)
        .into_iter()
        .find(|m| m.start_run + mid == hint_run)
        .map(|m| (window_center(&runs, m.start_run, ideal.len()), m.module_size))
}

fn confirm_vertical(bitmap: &Bitmap, x: i32, y_hint: i32, variance: f64) -> Option<(f64, f64)> {
    if x < 0 || x >= bitmap.width as i32 {
        return None;
    }
    scan_match(bitmap.height as i32, y_hint, &FINDER_IDEAL, variance, |y| {
        bitmap.get(x as usize, y as usize).is_on()
    })
}

fn confirm_horizontal(bitmap: &Bitmap, y: i32, x_hint: i32, variance: f64) -> Option<(f64, f64)> {
    if y < 0 || y >= bitmap.height as i32 {
        return None;
    }
    scan_match(bitmap.width as i32, x_hint, &FINDER_IDEAL, variance, |x| {
        bitmap.get(x as usize, y as usize).is_on()
    })
}

/// Confirms the finder candidate along a 45-degree diagonal through its
/// center, rejecting candidates too close to the image border to sample.
fn confirm_diagonal(bitmap: &Bitmap, cx: f64, cy: f64, module_size: f64, variance: f64) -> bool {
    let half = (module_size * 4.0).ceil() as i32 + 2;
    let cx0 = cx.round() as i32;
    let cy0 = cy.round() as i32;
    let (w, h) = (bitmap.width as i32, bitmap.height as i32);
    let mut pixels = Vec::with_capacity((2 * half + 1) as usize);
    for i in -half..=half {
        let (x, y) = (cx0 + i, cy0 + i);
        if x < 0 || x >= w || y < 0 || y >= h {
            return false;
        }
        pixels.push(bitmap.get(x as usize, y as usize).is_on());
    }
    let runs = scan_runs(pixels.len() as i32, |i| pixels[i as usize]);
    let Some(hint_run) = run_at(&runs, half) else { return false };
    find_ratio_matches(&runs, &FINDER_IDEAL, variance)
        .into_iter()
        .any(|m| m.start_run + 2 == hint_run)
}

/// Scans every row for finder-stripe candidates, confirming each one
/// vertically, horizontally (refining the column estimate) and diagonally
/// before merging it into the running candidate list.
fn collect_finder_candidates(bitmap: &Bitmap, variance: f64) -> Vec<Pattern> {
    let mut candidates = Vec::new();
    let width = bitmap.width as i32;
    for y in 0..bitmap.height as i32 {
        let runs = scan_runs(width, |x| bitmap.get(x as usize, y as usize).is_on());
        for m in find_ratio_matches(&runs, &FINDER_IDEAL, variance) {
            let x_est = window_center(&runs, m.start_run, 5);
            let x_round = x_est.round() as i32;

            let Some((cy, vsize)) = confirm_vertical(bitmap, x_round, y, variance) else { continue };
            let Some((cx, hsize)) =
                confirm_horizontal(bitmap, cy.round() as i32, x_round, variance)
            else {
                continue;
            };
            let avg_size = (vsize + hsize) / 2.0;
            if !confirm_diagonal(bitmap, cx, cy, avg_size, variance) {
                continue;
            }
            Pattern::merge_into(&mut candidates, Pattern::new(cx, cy, avg_size));
        }
    }
    candidates
}

/// A confirmed finder triple: top-left, top-right and bottom-left corners,
/// named by the standard orientation before rectification.
pub struct FinderTriple {
    pub top_left: Pattern,
    pub top_right: Pattern,
    pub bottom_left: Pattern,
}

fn select_triple(candidates: &[Pattern]) -> Option<FinderTriple> {
    let mut best: Option<(f64, FinderTriple)> = None;
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            for k in (j + 1)..candidates.len() {
                let pts = [candidates[i], candidates[j], candidates[k]];
                let sizes = [pts[0].module_size, pts[1].module_size, pts[2].module_size];
                let max_s = sizes.iter().cloned().fold(f64::MIN, f64::max);
                let min_s = sizes.iter().cloned().fold(f64::MAX, f64::min);
                if min_s <= 0.0 || max_s > min_s * 1.4 {
                    continue;
                }

                let d = [
                    pts[0].center().distance(pts[1].center()), // opposite pts[2]
                    pts[1].center().distance(pts[2].center()), // opposite pts[0]
                    pts[0].center().distance(pts[2].center()), // opposite pts[1]
                ];
                let opp = [2usize, 0, 1];
                let mut hyp_idx = 0;
                for idx in 1..3 {
                    if d[idx] > d[hyp_idx] {
                        hyp_idx = idx;
                    }
                }
                let hyp = d[hyp_idx];
                let top_left = pts[opp[hyp_idx]];
                let mut others: Vec<Pattern> =
                    (0..3).filter(|&idx| idx != opp[hyp_idx]).map(|idx| pts[idx]).collect();
                let (p1, p2) = (others.remove(0), others.remove(0));

                let d1 = top_left.center().distance(p1.center());
                let d2 = top_left.center().distance(p2.center());
                if d1 <= 0.0 || d2 <= 0.0 {
                    continue;
                }
                let ratio = d1.min(d2) / d1.max(d2);
                if ratio < 0.8 {
                    continue;
                }

                let v1x = p1.x - top_left.x;
                let v1y = p1.y - top_left.y;
                let v2x = p2.x - top_left.x;
                let v2y = p2.y - top_left.y;
                let cross = v1x * v2y - v1y * v2x;
                let (top_right, bottom_left) = if cross > 0.0 { (p1, p2) } else { (p2, p1) };

                let score = (hyp - 2.0 * d1).abs() + (hyp - 2.0 * d2).abs();
                if best.as_ref().map(|(s, _)| score < *s).unwrap_or(true) {
                    best = Some((score, FinderTriple { top_left, top_right, bottom_left }));
                }
            }
        }
    }
    best.map(|(_, t)| t)
}

/// Locates the three finder patterns, escalating `variance_factors` in turn
/// until a valid triple is found.
pub fn find_finder_triple(bitmap: &Bitmap, variance_factors: &[f64]) -> QrResult<FinderTriple> {
    for (i, &variance) in variance_factors.iter().enumerate() {
        if i > 0 {
            log::debug!("relaxing finder variance factor to {variance}");
        }
        let candidates = collect_finder_candidates(bitmap, variance);
        if candidates.len() >= 3 {
            if let Some(triple) = select_triple(&candidates) {
                return Ok(triple);
            }
        }
    }
    Err(QrError::FinderNotFound)
}

/// Searches a square window around `(cx, cy)` of side `allowance *
/// module_size` for a 1:1:1 alignment stripe, confirming vertically.
pub fn find_alignment(
    bitmap: &Bitmap,
    cx: f64,
    cy: f64,
    module_size: f64,
    allowance: f64,
) -> Option<Pattern> {
    let half = ((allowance * module_size) / 2.0).round() as i32;
    let (w, h) = (bitmap.width as i32, bitmap.height as i32);
    let x0 = (cx.round() as i32 - half).max(0);
    let x1 = (cx.round() as i32 + half).min(w - 1);
    let y0 = (cy.round() as i32 - half).max(0);
    let y1 = (cy.round() as i32 + half).min(h - 1);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let target = Pattern::new(cx, cy, module_size).center();
    let mut best: Option<(f64, Pattern)> = None;
    for y in y0..=y1 {
        let runs = scan_runs(x1 - x0 + 1, |i| bitmap.get((x0 + i) as usize, y as usize).is_on());
        for m in find_ratio_matches(&runs, &ALIGNMENT_IDEAL, 2.0) {
            let local_x = window_center(&runs, m.start_run, 3);
            let x = x0 as f64 + local_x;
            let x_round = x.round() as i32;
            if x_round < 0 || x_round >= w {
                continue;
            }
            let Some((cy2, vsize)) =
                scan_match(h, y, &ALIGNMENT_IDEAL, 2.0, |yy| bitmap.get(x_round as usize, yy as usize).is_on())
            else {
                continue;
            };
            let candidate = Pattern::new(x, cy2, (m.module_size + vsize) / 2.0);
            let dist = candidate.center().distance_sq(target);
            if best.as_ref().map(|(d, _)| dist < *d).unwrap_or(true) {
                best = Some((dist, candidate));
            }
        }
    }
    best.map(|(_, p)| p)
}
