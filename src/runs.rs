//! Run-length utilities shared by the finder and alignment scanners
//! (spec.md §4.5): decomposing a scan line into alternating on/off runs and
//! testing windows of runs against an ideal ratio within a variance
//! tolerance.

/// Decomposes `len` samples of `is_on` into `(color, run_length)` pairs.
pub fn scan_runs(len: i32, is_on: impl Fn(i32) -> bool) -> Vec<(bool, i32)> {
    let mut runs = Vec::new();
    if len <= 0 {
        return runs;
    }
    let mut color = is_on(0);
    let mut length = 1;
    for i in 1..len {
        let c = is_on(i);
        if c == color {
            length += 1;
        } else {
            runs.push((color, length));
            color = c;
            length = 1;
        }
    }
    runs.push((color, length));
    runs
}

/// A 5-run window matching the `ideal` weighted ratio (e.g. `[1,1,3,1,1]`)
/// within `module_size / variance_factor` per unit, with the module size
/// itself derived from the total run length divided by `sum(ideal)`.
#[derive(Debug, Clone, Copy)]
pub struct RunMatch {
    pub module_size: f64,
    pub start_run: usize,
}

/// Scans a fully-decomposed run sequence for every window of `ideal.len()`
/// consecutive runs starting on an "on" run that matches the ideal ratio.
pub fn find_ratio_matches(runs: &[(bool, i32)], ideal: &[f64], variance_factor: f64) -> Vec<RunMatch> {
    let n = ideal.len();
    let unit: f64 = ideal.iter().sum();
    let mut out = Vec::new();
    if runs.len() < n {
        return out;
    }
    for start in 0..=runs.len() - n {
        let window = &runs[start..start + n];
        if !window[0].0 {
            continue; // must start on an "on" run
        }
        let total: i32 = window.iter().map(|&(_, l)| l).sum();
        let module_size = total as f64 / unit;
        if module_size < 1.0 {
            continue;
        }
        let max_variance = module_size / variance_factor;
        let matches = window.iter().enumerate().all(|(i, &(_, l))| {
            (l as f64 - module_size * ideal[i]).abs() < max_variance * ideal[i].max(1.0)
        });
        if matches {
            out.push(RunMatch { module_size, start_run: start });
        }
    }
    out
}

/// Offset (from the scan origin) of the midpoint of the window starting at
/// `start_run` within `runs`.
pub fn window_center(runs: &[(bool, i32)], start_run: usize, window_len: usize) -> f64 {
    let offset: i32 = runs[..start_run].iter().map(|&(_, l)| l).sum();
    let window_total: i32 = runs[start_run..start_run + window_len].iter().map(|&(_, l)| l).sum();
    offset as f64 + window_total as f64 / 2.0
}

/// Run index (within `runs`) of the sample at absolute position `pos`, if any.
pub fn run_at(runs: &[(bool, i32)], pos: i32) -> Option<usize> {
    let mut offset = 0i32;
    for (i, &(_, l)) in runs.iter().enumerate() {
        if pos >= offset && pos < offset + l {
            return Some(i);
        }
        offset += l;
    }
    None
}
