//! Tunable parameters for the decode pipeline (spec.md's open-question
//! resolutions around retry/relaxation behavior). Mirrors the way the
//! teacher's `QrCode::encode_segments_advanced` layers an optional
//! configuration struct over a simple entry point.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Luma offsets retried against the binarizer's threshold when the first
    /// pass fails to yield a usable symbol, applied in order.
    pub brightness_offsets: Vec<i32>,
    /// Variance tolerance for the initial finder-pattern 1:1:3:1:1 run match;
    /// loosened on successive finder-search attempts.
    pub finder_variance_factors: Vec<f64>,
    /// Widening search-window multipliers (of the expected module size) used
    /// when looking for the alignment pattern's 1:1:1 run.
    pub alignment_allowance_factors: Vec<f64>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            brightness_offsets: vec![0, 5, -5],
            finder_variance_factors: vec![2.0, 2.5, 3.0],
            alignment_allowance_factors: vec![4.0, 8.0, 16.0],
        }
    }
}
