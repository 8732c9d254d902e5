//! Density-aware binning shared by color stops and legend thresholds.

use serde::{Deserialize, Serialize};

/// Equal-width bins across `[min, max]`
pub const BIN_COUNT: usize = 20;
/// Sliding window widths in bins (10% to 50% of the range)
pub const WINDOW_BINS: [usize; 5] = [2, 4, 6, 8, 10];

/// Interval holding the highest density of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DenseRange {
    pub start: f64,
    pub end: f64,
    /// No dense window could be found; `[start, end]` is the full range
    pub uniform: bool,
}

impl DenseRange {
    pub fn uniform(min: f64, max: f64) -> Self {
        Self {
            start: min,
            end: max,
            uniform: true,
        }
    }

    /// Point at fraction `t` of the range
    pub fn at(&self, t: f64) -> f64 {
        lerp(self.start, self.end, t)
    }
}

/// Linear interpolation that stays finite for finite endpoints
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Position of `v` in `[min, max]` as a fraction; halves keep the
/// differences finite near `f64::MAX`
fn fraction(v: f64, min: f64, max: f64) -> f64 {
    (v * 0.5 - min * 0.5) / (max * 0.5 - min * 0.5)
}

/// Counts of `values` per bin
pub fn histogram(values: &[f64], min: f64, max: f64) -> [usize; BIN_COUNT] {
    let mut bins = [0usize; BIN_COUNT];
    if !(max > min) || !min.is_finite() || !max.is_finite() {
        return bins;
    }
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = (fraction(v, min, max) * BIN_COUNT as f64).floor();
        if idx < 0.0 {
            continue;
        }
        bins[(idx as usize).min(BIN_COUNT - 1)] += 1;
    }
    bins
}

/// Find the densest window of bins over `[min, max]`.
///
/// Windows of every width in [`WINDOW_BINS`] slide across the histogram;
/// the highest average count per bin wins, the earliest window on ties.
/// Empty or degenerate input yields the uniform range.
pub fn analyze_density(values: &[f64], min: f64, max: f64) -> DenseRange {
    if values.is_empty() || !(max > min) || !min.is_finite() || !max.is_finite() {
        return DenseRange::uniform(min, max);
    }

    let bins = histogram(values, min, max);
    let edge = |bin: usize| lerp(min, max, bin as f64 / BIN_COUNT as f64);

    let mut best: Option<(f64, usize, usize)> = None;
    for &window in &WINDOW_BINS {
        for start in 0..=(BIN_COUNT - window) {
            let count: usize = bins[start..start + window].iter().sum();
            let density = count as f64 / window as f64;
            if best.is_none_or(|(d, _, _)| density > d) {
                best = Some((density, start, window));
            }
        }
    }

    match best {
        Some((density, start, window)) if density > 0.0 => {
            let range = DenseRange {
                start: edge(start),
                end: edge(start + window),
                uniform: false,
            };
            if range.end > range.start {
                range
            } else {
                DenseRange::uniform(min, max)
            }
        }
        _ => DenseRange::uniform(min, max),
    }
}
