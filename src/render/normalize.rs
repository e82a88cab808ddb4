//! Mapping magnitudes to column heights.

use crate::config::NormalizationMode;

/// Converts binned magnitudes into column heights for a display `height` rows tall.
///
/// Heights are not clamped here; rasterization treats anything outside
/// `0..=height` as an empty or full column. A zero peak or a zero-width range
/// is replaced by 1 so no frame divides by zero.
pub fn normalize(values: &[f64], mode: NormalizationMode, height: usize) -> Vec<i64> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut highest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if highest == 0.0 {
        highest = 1.0;
    }
    let rows = height as f64;

    match mode {
        NormalizationMode::MinMax => {
            let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);
            let mut divider = highest - lowest;
            if divider == 0.0 {
                divider = 1.0;
            }
            values
                .iter()
                .map(|&v| to_height((v - lowest) / divider * rows))
                .collect()
        }
        NormalizationMode::Peak => values
            .iter()
            .map(|&v| to_height(v / highest * rows))
            .collect(),
    }
}

fn to_height(scaled: f64) -> i64 {
    if scaled.is_finite() {
        // saturating cast
        scaled.floor() as i64
    } else {
        0
    }
}
