//! Fitting a sample frame to the display width.

use super::FrameError;

/// Averages fixed-size contiguous runs until the frame is narrower than `target_width`.
///
/// Frames that already fit are returned unchanged. Otherwise the bin size is
/// `len / target_width + 1` and bins start at 0, stopping before any bin that
/// would start at or past `len - step`. Tail samples that do not fill a whole
/// bin are dropped.
pub fn bin_to_width(samples: &[f64], target_width: usize) -> Result<Vec<f64>, FrameError> {
    if target_width == 0 {
        return Err(FrameError::BinningInvariant {
            binned: samples.len(),
            width: target_width,
        });
    }

    if samples.len() <= target_width {
        return Ok(samples.to_vec());
    }

    let step = samples.len() / target_width + 1;
    let last_start = samples.len().saturating_sub(step);

    let binned: Vec<f64> = (0..last_start)
        .step_by(step)
        .map(|start| samples[start..start + step].iter().sum::<f64>() / step as f64)
        .collect();

    if binned.len() >= target_width {
        return Err(FrameError::BinningInvariant {
            binned: binned.len(),
            width: target_width,
        });
    }

    Ok(binned)
}
