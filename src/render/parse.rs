//! Input line parsing.

use super::FrameError;

/// Parses one line of comma-separated magnitudes.
///
/// Tokens may carry surrounding whitespace. A blank line is reported as
/// [`FrameError::EndOfStream`] rather than as a frame.
pub fn parse_line(line: &str) -> Result<Vec<f64>, FrameError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(FrameError::EndOfStream);
    }

    trimmed
        .split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<f64>().map_err(|source| FrameError::Parse {
                token: token.to_string(),
                source,
            })
        })
        .collect()
}
