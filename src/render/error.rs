//! Per-frame failures.

use std::num::ParseFloatError;
use thiserror::Error;

/// Reasons a single input line does not become a frame.
///
/// None of these are fatal to the render loop: `EndOfStream` stops it cleanly,
/// the others skip one frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("invalid number '{token}': {source}")]
    Parse {
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("end of input stream")]
    EndOfStream,

    #[error("binning produced {binned} values for a {width}-column display")]
    BinningInvariant { binned: usize, width: usize },
}
