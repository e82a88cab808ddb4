//! PCM analysis pipeline stage.
//!
//! Reads raw s16le interleaved PCM from stdin and writes one line of band
//! magnitudes per FFT window to stdout:
//!
//! ```text
//! parec --format=s16le --channels=2 --rate=44100 | eqview analyze | eqview
//! ```

use std::io::{self, BufWriter, Read, Write};

use crate::analyze::{format_line, SpectrumAnalyzer};
use crate::config::{AnalyzeConfig, EqviewConfig};

/// Command-line overrides for the analyzer configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOverrides {
    pub fft_size: Option<usize>,
    pub channels: Option<usize>,
    pub channel: Option<usize>,
    pub bands: Option<usize>,
    pub sample_rate: Option<u32>,
}

impl AnalyzeOverrides {
    fn apply(&self, analyze: &mut AnalyzeConfig) {
        if let Some(fft_size) = self.fft_size {
            analyze.fft_size = fft_size;
        }
        if let Some(channels) = self.channels {
            analyze.channels = channels;
        }
        if let Some(channel) = self.channel {
            analyze.channel = channel;
        }
        if let Some(bands) = self.bands {
            analyze.bands = bands;
        }
        if let Some(sample_rate) = self.sample_rate {
            analyze.sample_rate = sample_rate;
        }
    }
}

/// Streams stdin PCM through the analyzer until EOF.
///
/// A trailing partial chunk is discarded. A closed stdout (the consumer exited)
/// ends the stage cleanly.
///
/// # Errors
/// - If the configuration is invalid
/// - If stdin cannot be read
/// - If stdout fails for a reason other than a broken pipe
pub fn handle_analyze(overrides: AnalyzeOverrides) -> anyhow::Result<()> {
    let mut config = EqviewConfig::load()?;
    overrides.apply(&mut config.analyze);

    let settings = config.analyze.clone();
    let mut analyzer = SpectrumAnalyzer::new(config.analyze)?;
    tracing::info!(
        "Analyzing: fft_size={}, channels={}, channel={}, bands={} of {:.1}Hz each at {}Hz",
        settings.fft_size,
        settings.channels,
        settings.channel,
        settings.bands,
        analyzer.band_width_hz(),
        settings.sample_rate
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let windows = run_analyzer(&mut analyzer, stdin.lock(), BufWriter::new(stdout.lock()))?;

    tracing::info!("Input ended after {} windows", windows);
    Ok(())
}

/// Analyzes chunks from `input` and writes lines to `output`. Returns the number of windows.
fn run_analyzer<R: Read, W: Write>(
    analyzer: &mut SpectrumAnalyzer,
    mut input: R,
    mut output: W,
) -> anyhow::Result<u64> {
    let mut chunk = vec![0u8; analyzer.buffer_size()];
    let mut windows = 0u64;

    loop {
        match input.read_exact(&mut chunk) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let bands = analyzer.analyze(&chunk)?;
        let written = writeln!(output, "{}", format_line(&bands)).and_then(|()| output.flush());
        match written {
            Ok(()) => windows += 1,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Consumer closed the pipe");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(windows)
}
