//! PCM to band-magnitude analysis for the `analyze` pipeline stage.
//!
//! Consumes fixed-size chunks of 16-bit little-endian interleaved PCM and emits
//! one comma-separated line of per-band magnitudes (in dB) per chunk, ready to be
//! piped into `eqview view`.

use anyhow::bail;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::config::AnalyzeConfig;

const BYTES_PER_SAMPLE: usize = 2;
const SILENCE_DB: f64 = -100.0;

/// Reusable FFT state for one stream layout.
pub struct SpectrumAnalyzer {
    config: AnalyzeConfig,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    buffer: Vec<Complex<f64>>,
}

impl SpectrumAnalyzer {
    /// Plans the FFT and precomputes the Hann window.
    ///
    /// # Errors
    /// - If the FFT size, channel layout or band count is unusable
    pub fn new(config: AnalyzeConfig) -> anyhow::Result<Self> {
        if config.fft_size < 2 {
            bail!("fft_size must be at least 2, got {}", config.fft_size);
        }
        if config.sample_rate == 0 {
            bail!("sample_rate must be positive");
        }
        if config.channels == 0 {
            bail!("channels must be at least 1");
        }
        if config.channel >= config.channels {
            bail!(
                "channel {} out of range for {}-channel input",
                config.channel,
                config.channels
            );
        }
        if config.bands == 0 || config.bands > config.fft_size / 2 {
            bail!(
                "bands must be between 1 and {} for fft_size {}, got {}",
                config.fft_size / 2,
                config.fft_size,
                config.bands
            );
        }

        let n = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(n);
        let window = (0..n)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos()))
            .collect();

        Ok(Self {
            config,
            fft,
            window,
            buffer: Vec::with_capacity(n),
        })
    }

    /// Bytes of interleaved PCM consumed per analysis.
    pub fn buffer_size(&self) -> usize {
        self.config.fft_size * BYTES_PER_SAMPLE * self.config.channels
    }

    /// Frequency span in Hz covered by each output band.
    pub fn band_width_hz(&self) -> f64 {
        let band_size = self.config.fft_size / 2 / self.config.bands;
        f64::from(self.config.sample_rate) / self.config.fft_size as f64 * band_size as f64
    }

    /// Computes band magnitudes for one chunk of PCM.
    ///
    /// Only the configured channel is analyzed. The lower half of the spectrum is
    /// split into equal-width bands; bins left over after the last full band are
    /// ignored.
    ///
    /// # Errors
    /// - If `pcm` is not exactly [`buffer_size`](Self::buffer_size) bytes
    pub fn analyze(&mut self, pcm: &[u8]) -> anyhow::Result<Vec<f64>> {
        if pcm.len() != self.buffer_size() {
            bail!(
                "Incorrect buffer length: expected {} bytes, got {}",
                self.buffer_size(),
                pcm.len()
            );
        }

        let frame_bytes = BYTES_PER_SAMPLE * self.config.channels;
        let offset = BYTES_PER_SAMPLE * self.config.channel;

        self.buffer.clear();
        self.buffer.extend(
            pcm.chunks_exact(frame_bytes)
                .zip(&self.window)
                .map(|(frame, &w)| {
                    let sample = i16::from_le_bytes([frame[offset], frame[offset + 1]]);
                    Complex::new(f64::from(sample) * w, 0.0)
                }),
        );

        self.fft.process(&mut self.buffer);

        let half = self.config.fft_size / 2;
        let band_size = half / self.config.bands;
        let mut bands = vec![0.0; self.config.bands];
        for (i, bin) in self.buffer[..band_size * self.config.bands].iter().enumerate() {
            bands[i / band_size] += to_db(bin.norm()) / band_size as f64;
        }

        Ok(bands)
    }
}

fn to_db(magnitude: f64) -> f64 {
    if magnitude > 1e-10 {
        20.0 * magnitude.log10()
    } else {
        SILENCE_DB
    }
}

/// Formats band values as one input line for the view stage.
pub fn format_line(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.3}"))
        .collect::<Vec<_>>()
        .join(",")
}
