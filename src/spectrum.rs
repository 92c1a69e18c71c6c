//! Welch power spectral density

use std::f64::consts::PI;

use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

use crate::error::{EegError, Result};
use crate::plot::Figure;
use crate::types::Recording;
use crate::utils::{fft_length, power_to_db};

// 避免 log10(0)
const POWER_FLOOR: f64 = 1e-30;

/// Welch estimator settings
///
/// The segment length is the next power of two of `fs / freq_res` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelchParams {
    /// Highest frequency kept in the result (Hz)
    pub f_max: Option<f64>,
    /// Fraction of each segment shared with the next one
    pub overlap: f64,
    /// Requested frequency resolution (Hz)
    pub freq_res: f64,
}

impl Default for WelchParams {
    fn default() -> Self {
        WelchParams {
            f_max: None,
            overlap: 0.5,
            freq_res: 0.5,
        }
    }
}

impl WelchParams {
    pub fn with_f_max(mut self, f_max: f64) -> Self {
        self.f_max = Some(f_max);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(EegError::InvalidParameter(format!(
                "Overlap must lie in [0, 1), got {}", self.overlap
            )));
        }
        if !self.freq_res.is_finite() || self.freq_res <= 0.0 {
            return Err(EegError::InvalidParameter(format!(
                "Frequency resolution must be positive, got {}", self.freq_res
            )));
        }
        if let Some(f_max) = self.f_max {
            if !f_max.is_finite() || f_max <= 0.0 {
                return Err(EegError::InvalidParameter(format!(
                    "Maximum frequency must be positive, got {}", f_max
                )));
            }
        }
        Ok(())
    }
}

/// One-sided power spectral density per channel
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Hz
    pub frequencies: Vec<f64>,
    /// `[n_channels][n_frequencies]`, signal unit squared per Hz
    pub power: Vec<Vec<f64>>,
}

impl Spectrum {
    pub fn power_db(&self) -> Vec<Vec<f64>> {
        self.power
            .iter()
            .map(|ch| ch.iter().map(|&p| power_to_db(p.max(POWER_FLOOR))).collect())
            .collect()
    }

    /// Frequency of the largest power of `channel`
    pub fn peak_frequency(&self, channel: usize) -> Option<f64> {
        let power = self.power.get(channel)?;
        power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| self.frequencies[i])
    }

    /// PSD curves in dB, one series per channel
    pub fn to_figure(&self, labels: &[&str]) -> Figure {
        let mut figure = Figure::new("Power spectral density", "Frequency (Hz)", "PSD (dB)");
        for (i, power) in self.power_db().into_iter().enumerate() {
            let label = labels
                .get(i)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("channel {}", i));
            figure = figure.with_series(label, self.frequencies.clone(), power);
        }
        figure
    }
}

// 周期Hann窗
fn hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Welch PSD of every channel
///
/// Segments of `nfft` samples are mean-detrended, Hann windowed and
/// averaged; the result is density scaled and one-sided.
///
/// # Errors
///
/// * `EegError::SignalTooShort` - a channel is shorter than one segment
///
/// # Examples
///
/// ```rust
/// use eegtutor::spectrum::{welch, WelchParams};
/// use eegtutor::doctest_utils::sine;
///
/// let fs = 250.0;
/// let alpha = sine(10.0, fs, 5000);
///
/// let spectrum = welch(&[alpha], fs, &WelchParams::default().with_f_max(40.0))?;
/// let peak = spectrum.peak_frequency(0).unwrap();
/// assert!((peak - 10.0).abs() < 0.5);
/// assert!(spectrum.frequencies.iter().all(|&f| f <= 40.0));
/// # Ok::<(), eegtutor::EegError>(())
/// ```
pub fn welch(data: &[Vec<f64>], fs: f64, params: &WelchParams) -> Result<Spectrum> {
    params.validate()?;
    let nfft = fft_length(fs, params.freq_res)?;
    let noverlap = (params.overlap * nfft as f64).floor() as usize;
    let step = nfft - noverlap;

    let window = hann(nfft);
    let scale = 1.0 / (fs * window.iter().map(|w| w * w).sum::<f64>());

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(nfft);
    let mut input = r2c.make_input_vec();
    let mut output = r2c.make_output_vec();
    let n_bins = output.len();

    let mut power = Vec::with_capacity(data.len());
    for channel in data {
        if channel.len() < nfft {
            return Err(EegError::SignalTooShort {
                length: channel.len(),
                required: nfft,
            });
        }

        let n_segments = (channel.len() - nfft) / step + 1;
        let mut acc = vec![0.0; n_bins];

        for seg in 0..n_segments {
            let chunk = &channel[seg * step..seg * step + nfft];
            let mean = chunk.iter().sum::<f64>() / nfft as f64;
            for ((slot, &x), &w) in input.iter_mut().zip(chunk).zip(&window) {
                *slot = (x - mean) * w;
            }

            r2c.process(&mut input, &mut output)
                .map_err(|e| EegError::InvalidParameter(format!("FFT failed: {}", e)))?;

            for (p, c) in acc.iter_mut().zip(&output) {
                *p += c.norm_sqr();
            }
        }

        // 单边谱：除直流和奈奎斯特外乘2
        let last = if nfft % 2 == 0 { n_bins - 1 } else { n_bins };
        for (k, p) in acc.iter_mut().enumerate() {
            *p *= scale / n_segments as f64;
            if k > 0 && k < last {
                *p *= 2.0;
            }
        }
        power.push(acc);
    }

    let mut frequencies: Vec<f64> = (0..n_bins).map(|k| k as f64 * fs / nfft as f64).collect();

    if let Some(f_max) = params.f_max {
        let keep = frequencies.iter().take_while(|&&f| f <= f_max).count();
        frequencies.truncate(keep);
        for ch in power.iter_mut() {
            ch.truncate(keep);
        }
    }

    log::debug!(
        "Welch PSD: nfft={}, noverlap={}, {} channels, {} bins",
        nfft, noverlap, power.len(), frequencies.len()
    );

    Ok(Spectrum { frequencies, power })
}

/// Computes the PSD and returns its plot description
pub fn plot_psd(data: &[Vec<f64>], fs: f64, params: &WelchParams) -> Result<Figure> {
    Ok(welch(data, fs, params)?.to_figure(&[]))
}

/// PSD of a recording, labeled with its channel names
pub fn recording_psd(recording: &Recording, params: &WelchParams) -> Result<(Spectrum, Figure)> {
    recording.validate()?;
    let spectrum = welch(&recording.data(), recording.sfreq, params)?;
    let figure = spectrum.to_figure(&recording.labels());
    Ok((spectrum, figure))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_hann_periodic() {
        let w = hann(4);
        assert!((w[0] - 0.0).abs() < 1e-12);
        assert!((w[1] - 0.5).abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!((w[3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_welch_grid() {
        let fs = 250.0;
        let spectrum = welch(&[sine(10.0, fs, 2048)], fs, &WelchParams::default()).unwrap();
        // nfft = 512
        assert_eq!(spectrum.frequencies.len(), 257);
        assert!((spectrum.frequencies[1] - fs / 512.0).abs() < 1e-12);
        assert!((spectrum.frequencies[256] - fs / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_welch_total_power() {
        let fs = 250.0;
        let amplitude = 3.0;
        let signal: Vec<f64> = sine(12.0, fs, 10_000).iter().map(|v| v * amplitude).collect();

        let spectrum = welch(&[signal], fs, &WelchParams::default()).unwrap();
        let df = spectrum.frequencies[1];
        let total: f64 = spectrum.power[0].iter().sum::<f64>() * df;

        let expected = amplitude * amplitude / 2.0;
        assert!((total - expected).abs() / expected < 0.02, "total power {}", total);
    }

    #[test]
    fn test_welch_removes_mean() {
        let fs = 100.0;
        let signal = vec![5.0; 1000];
        let spectrum = welch(&[signal], fs, &WelchParams::default()).unwrap();
        assert!(spectrum.power[0].iter().all(|&p| p.abs() < 1e-20));
        assert!(spectrum.power_db()[0].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_welch_rejects_short_signal() {
        let result = welch(&[vec![0.0; 100]], 250.0, &WelchParams::default());
        assert!(matches!(result, Err(EegError::SignalTooShort { length: 100, required: 512 })));
    }

    #[test]
    fn test_welch_rejects_bad_overlap() {
        let params = WelchParams { overlap: 1.0, ..Default::default() };
        assert!(welch(&[vec![0.0; 1024]], 250.0, &params).is_err());
    }

    #[test]
    fn test_welch_rejects_degenerate_resolution() {
        let tiny = WelchParams { freq_res: 1e-30, ..Default::default() };
        assert!(matches!(
            welch(&[vec![0.0; 1024]], 250.0, &tiny),
            Err(EegError::InvalidParameter(_))
        ));

        // nfft = 1 would give a zero window
        let coarse = WelchParams { freq_res: 1.0, ..Default::default() };
        assert!(matches!(
            welch(&[vec![1.0, 2.0, 3.0, 4.0]], 1.0, &coarse),
            Err(EegError::InvalidParameter(_))
        ));

        let negative = WelchParams { freq_res: -0.5, ..Default::default() };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_figure_labels() {
        let fs = 250.0;
        let data = vec![sine(10.0, fs, 1024), sine(20.0, fs, 1024)];
        let spectrum = welch(&data, fs, &WelchParams::default().with_f_max(30.0)).unwrap();

        let figure = spectrum.to_figure(&["O1"]);
        assert_eq!(figure.series.len(), 2);
        assert_eq!(figure.series[0].label, "O1");
        assert_eq!(figure.series[1].label, "channel 1");
        assert_eq!(figure.y_label, "PSD (dB)");
        assert_eq!(figure.series[1].x.len(), spectrum.frequencies.len());
    }
}
