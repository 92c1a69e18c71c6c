//! Digital filter design and zero-phase filtering
//!
//! Filters are cascaded second-order sections (biquads) applied
//! forward-backward, so the filtered signal has no phase distortion.

use std::f64::consts::PI;

use realfft::num_complex::Complex64;
use sci_rs::signal::filter::{design::*, sosfiltfilt_dyn};
use serde::{Deserialize, Serialize};

use crate::error::{EegError, Result};
use crate::plot::Figure;
use crate::utils::{check_frequency, power_to_db};

/// Number of points of the diagnostic frequency response
pub const RESPONSE_POINTS: usize = 512;

// 避免 log10(0)
const MAGNITUDE_FLOOR: f64 = 1e-12;

/// Cascade of second-order sections
#[derive(Debug, Clone)]
pub struct SosFilter {
    pub sections: Vec<Sos<f64>>,
}

impl SosFilter {
    /// Complex response at normalized angular frequency `w` (rad/sample)
    pub fn response_at(&self, w: f64) -> Complex64 {
        let z_inv = Complex64::new(0.0, -w).exp();
        let z_inv2 = z_inv * z_inv;
        self.sections.iter().fold(Complex64::new(1.0, 0.0), |h, s| {
            let num = Complex64::new(s.b[0], 0.0) + z_inv * s.b[1] + z_inv2 * s.b[2];
            let den = Complex64::new(s.a[0], 0.0) + z_inv * s.a[1] + z_inv2 * s.a[2];
            h * num / den
        })
    }

    /// Evaluates the response at `n` frequencies evenly spaced on [0, fs/2)
    pub fn freqz(&self, n: usize, fs: f64) -> FrequencyResponse {
        let mut frequencies = Vec::with_capacity(n);
        let mut magnitude = Vec::with_capacity(n);

        for k in 0..n {
            let w = PI * k as f64 / n as f64;
            frequencies.push(w / PI * fs / 2.0);
            magnitude.push(self.response_at(w).norm());
        }

        FrequencyResponse { frequencies, magnitude }
    }

    /// Samples of odd extension added to each end before filtering
    pub fn padlen(&self) -> usize {
        3 * (2 * self.sections.len() + 1)
    }

    /// Zero-phase forward-backward filtering
    ///
    /// # Errors
    ///
    /// * `EegError::SignalTooShort` - the signal is not longer than [`SosFilter::padlen`]
    pub fn filtfilt(&self, x: &[f64]) -> Result<Vec<f64>> {
        let edge = self.padlen();
        if x.len() <= edge {
            return Err(EegError::SignalTooShort {
                length: x.len(),
                required: edge + 1,
            });
        }

        Ok(sosfiltfilt_dyn(x.iter().copied(), &self.sections))
    }

    /// Applies [`SosFilter::filtfilt`] to every channel
    pub fn filtfilt_channels(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        data.iter().map(|ch| self.filtfilt(ch)).collect()
    }
}

/// Magnitude response sampled on a frequency grid
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResponse {
    /// Hz
    pub frequencies: Vec<f64>,
    /// |H|
    pub magnitude: Vec<f64>,
}

impl FrequencyResponse {
    /// Magnitude in dB, `20 * log10(|H|)`
    ///
    /// The course notebooks plot `10 * log10(|H|)`, which halves every value;
    /// divide by two to compare against those figures.
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.magnitude
            .iter()
            .map(|&m| power_to_db((m * m).max(MAGNITUDE_FLOOR)))
            .collect()
    }

    pub fn to_figure(&self, title: &str) -> Figure {
        Figure::new(title, "Frequency (Hz)", "Magnitude (dB)").with_series(
            "response",
            self.frequencies.clone(),
            self.magnitude_db(),
        )
    }
}

/// Butterworth bandpass of prototype order `order` (bandpass order `2 * order`)
///
/// Band edges are prewarped before the bilinear transform, so the response
/// is -3 dB at exactly `f1` and `f2`.
///
/// # Examples
///
/// ```rust
/// use eegtutor::filter::butter_bandpass;
///
/// let sos = butter_bandpass(2, 1.0, 45.0, 250.0)?;
/// assert_eq!(sos.sections.len(), 2);
/// assert_eq!(sos.padlen(), 15);
/// # Ok::<(), eegtutor::EegError>(())
/// ```
pub fn butter_bandpass(order: usize, f1: f64, f2: f64, fs: f64) -> Result<SosFilter> {
    if order == 0 {
        return Err(EegError::InvalidParameter("Filter order must be at least 1".to_string()));
    }
    check_frequency("Low cut-off", f1, fs)?;
    check_frequency("High cut-off", f2, fs)?;
    if f1 >= f2 {
        return Err(EegError::InvalidParameter(format!(
            "Low cut-off {} Hz must be below high cut-off {} Hz", f1, f2
        )));
    }

    let filter = butter_dyn(
        order,
        vec![f1, f2],
        Some(FilterBandType::Bandpass),
        Some(false),
        Some(FilterOutputType::Sos),
        Some(fs),
    );
    match filter {
        DigitalFilter::Sos(SosFormatFilter { sos }) => Ok(SosFilter { sections: sos }),
        _ => Err(EegError::InvalidParameter(
            "Butterworth design did not return second-order sections".to_string(),
        )),
    }
}

/// Second-order IIR notch at `fc` Hz with quality factor `q`
///
/// The -3 dB bandwidth of the stop band is `fc / q`.
pub fn iir_notch(fc: f64, q: f64, fs: f64) -> Result<SosFilter> {
    check_frequency("Notch frequency", fc, fs)?;
    if !q.is_finite() || q <= 0.0 {
        return Err(EegError::InvalidParameter(format!(
            "Quality factor must be positive, got {}", q
        )));
    }

    let w0 = PI * fc / (fs / 2.0);
    let bw = w0 / q;
    let beta = (bw / 2.0).tan();
    let gain = 1.0 / (1.0 + beta);
    let cos_w0 = w0.cos();

    Ok(SosFilter {
        sections: vec![Sos::new(
            [gain, -2.0 * gain * cos_w0, gain],
            [1.0, -2.0 * gain * cos_w0, 2.0 * gain - 1.0],
        )],
    })
}

/// Bandpass settings of the tutorial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandpassConfig {
    /// Low cut-off (Hz)
    pub low: f64,
    /// High cut-off (Hz)
    pub high: f64,
    /// Prototype order; the bandpass has twice this order
    pub order: usize,
}

impl Default for BandpassConfig {
    fn default() -> Self {
        BandpassConfig {
            low: 1.0,
            high: 45.0,
            order: 2,
        }
    }
}

impl BandpassConfig {
    pub fn design(&self, fs: f64) -> Result<SosFilter> {
        butter_bandpass(self.order, self.low, self.high, fs)
    }

    /// Designs the filter, filters every channel and describes the response
    pub fn apply(&self, data: &[Vec<f64>], fs: f64) -> Result<Filtered> {
        let sos = self.design(fs)?;
        let title = format!(
            "Frequency response of Butterworth bandpass [{}, {}] Hz",
            self.low, self.high
        );
        Filtered::run(&sos, data, fs, &title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotchConfig {
    /// Stop-band center (Hz)
    pub freq: f64,
    pub q: f64,
}

impl Default for NotchConfig {
    fn default() -> Self {
        NotchConfig { freq: 50.0, q: 100.0 }
    }
}

impl NotchConfig {
    pub fn design(&self, fs: f64) -> Result<SosFilter> {
        iir_notch(self.freq, self.q, fs)
    }

    pub fn apply(&self, data: &[Vec<f64>], fs: f64) -> Result<Filtered> {
        let sos = self.design(fs)?;
        let title = format!("Frequency response of notch filter at {} Hz", self.freq);
        Filtered::run(&sos, data, fs, &title)
    }
}

/// Filtered channels together with the filter's frequency response plot
#[derive(Debug, Clone)]
pub struct Filtered {
    pub data: Vec<Vec<f64>>,
    pub response: Figure,
}

impl Filtered {
    fn run(sos: &SosFilter, data: &[Vec<f64>], fs: f64, title: &str) -> Result<Self> {
        let response = sos.freqz(RESPONSE_POINTS, fs).to_figure(title);
        let data = sos.filtfilt_channels(data)?;
        log::debug!("Filtered {} channels: {}", data.len(), title);
        Ok(Filtered { data, response })
    }
}

/// Order-4 Butterworth bandpass over `[f1, f2]` Hz applied forward-backward
///
/// # Examples
///
/// ```rust
/// use eegtutor::filter::bandpass_filter_plot;
/// use eegtutor::doctest_utils::sine;
///
/// let fs = 250.0;
/// // 10 Hz 保留，0.1 Hz 漂移被滤除
/// let signal: Vec<f64> = sine(10.0, fs, 2500)
///     .iter()
///     .zip(sine(0.1, fs, 2500))
///     .map(|(a, b)| a + 5.0 * b)
///     .collect();
///
/// let filtered = bandpass_filter_plot(&[signal], fs, 1.0, 45.0)?;
/// assert_eq!(filtered.data[0].len(), 2500);
/// assert_eq!(filtered.response.series[0].x.len(), 512);
/// # Ok::<(), eegtutor::EegError>(())
/// ```
pub fn bandpass_filter_plot(data: &[Vec<f64>], fs: f64, f1: f64, f2: f64) -> Result<Filtered> {
    BandpassConfig {
        low: f1,
        high: f2,
        order: 2,
    }
    .apply(data, fs)
}

/// IIR notch (Q = 100) at `fc` Hz applied forward-backward
pub fn notch_filter_plot(data: &[Vec<f64>], fs: f64, fc: f64) -> Result<Filtered> {
    NotchConfig { freq: fc, q: 100.0 }.apply(data, fs)
}
