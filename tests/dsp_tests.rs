use eegtutor::doctest_utils::{create_resting_state_recording, sine};
use eegtutor::filter::{bandpass_filter_plot, notch_filter_plot, BandpassConfig, NotchConfig};
use eegtutor::spectrum::{plot_psd, recording_psd, welch, WelchParams};
use eegtutor::{extract_eyes_closed, EegError, Figure};

fn band_power(frequencies: &[f64], power: &[f64], low: f64, high: f64) -> f64 {
    frequencies
        .iter()
        .zip(power)
        .filter(|(f, _)| **f >= low && **f <= high)
        .map(|(_, p)| p)
        .sum()
}

#[test]
fn test_bandpass_removes_drift_and_high_frequency() {
    let fs = 250.0;
    let n = 10_000;
    let signal: Vec<f64> = sine(10.0, fs, n)
        .iter()
        .zip(sine(0.2, fs, n))
        .zip(sine(90.0, fs, n))
        .map(|((alpha, drift), high)| alpha + 10.0 * drift + 2.0 * high)
        .collect();

    let filtered = bandpass_filter_plot(&[signal.clone()], fs, 1.0, 45.0).unwrap();
    assert_eq!(filtered.data.len(), 1);
    assert_eq!(filtered.data[0].len(), n);

    // 去掉两端的滤波瞬态
    let edge = 1250;
    let params = WelchParams::default();
    let before = welch(&[signal[edge..n - edge].to_vec()], fs, &params).unwrap();
    let after = welch(&[filtered.data[0][edge..n - edge].to_vec()], fs, &params).unwrap();

    let f = &before.frequencies;
    // 漂移和高频分量被显著衰减，alpha 基本保留
    assert!(band_power(f, &after.power[0], 0.0, 0.5) < 0.01 * band_power(f, &before.power[0], 0.0, 0.5));
    assert!(band_power(f, &after.power[0], 85.0, 95.0) < 0.01 * band_power(f, &before.power[0], 85.0, 95.0));
    let alpha_ratio = band_power(f, &after.power[0], 9.0, 11.0) / band_power(f, &before.power[0], 9.0, 11.0);
    assert!((alpha_ratio - 1.0).abs() < 0.05, "alpha ratio {}", alpha_ratio);
}

#[test]
fn test_bandpass_response_figure() {
    let fs = 250.0;
    let filtered = bandpass_filter_plot(&[sine(10.0, fs, 1000)], fs, 1.0, 45.0).unwrap();
    let figure = &filtered.response;

    assert_eq!(figure.title, "Frequency response of Butterworth bandpass [1, 45] Hz");
    assert_eq!(figure.x_label, "Frequency (Hz)");
    assert_eq!(figure.y_label, "Magnitude (dB)");
    assert_eq!(figure.series.len(), 1);

    let series = &figure.series[0];
    assert_eq!(series.x.len(), 512);
    // 通带内接近 0 dB
    let idx = series.x.iter().position(|&f| f >= 10.0).unwrap();
    assert!(series.y[idx].abs() < 0.1);
}

#[test]
fn test_notch_removes_line_noise() {
    let fs = 250.0;
    let n = 20_000;
    let signal: Vec<f64> = sine(10.0, fs, n)
        .iter()
        .zip(sine(50.0, fs, n))
        .map(|(alpha, line)| alpha + 5.0 * line)
        .collect();

    let cleaned = notch_filter_plot(&[signal.clone(), signal], fs, 50.0).unwrap();
    assert_eq!(cleaned.data.len(), 2);
    assert_eq!(cleaned.response.title, "Frequency response of notch filter at 50 Hz");

    // Q = 100 的陷波器瞬态很长，只分析中间部分
    let interior: Vec<Vec<f64>> = cleaned.data.iter().map(|ch| ch[2500..n - 2500].to_vec()).collect();
    let spectrum = welch(&interior, fs, &WelchParams::default()).unwrap();
    let f = &spectrum.frequencies;
    for ch in &spectrum.power {
        let line = band_power(f, ch, 49.0, 51.0);
        let alpha = band_power(f, ch, 9.0, 11.0);
        assert!(line < 0.01 * alpha, "line {} alpha {}", line, alpha);
    }
}

#[test]
fn test_filter_configs_validate_parameters() {
    let data = vec![vec![0.0; 1000]];
    let bad_band = BandpassConfig { low: 40.0, high: 10.0, order: 2 };
    assert!(matches!(bad_band.apply(&data, 250.0), Err(EegError::InvalidParameter(_))));

    let above_nyquist = NotchConfig { freq: 150.0, q: 100.0 };
    assert!(matches!(above_nyquist.apply(&data, 250.0), Err(EegError::InvalidParameter(_))));

    let short = vec![vec![0.0; 10]];
    assert!(matches!(
        BandpassConfig::default().apply(&short, 250.0),
        Err(EegError::SignalTooShort { .. })
    ));
}

#[test]
fn test_plot_psd_description() {
    let fs = 250.0;
    let data = vec![sine(10.0, fs, 4096), sine(20.0, fs, 4096)];
    let figure = plot_psd(&data, fs, &WelchParams::default().with_f_max(30.0)).unwrap();

    assert_eq!(figure.series.len(), 2);
    assert!(figure.grid);
    assert!(figure.series.iter().all(|s| s.x.iter().all(|&f| f <= 30.0)));

    let json = figure.to_json().unwrap();
    let back = Figure::from_json(&json).unwrap();
    assert_eq!(back.series.len(), 2);
}

#[test]
fn test_psd_of_extracted_condition() {
    let raw = create_resting_state_recording(4, 20.0).unwrap();
    let eyes_closed = extract_eyes_closed(&raw).unwrap();

    let (spectrum, figure) = recording_psd(&eyes_closed.recording, &WelchParams::default().with_f_max(40.0)).unwrap();
    assert_eq!(figure.series[0].label, "O1");

    // 闭眼段只有 10 Hz alpha
    let peak = spectrum.peak_frequency(0).unwrap();
    assert!((peak - 10.0).abs() < 0.5, "peak at {}", peak);
    let f = &spectrum.frequencies;
    let beta = band_power(f, &spectrum.power[0], 19.0, 21.0);
    let alpha = band_power(f, &spectrum.power[0], 9.0, 11.0);
    assert!(beta < 0.01 * alpha);
}
