use crate::error::{EegError, Result};
use crate::TIME_DIMENSION;

/// 将100纳秒单位的时间转换为样本索引（四舍五入）
pub fn time_to_sample(time: i64, sfreq: f64) -> Result<usize> {
    if time < 0 {
        return Err(EegError::MalformedAnnotations(format!(
            "Negative onset {} cannot be mapped to a sample", time
        )));
    }

    let seconds = time as f64 / TIME_DIMENSION as f64;
    Ok((seconds * sfreq).round() as usize)
}

/// 将样本数转换为100纳秒单位的时间
pub fn samples_to_time(samples: usize, sfreq: f64) -> i64 {
    (samples as f64 / sfreq * TIME_DIMENSION as f64).round() as i64
}

/// 样本数转换为分钟
pub fn samples_to_minutes(samples: usize, sfreq: f64) -> f64 {
    samples as f64 / sfreq / 60.0
}

/// Largest supported FFT length exponent
pub const MAX_FFT_EXPONENT: u32 = 24;

/// FFT length giving at least `freq_res` Hz resolution: 2^ceil(log2(fs / freq_res))
pub fn fft_length(fs: f64, freq_res: f64) -> Result<usize> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(EegError::InvalidSamplingRate(fs));
    }
    if !freq_res.is_finite() || freq_res <= 0.0 {
        return Err(EegError::InvalidParameter(format!(
            "Frequency resolution must be positive, got {}", freq_res
        )));
    }

    // 至少2点，最多 2^MAX_FFT_EXPONENT 点
    let exponent = (fs / freq_res).log2().ceil();
    if !(1.0..=MAX_FFT_EXPONENT as f64).contains(&exponent) {
        return Err(EegError::InvalidParameter(format!(
            "Frequency resolution {} Hz at {} Hz needs an FFT length outside [2, 2^{}]",
            freq_res, fs, MAX_FFT_EXPONENT
        )));
    }

    2usize.checked_pow(exponent as u32).ok_or_else(|| {
        EegError::InvalidParameter(format!("FFT length 2^{} overflows", exponent))
    })
}

/// Power to decibels
pub fn power_to_db(power: f64) -> f64 {
    10.0 * power.log10()
}

/// Checks `0 < freq < fs / 2`
pub fn check_frequency(name: &str, freq: f64, fs: f64) -> Result<()> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(EegError::InvalidSamplingRate(fs));
    }
    if !freq.is_finite() || freq <= 0.0 || freq >= fs / 2.0 {
        return Err(EegError::InvalidParameter(format!(
            "{} must lie in (0, {}) Hz, got {}", name, fs / 2.0, freq
        )));
    }
    Ok(())
}
