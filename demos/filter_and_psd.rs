use std::env;

use eegtutor::doctest_utils::sine;
use eegtutor::spectrum::welch;
use eegtutor::{AnalysisConfig, Result};

fn main() -> Result<()> {
    env_logger::init();

    // 可选的 TOML 配置文件
    let config = match env::args().nth(1) {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    let fs = 250.0;
    let n = 30 * 250;
    let signal: Vec<f64> = sine(10.0, fs, n)
        .iter()
        .zip(sine(config.notch.freq, fs, n))
        .zip(sine(0.1, fs, n))
        .map(|((alpha, line), drift)| 20.0 * alpha + 5.0 * line + 50.0 * drift)
        .collect();
    let data = vec![signal];

    let bandpassed = config.bandpass.apply(&data, fs)?;
    let cleaned = config.notch.apply(&bandpassed.data, fs)?;

    println!("{}", bandpassed.response.to_json()?);
    println!("{}", cleaned.response.to_json()?);

    let spectrum = welch(&cleaned.data, fs, &config.psd)?;
    for (f, p) in spectrum.frequencies.iter().zip(spectrum.power_db()[0].iter()).step_by(8) {
        println!("{:>7.2} Hz  {:>8.2} dB", f, p);
    }

    Ok(())
}
