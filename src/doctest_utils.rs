// Internal utilities for documentation tests
// This file contains helpers that build synthetic recordings for doctests

use chrono::{NaiveDate, NaiveDateTime};

use crate::{Channel, Event, Recording, Result};

/// Fixed measurement start used by the synthetic recordings
pub fn test_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 6, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

/// Unit-amplitude sine wave
pub fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
        .collect()
}

/// Creates a 250 Hz recording whose channel `c` holds `c * 100000 + i` at sample `i`
///
/// Distinct ramps make every extracted sample traceable to its source.
pub fn recording_with_codes(
    n_channels: usize,
    n_samples: usize,
    events: &[(usize, i32)],
) -> Result<Recording> {
    let channels = (0..n_channels)
        .map(|c| {
            let samples = (0..n_samples)
                .map(|i| (c * 100_000 + i) as f64)
                .collect();
            Channel::new(format!("EEG {}", c + 1), samples)
        })
        .collect();

    let events = events
        .iter()
        .map(|&(sample, code)| Event::new(sample, code))
        .collect();

    Ok(Recording::new(channels, 250.0, test_start())?.with_events(events))
}

/// Resting-state style recording: alternating eyes-closed (210) and
/// eyes-open (200) blocks of `block_seconds`, 10 Hz alpha during eyes closed
pub fn create_resting_state_recording(blocks: usize, block_seconds: f64) -> Result<Recording> {
    let sfreq = 250.0;
    let block = (block_seconds * sfreq).round() as usize;
    let n_samples = block * blocks;

    let alpha = sine(10.0, sfreq, n_samples);
    let beta = sine(20.0, sfreq, n_samples);

    let mut events = Vec::with_capacity(blocks);
    let mut samples = Vec::with_capacity(n_samples);
    for b in 0..blocks {
        let eyes_closed = b % 2 == 0;
        events.push(Event::new(b * block, if eyes_closed { 210 } else { 200 }));
        for i in b * block..(b + 1) * block {
            samples.push(if eyes_closed { 20.0 * alpha[i] } else { 5.0 * beta[i] });
        }
    }

    Ok(Recording::new(vec![Channel::new("O1", samples)], sfreq, test_start())?.with_events(events))
}
