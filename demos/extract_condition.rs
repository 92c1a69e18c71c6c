use eegtutor::doctest_utils::create_resting_state_recording;
use eegtutor::spectrum::{recording_psd, WelchParams};
use eegtutor::{extract_condition, ExtractOptions, Result};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 16 分钟静息态：闭眼(210)与睁眼(200)每分钟交替
    let raw = create_resting_state_recording(16, 60.0)?;
    println!("Raw recording: {} channels, {:.1} s, {} events",
        raw.n_channels(), raw.duration_seconds(), raw.events.len());

    let extraction = extract_condition(&raw, &ExtractOptions::new(210))?;
    for seg in &extraction.segments {
        println!("  segment [{:>6}, {:>6}) -> onset {:>6}, {:.1} s",
            seg.start, seg.end, seg.onset, seg.duration_seconds(raw.sfreq));
    }
    println!("Eyes closed: {:.2} min", extraction.duration_minutes());

    let (spectrum, figure) = recording_psd(&extraction.recording, &WelchParams::default().with_f_max(40.0))?;
    if let Some(peak) = spectrum.peak_frequency(0) {
        println!("Alpha peak at {:.2} Hz", peak);
    }
    println!("{}", figure.to_json()?);

    Ok(())
}
