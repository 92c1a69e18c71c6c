//! # EEG tutorial helpers
//!
//! Small, independent functions used in an introductory EEG analysis course:
//! cutting one experimental condition out of a continuous recording,
//! Butterworth bandpass and notch filtering, and Welch power spectra.
//!
//! Plotting is left to the caller. Functions that would draw a figure return
//! a [`Figure`] describing it instead.
//!
//! ## Quick Start
//!
//! ### Extracting the eyes-closed condition
//!
//! ```rust
//! use eegtutor::{extract_eyes_closed, Result};
//! # use eegtutor::doctest_utils::create_resting_state_recording;
//!
//! fn main() -> Result<()> {
//!     // 8 blocks of 60 s, eyes closed (210) and eyes open (200) alternating
//!     let raw = create_resting_state_recording(8, 60.0)?;
//!
//!     let extraction = extract_eyes_closed(&raw)?;
//!     println!("Extracted {} segments, {:.1} min",
//!         extraction.segments.len(), extraction.duration_minutes());
//!
//!     assert_eq!(extraction.segments.len(), 4);
//!     assert!((extraction.duration_minutes() - 4.0).abs() < 1e-9);
//!     Ok(())
//! }
//! ```
//!
//! ### Filtering and looking at the spectrum
//!
//! ```rust
//! use eegtutor::filter::{bandpass_filter_plot, notch_filter_plot};
//! use eegtutor::spectrum::{plot_psd, WelchParams};
//! use eegtutor::Result;
//! # use eegtutor::doctest_utils::sine;
//!
//! fn main() -> Result<()> {
//!     let fs = 250.0;
//!     // 10 Hz alpha plus 50 Hz line noise
//!     let signal: Vec<f64> = sine(10.0, fs, 5000)
//!         .iter()
//!         .zip(sine(50.0, fs, 5000))
//!         .map(|(alpha, line)| 20.0 * alpha + 5.0 * line)
//!         .collect();
//!
//!     let bandpassed = bandpass_filter_plot(&[signal], fs, 1.0, 45.0)?;
//!     let cleaned = notch_filter_plot(&bandpassed.data, fs, 50.0)?;
//!
//!     let figure = plot_psd(&cleaned.data, fs, &WelchParams::default().with_f_max(60.0))?;
//!     println!("{}", cleaned.response.title);
//!     println!("{} curves, {} points", figure.series.len(), figure.series[0].x.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod types;
pub mod utils;
pub mod events;
pub mod extract;
pub mod filter;
pub mod spectrum;
pub mod plot;
pub mod config;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use error::{EegError, Result};
pub use types::{Annotation, Channel, Event, Recording, Segment};
pub use events::{events_from_annotations, EventMapping};
pub use extract::{extract_condition, extract_eyes_closed, ExtractOptions, Extraction, TrailingBoundary};
pub use plot::{Figure, Series};
pub use config::AnalysisConfig;

// Important constants
pub const TIME_DIMENSION: i64 = 10_000_000; // 100 nanoseconds unit
/// Eyes-closed marker of the resting-state recordings
pub const EYES_CLOSED_CODE: i32 = 210;
/// Event code closing the data of an extracted recording
pub const END_OF_DATA_CODE: i32 = -1;

/// Library version
///
/// # Examples
///
/// ```rust
/// let version = eegtutor::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
