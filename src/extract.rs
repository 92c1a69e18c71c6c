//! Condition segment extraction
//!
//! A condition starts at every event carrying the marker code and lasts
//! until the next event of any kind. All such intervals are cut out of the
//! recording and concatenated into a new, shorter recording.

use serde::{Deserialize, Serialize};

use crate::error::{EegError, Result};
use crate::types::{Annotation, Channel, Event, Recording, Segment};
use crate::utils::{samples_to_minutes, samples_to_time};
use crate::{END_OF_DATA_CODE, EYES_CLOSED_CODE};

/// Where a marker with no following event is closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingBoundary {
    /// At the onset of the last event in the sequence
    #[default]
    LastEvent,
    /// At the end of the sample data
    RecordingEnd,
}

/// Options for [`extract_condition`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Event code opening a condition interval
    pub marker: i32,
    /// Description of the output segment annotations
    pub label: String,
    /// Event code of the output segment starts, defaults to `marker`
    pub segment_code: Option<i32>,
    pub trailing: TrailingBoundary,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            marker: EYES_CLOSED_CODE,
            label: "segment".to_string(),
            segment_code: None,
            trailing: TrailingBoundary::LastEvent,
        }
    }
}

impl ExtractOptions {
    pub fn new(marker: i32) -> Self {
        ExtractOptions {
            marker,
            ..Default::default()
        }
    }

    pub fn segment_code(&self) -> i32 {
        self.segment_code.unwrap_or(self.marker)
    }

    pub fn validate(&self) -> Result<()> {
        if self.segment_code() == END_OF_DATA_CODE {
            return Err(EegError::InvalidParameter(format!(
                "Segment code {} is reserved for the end-of-data event", END_OF_DATA_CODE
            )));
        }
        if self.label.is_empty() {
            return Err(EegError::InvalidParameter("Segment label cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Result of a condition extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Concatenated data; events use its own time base, annotations the source one
    pub recording: Recording,
    /// Included intervals in onset order
    pub segments: Vec<Segment>,
}

impl Extraction {
    pub fn total_samples(&self) -> usize {
        self.recording.n_samples()
    }

    /// Segment durations in samples
    pub fn durations(&self) -> Vec<usize> {
        self.segments.iter().map(Segment::len).collect()
    }

    pub fn duration_minutes(&self) -> f64 {
        samples_to_minutes(self.total_samples(), self.recording.sfreq)
    }

    pub fn into_recording(self) -> Recording {
        self.recording
    }
}

/// Locates the `[start, end)` sample ranges opened by `marker`
///
/// Every event coded `marker` opens a range which the next event in the
/// sequence closes, so consecutive markers produce adjacent ranges. The last
/// marker may have no successor; it is then closed according to `trailing`.
///
/// `events` must be non-empty and ordered by sample; `n_samples` is only used
/// for [`TrailingBoundary::RecordingEnd`].
pub fn find_segments(
    events: &[Event],
    marker: i32,
    n_samples: usize,
    trailing: TrailingBoundary,
) -> Result<Vec<(usize, usize)>> {
    let last = events
        .last()
        .ok_or_else(|| EegError::MalformedAnnotations("Annotation sequence is empty".to_string()))?;

    // 标记事件的位置
    let starts: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.code == marker)
        .map(|(i, _)| i)
        .collect();

    // 每个起点由下一个事件结束
    let mut ends: Vec<usize> = starts
        .iter()
        .filter_map(|&i| events.get(i + 1).map(|next| next.sample))
        .collect();

    if ends.len() < starts.len() {
        let end = match trailing {
            TrailingBoundary::LastEvent => last.sample,
            TrailingBoundary::RecordingEnd => n_samples,
        };
        log::debug!("Condition still open after the last event, closing at sample {}", end);
        ends.push(end);
    }

    if ends.len() != starts.len() {
        return Err(EegError::MalformedAnnotations(format!(
            "{} condition onsets but {} ends", starts.len(), ends.len()
        )));
    }

    Ok(starts
        .iter()
        .zip(ends)
        .map(|(&i, end)| (events[i].sample, end))
        .collect())
}

fn check_events(events: &[Event], n_samples: usize) -> Result<()> {
    if events.is_empty() {
        return Err(EegError::MalformedAnnotations("Annotation sequence is empty".to_string()));
    }

    for (i, pair) in events.windows(2).enumerate() {
        if pair[1].sample < pair[0].sample {
            return Err(EegError::MalformedAnnotations(format!(
                "Event {} at sample {} precedes event {} at sample {}",
                i + 1, pair[1].sample, i, pair[0].sample
            )));
        }
    }

    if let Some(last) = events.last() {
        if last.sample > n_samples {
            return Err(EegError::MalformedAnnotations(format!(
                "Event at sample {} lies beyond the {} recorded samples",
                last.sample, n_samples
            )));
        }
    }

    Ok(())
}

/// Extracts and concatenates every interval of one condition
///
/// The output keeps the channel layout, sampling rate and start time of the
/// input. Its events mark each segment start with the segment code plus one
/// closing [`END_OF_DATA_CODE`] event at the end of the data, so running the
/// extraction again with `marker` set to the segment code gives back the
/// same data. Its annotations record each segment's original onset,
/// relative to the recording start, and its duration.
///
/// # Errors
///
/// * `EegError::InvalidSamplingRate` / `EegError::InconsistentChannelLengths` -
///   the recording is invalid
/// * `EegError::MalformedAnnotations` - no events, events out of order or
///   beyond the data
/// * `EegError::NoMatchingSegments` - no event carries the marker code
///
/// # Examples
///
/// ```rust
/// use eegtutor::{extract_condition, ExtractOptions};
/// use eegtutor::doctest_utils::recording_with_codes;
///
/// let recording = recording_with_codes(
///     2,
///     600,
///     &[(0, 210), (100, 1), (150, 210), (400, 2), (500, 1)],
/// )?;
///
/// let extraction = extract_condition(&recording, &ExtractOptions::new(210))?;
/// assert_eq!(extraction.segments.len(), 2);
/// assert_eq!(extraction.durations(), vec![100, 250]);
/// assert_eq!(extraction.total_samples(), 350);
/// assert_eq!(extraction.recording.n_channels(), 2);
/// # Ok::<(), eegtutor::EegError>(())
/// ```
pub fn extract_condition(recording: &Recording, options: &ExtractOptions) -> Result<Extraction> {
    recording.validate()?;
    options.validate()?;

    let n_samples = recording.n_samples();
    check_events(&recording.events, n_samples)?;

    let ranges = find_segments(&recording.events, options.marker, n_samples, options.trailing)?;
    if ranges.is_empty() {
        return Err(EegError::NoMatchingSegments(options.marker));
    }

    let mut segments = Vec::with_capacity(ranges.len());
    let mut onset = 0;
    for (start, end) in ranges {
        if end == start {
            log::warn!("Zero-length condition segment at sample {}", start);
        }
        segments.push(Segment { start, end, onset });
        onset += end - start;
    }
    let total = onset;

    let channels: Vec<Channel> = recording
        .channels
        .iter()
        .map(|ch| {
            let mut samples = Vec::with_capacity(total);
            for seg in &segments {
                samples.extend_from_slice(&ch.samples[seg.start..seg.end]);
            }
            Channel::new(ch.label.clone(), samples)
        })
        .collect();

    let segment_code = options.segment_code();
    let mut events: Vec<Event> = segments
        .iter()
        .map(|seg| Event::new(seg.onset, segment_code))
        .collect();
    events.push(Event::new(total, END_OF_DATA_CODE));

    let sfreq = recording.sfreq;
    let annotations = segments
        .iter()
        .map(|seg| Annotation {
            onset: samples_to_time(seg.start, sfreq),
            duration: samples_to_time(seg.len(), sfreq),
            description: options.label.clone(),
        })
        .collect();

    for seg in &segments {
        log::debug!(
            "Segment [{}, {}) -> onset {} ({:.2} s)",
            seg.start, seg.end, seg.onset, seg.duration_seconds(sfreq)
        );
    }
    log::info!(
        "duration of data = {:.2} min ({} segments of code {})",
        samples_to_minutes(total, sfreq),
        segments.len(),
        options.marker
    );

    let output = Recording {
        channels,
        sfreq,
        start: recording.start,
        events,
        annotations,
    };

    Ok(Extraction {
        recording: output,
        segments,
    })
}

/// Extracts the eyes-closed condition (marker 210) of a resting-state recording
pub fn extract_eyes_closed(recording: &Recording) -> Result<Extraction> {
    extract_condition(recording, &ExtractOptions::default())
}
