use chrono::NaiveDateTime;

use crate::error::{EegError, Result};
use crate::TIME_DIMENSION;

/// One channel of a recording
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub label: String,
    pub samples: Vec<f64>,    // 物理值样本
}

impl Channel {
    pub fn new(label: impl Into<String>, samples: Vec<f64>) -> Self {
        Channel {
            label: label.into(),
            samples,
        }
    }
}

/// An integer-coded annotation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub sample: usize,        // 起始样本索引
    pub code: i32,            // 事件代码
}

impl Event {
    pub fn new(sample: usize, code: i32) -> Self {
        Event { sample, code }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub onset: i64,           // 开始时间（100纳秒为单位）
    pub duration: i64,        // 持续时间（100纳秒为单位，-1表示未知）
    pub description: String,  // UTF-8描述
}

impl Annotation {
    /// Creates an annotation from seconds; `None` duration means instantaneous
    pub fn from_seconds(onset_seconds: f64, duration_seconds: Option<f64>, description: &str) -> Self {
        let onset = (onset_seconds * TIME_DIMENSION as f64).round() as i64;
        let duration = duration_seconds
            .map(|d| (d * TIME_DIMENSION as f64).round() as i64)
            .unwrap_or(-1);

        Annotation {
            onset,
            duration,
            description: description.to_string(),
        }
    }

    pub fn onset_seconds(&self) -> f64 {
        self.onset as f64 / TIME_DIMENSION as f64
    }

    /// Duration in seconds, `None` when unknown
    pub fn duration_seconds(&self) -> Option<f64> {
        if self.duration >= 0 {
            Some(self.duration as f64 / TIME_DIMENSION as f64)
        } else {
            None
        }
    }
}

/// A contiguous interval of one condition occurrence
///
/// `start..end` addresses the source recording, `onset` is where the
/// interval begins once segments are concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub onset: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn duration_seconds(&self, sfreq: f64) -> f64 {
        self.len() as f64 / sfreq
    }
}

/// Multi-channel, equally sampled recording with its annotations
///
/// Fields are public so callers can assemble recordings from any loader;
/// [`Recording::validate`] checks the invariants the processing functions
/// rely on.
///
/// # Examples
///
/// ```rust
/// use eegtutor::{Channel, Event, Recording};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
///     .and_hms_opt(9, 30, 0).unwrap();
/// let recording = Recording::new(
///     vec![
///         Channel::new("Fp1", vec![0.0; 500]),
///         Channel::new("Fp2", vec![0.0; 500]),
///     ],
///     250.0,
///     start,
/// )?
/// .with_events(vec![Event::new(0, 210), Event::new(250, 200)]);
///
/// assert_eq!(recording.n_channels(), 2);
/// assert_eq!(recording.n_samples(), 500);
/// assert!((recording.duration_seconds() - 2.0).abs() < 1e-12);
/// # Ok::<(), eegtutor::EegError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Recording {
    pub channels: Vec<Channel>,
    pub sfreq: f64,                   // 采样频率（Hz）
    pub start: NaiveDateTime,         // 记录开始时间
    pub events: Vec<Event>,           // 按起始样本排序
    pub annotations: Vec<Annotation>,
}

impl Recording {
    /// Builds a validated recording without annotations
    pub fn new(channels: Vec<Channel>, sfreq: f64, start: NaiveDateTime) -> Result<Self> {
        let recording = Recording {
            channels,
            sfreq,
            start,
            events: Vec::new(),
            annotations: Vec::new(),
        };
        recording.validate()?;
        Ok(recording)
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Checks the sampling rate and that all channels have the same length
    pub fn validate(&self) -> Result<()> {
        if !self.sfreq.is_finite() || self.sfreq <= 0.0 {
            return Err(EegError::InvalidSamplingRate(self.sfreq));
        }

        let expected = self.n_samples();
        for (channel, ch) in self.channels.iter().enumerate() {
            if ch.samples.len() != expected {
                return Err(EegError::InconsistentChannelLengths {
                    channel,
                    expected,
                    found: ch.samples.len(),
                });
            }
        }

        Ok(())
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    /// Sample count of the first channel (0 without channels)
    pub fn n_samples(&self) -> usize {
        self.channels.first().map_or(0, |ch| ch.samples.len())
    }

    pub fn duration_seconds(&self) -> f64 {
        self.n_samples() as f64 / self.sfreq
    }

    /// Copies the sample data as a `[n_channels][n_samples]` matrix
    pub fn data(&self) -> Vec<Vec<f64>> {
        self.channels.iter().map(|ch| ch.samples.clone()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.channels.iter().map(|ch| ch.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_validate_rejects_ragged_channels() {
        let result = Recording::new(
            vec![Channel::new("a", vec![0.0; 10]), Channel::new("b", vec![0.0; 9])],
            100.0,
            start(),
        );
        match result {
            Err(EegError::InconsistentChannelLengths { channel, expected, found }) => {
                assert_eq!(channel, 1);
                assert_eq!(expected, 10);
                assert_eq!(found, 9);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_sampling_rate() {
        for sfreq in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Recording::new(vec![Channel::new("a", vec![0.0; 4])], sfreq, start());
            assert!(matches!(result, Err(EegError::InvalidSamplingRate(_))));
        }
    }

    #[test]
    fn test_annotation_time_conversion() {
        let ann = Annotation::from_seconds(1.5, Some(0.25), "Stimulus/S210");
        assert_eq!(ann.onset, 15_000_000);
        assert_eq!(ann.duration, 2_500_000);
        assert!((ann.onset_seconds() - 1.5).abs() < 1e-12);
        assert_eq!(ann.duration_seconds(), Some(0.25));

        let instant = Annotation::from_seconds(2.0, None, "Comment");
        assert_eq!(instant.duration, -1);
        assert_eq!(instant.duration_seconds(), None);
    }

    #[test]
    fn test_segment_length() {
        let seg = Segment { start: 150, end: 400, onset: 100 };
        assert_eq!(seg.len(), 250);
        assert!(!seg.is_empty());
        assert!((seg.duration_seconds(250.0) - 1.0).abs() < 1e-12);
    }
}
