//! Decoding text annotations into integer-coded events
//!
//! Recordings exported from BrainVision systems carry their triggers as
//! descriptions such as `Stimulus/S210` or `Response/R  3`. The extractor
//! works on integer codes, so the descriptions are decoded here first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EegError, Result};
use crate::types::{Annotation, Event};
use crate::utils::time_to_sample;

/// Offset added to `Response/R<n>` codes
pub const RESPONSE_OFFSET: i32 = 1000;
/// Code given to `New Segment/` markers
pub const NEW_SEGMENT_CODE: i32 = 99999;

/// How annotation descriptions map to event codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMapping {
    /// BrainVision trigger names and bare integers
    #[default]
    BrainVision,
    /// Exact description to code table; other descriptions are skipped
    Explicit(HashMap<String, i32>),
}

impl EventMapping {
    /// Code for `description`, `None` when it is not an event
    pub fn code_for(&self, description: &str) -> Option<i32> {
        match self {
            EventMapping::BrainVision => brainvision_code(description),
            EventMapping::Explicit(table) => table.get(description).copied(),
        }
    }
}

fn brainvision_code(description: &str) -> Option<i32> {
    let description = description.trim();

    if description.starts_with("New Segment/") {
        return Some(NEW_SEGMENT_CODE);
    }
    if let Some(rest) = description.strip_prefix("Stimulus/S") {
        return parse_trigger(rest);
    }
    if let Some(rest) = description.strip_prefix("Response/R") {
        return parse_trigger(rest).map(|n| n + RESPONSE_OFFSET);
    }

    parse_trigger(description)
}

// BrainVision pads trigger numbers with spaces ("S  1")
fn parse_trigger(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Converts annotations to events ordered by onset sample
///
/// Each onset is rounded to the nearest sample at `sfreq`. Annotations whose
/// description has no code under `mapping` are dropped.
///
/// # Examples
///
/// ```rust
/// use eegtutor::{events_from_annotations, Annotation, Event, EventMapping};
///
/// let annotations = vec![
///     Annotation::from_seconds(0.0, None, "New Segment/"),
///     Annotation::from_seconds(1.0, None, "Stimulus/S210"),
///     Annotation::from_seconds(2.0, None, "Comment/no USB connection"),
///     Annotation::from_seconds(3.0, None, "Stimulus/S200"),
/// ];
///
/// let events = events_from_annotations(&annotations, 250.0, &EventMapping::default())?;
/// assert_eq!(events, vec![
///     Event::new(0, 99999),
///     Event::new(250, 210),
///     Event::new(750, 200),
/// ]);
/// # Ok::<(), eegtutor::EegError>(())
/// ```
pub fn events_from_annotations(
    annotations: &[Annotation],
    sfreq: f64,
    mapping: &EventMapping,
) -> Result<Vec<Event>> {
    if !sfreq.is_finite() || sfreq <= 0.0 {
        return Err(EegError::InvalidSamplingRate(sfreq));
    }

    let mut events = Vec::with_capacity(annotations.len());

    for annotation in annotations {
        match mapping.code_for(&annotation.description) {
            Some(code) => {
                let sample = time_to_sample(annotation.onset, sfreq)?;
                events.push(Event::new(sample, code));
            }
            None => {
                log::debug!("Skipping annotation '{}' without event code", annotation.description);
            }
        }
    }

    // 稳定排序，保留同一时刻事件的原始顺序
    events.sort_by_key(|e| e.sample);

    Ok(events)
}
