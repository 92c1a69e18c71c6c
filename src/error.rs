use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EegError {
    #[error("Malformed annotation sequence: {0}")]
    MalformedAnnotations(String),

    #[error("No annotation event matches marker code {0}")]
    NoMatchingSegments(i32),

    #[error("Channel {channel} has {found} samples, expected {expected}")]
    InconsistentChannelLengths {
        channel: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid sampling rate: {0}")]
    InvalidSamplingRate(f64),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Signal too short: {length} samples, at least {required} required")]
    SignalTooShort { length: usize, required: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EegError>;
