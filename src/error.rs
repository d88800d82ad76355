use thiserror::Error;

/// Startup failures. Once the stream is running nothing in the analysis path
/// can fail, so these only come out of configuration and device setup.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("invalid {name} {value:?}: {reason}")]
    InvalidConfig {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("unknown window function {0:?} (see --list-win)")]
    UnknownWindow(String),

    #[error("no audio input device available")]
    NoDevice,

    #[error("input device {0:?} not found (see --list-dev)")]
    DeviceNotFound(String),

    #[error("audio device: {0}")]
    Device(String),

    #[error("video: {0}")]
    Video(String),
}

pub type Result<T> = std::result::Result<T, Error>;
