//! Live audio to rolling spectral history.
//!
//! A [`CaptureStage`] runs on the audio thread: it windows each block,
//! transforms it and publishes the spectrum into a [`HistoryRing`] without
//! locking or allocating. Renderers read through [`SpectrumSource`] at their
//! own pace and only ever see complete frames.

#[macro_use]
extern crate clap;

pub mod capture;
pub mod config;
pub mod error;
pub mod frame;
pub mod history;
pub mod peak;
pub mod pipeline;
pub mod seqlock;
pub mod transform;
pub mod window;

#[cfg(feature = "app")]
pub mod audio;
#[cfg(feature = "app")]
pub mod view;

pub use capture::CaptureStage;
pub use config::Config;
pub use error::{Error, Result};
pub use frame::SpectrumFrame;
pub use history::{HistoryRing, HistorySnapshot};
pub use peak::{PeakMode, PeakTracker};
pub use pipeline::{Pipeline, SpectrumSource};
