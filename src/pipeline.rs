//! Shared analysis state and the read-only surface renderers use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use rustfft::num_complex::Complex;

use crate::capture::CaptureStage;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::SpectrumFrame;
use crate::history::{self, HistoryRing, HistorySnapshot};
use crate::peak::{PeakMode, PeakTracker};
use crate::seqlock::SeqBuffer;
use crate::window::{self, Window};

/// What a renderer may ask of the analysis. Every method copies out or
/// reads atomics; none of them can hold up the capture stage.
pub trait SpectrumSource {
    fn config(&self) -> &Config;

    /// Copy the most recently analysed frame into `frame`.
    fn current_frame(&self, frame: &mut SpectrumFrame);

    fn history(&self) -> &HistoryRing;

    fn snapshot(&self) -> HistorySnapshot {
        self.history().snapshot()
    }

    fn peak(&self, mode: PeakMode) -> f32 {
        PeakTracker::new(self.history()).value(mode)
    }

    /// Copy the most recent unwindowed block into `out`.
    fn latest_samples(&self, out: &mut [f32]);

    fn window(&self) -> &[f32];

    fn blocks_analysed(&self) -> u64;
}

/// Buffers shared between the capture stage (sole writer) and any number
/// of readers. Allocated once in [`Pipeline::new`]; never resized.
pub struct Pipeline {
    config: Config,
    window: Box<dyn Window>,
    history: HistoryRing,
    current: SeqBuffer,
    samples: SeqBuffer,
    blocks: AtomicU64,
    transform_failures: AtomicU64,
}

impl Pipeline {
    /// Build the shared state for `config` and the capture stage that feeds
    /// it. The capture stage is the only writer there will ever be.
    pub fn new(config: &Config) -> Result<(Arc<Pipeline>, CaptureStage)> {
        let config = config.clone().validated()?;
        let window = window::build(&config.window, config.block_len)
            .ok_or_else(|| Error::UnknownWindow(config.window.clone()))?;
        let bins = config.bins();

        debug!(
            "allocating pipeline: {} samples/block, {} bins, {} frames of history",
            config.block_len, bins, config.capacity
        );
        let pipeline = Arc::new(Pipeline {
            history: HistoryRing::new(config.capacity, bins),
            current: SeqBuffer::new(history::frame_len(bins)),
            samples: SeqBuffer::new(config.block_len),
            blocks: AtomicU64::new(0),
            transform_failures: AtomicU64::new(0),
            window,
            config,
        });
        let capture = CaptureStage::new(pipeline.clone());
        Ok((pipeline, capture))
    }

    pub fn window_table(&self) -> &dyn Window { self.window.as_ref() }

    /// Blocks whose transform was skipped because of a buffer mismatch.
    pub fn transform_failures(&self) -> u64 {
        self.transform_failures.load(Ordering::Relaxed)
    }

    pub(crate) fn publish(&self, raw: &[f32], frame: &[Complex<f32>], peak: f32) {
        self.samples.write_from(raw);
        history::store_frame(&self.current, frame, peak);
        self.history.write(frame, peak);
        self.blocks.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn note_transform_failure(&self) {
        self.transform_failures.fetch_add(1, Ordering::Relaxed);
    }
}

impl SpectrumSource for Pipeline {
    fn config(&self) -> &Config { &self.config }

    fn current_frame(&self, frame: &mut SpectrumFrame) {
        history::load_frame(&self.current, frame);
    }

    fn history(&self) -> &HistoryRing { &self.history }

    fn latest_samples(&self, out: &mut [f32]) {
        self.samples.read_into(out);
    }

    fn window(&self) -> &[f32] { self.window.shape() }

    fn blocks_analysed(&self) -> u64 {
        self.blocks.load(Ordering::Acquire)
    }
}
