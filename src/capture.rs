//! The real-time producer. Runs on the audio thread: everything here works
//! on buffers allocated in [`CaptureStage::new`] and publishes through
//! atomics, so a block never waits on a lock, the allocator, or a reader.

use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;

use crate::frame::peak_magnitude;
use crate::pipeline::{Pipeline, SpectrumSource};
use crate::transform::SpectralTransform;

pub struct CaptureStage {
    pipeline: Arc<Pipeline>,
    block: Vec<f32>,
    fill: usize,
    windowed: Vec<f32>,
    transform: SpectralTransform,
    spectrum: Vec<Complex<f32>>,
}

impl CaptureStage {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> CaptureStage {
        let n = pipeline.config().block_len;
        let bins = pipeline.config().bins();
        CaptureStage {
            block: vec![0.0; n],
            fill: 0,
            windowed: vec![0.0; n],
            transform: SpectralTransform::new(n),
            spectrum: vec![Complex { re: 0.0, im: 0.0 }; bins],
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> { &self.pipeline }

    pub fn block_len(&self) -> usize { self.block.len() }

    /// Samples waiting for the current block to fill up.
    pub fn pending(&self) -> usize { self.fill }

    /// Audio engine callback for one duplex block: analyse `input` and
    /// write silence to `output`. With `input.len()` equal to the block
    /// length this publishes exactly one frame per call.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        self.push(input);
        output.fill(0.0);
    }

    /// Feed mono samples of any count; a frame is published each time a
    /// block fills.
    pub fn push(&mut self, samples: &[f32]) {
        for &s in samples {
            self.push_sample(s);
        }
    }

    /// Feed interleaved frames of `channels` samples, averaged down to mono.
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) {
        if channels <= 1 {
            self.push(data);
            return;
        }
        let scale = 1f32 / channels as f32;
        for frame in data.chunks_exact(channels) {
            self.push_sample(frame.iter().sum::<f32>() * scale);
        }
    }

    pub fn push_sample(&mut self, sample: f32) {
        self.block[self.fill] = sample;
        self.fill += 1;
        if self.fill == self.block.len() {
            self.fill = 0;
            self.analyze();
        }
    }

    fn analyze(&mut self) {
        self.windowed.copy_from_slice(&self.block);
        self.pipeline.window_table().apply(&mut self.windowed);

        if !self.transform.process(&mut self.windowed, &mut self.spectrum) {
            self.pipeline.note_transform_failure();
        }
        let peak = peak_magnitude(&self.spectrum);

        self.pipeline.publish(&self.block, &self.spectrum, peak);
    }
}

impl fmt::Debug for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureStage")
            .field("block_len", &self.block.len())
            .field("fill", &self.fill)
            .field("transform", &self.transform)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::frame::SpectrumFrame;
    use crate::peak::PeakMode;
    use std::f32::consts::PI;

    fn small() -> (Arc<Pipeline>, CaptureStage) {
        Pipeline::new(&Config::new(64, 8000, 4).unwrap()).unwrap()
    }

    fn tone(n: usize, freq: f32, rate: f32) -> Vec<f32> {
        (0..n).map(|i| (2.0 * PI * freq * i as f32 / rate).sin()).collect()
    }

    #[test]
    fn one_block_publishes_one_frame_and_silences_output() {
        let (pipeline, mut capture) = small();
        let input = tone(64, 1000.0, 8000.0);
        let mut output = vec![0.5f32; 64];
        capture.process(&input, &mut output);

        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(pipeline.blocks_analysed(), 1);
        assert_eq!(pipeline.snapshot().next_index, 1);
        assert_eq!(capture.pending(), 0);

        let mut frame = SpectrumFrame::new(0);
        pipeline.current_frame(&mut frame);
        assert_eq!(frame.len(), 32);
        // 1000 Hz * 64 / 8000 Hz
        assert_eq!(frame.dominant_bin(), Some(8));
        assert_eq!(frame.peak_magnitude(), peak_magnitude(frame.bins()));
        assert_eq!(pipeline.peak(PeakMode::Instant), frame.peak_magnitude());
        assert_eq!(pipeline.history().frame_at(0).unwrap(), frame);

        let mut raw = vec![0f32; 64];
        pipeline.latest_samples(&mut raw);
        assert_eq!(raw, input);
    }

    #[test]
    fn partial_buffers_accumulate_into_blocks() {
        let (pipeline, mut capture) = small();
        let input = tone(64 * 3, 500.0, 8000.0);
        for chunk in input.chunks(50) {
            capture.push(chunk);
        }
        assert_eq!(pipeline.blocks_analysed(), 3);
        assert_eq!(capture.pending(), 0);

        capture.push(&input[..10]);
        assert_eq!(pipeline.blocks_analysed(), 3);
        assert_eq!(capture.pending(), 10);
    }

    #[test]
    fn interleaved_channels_are_averaged() {
        let (pipeline, mut capture) = small();
        let stereo: Vec<f32> = (0..64).flat_map(|i| [i as f32, -(i as f32) + 2.0]).collect();
        capture.push_interleaved(&stereo, 2);
        assert_eq!(pipeline.blocks_analysed(), 1);

        let mut raw = vec![0f32; 64];
        pipeline.latest_samples(&mut raw);
        assert!(raw.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn current_frame_is_independent_of_history() {
        let (pipeline, mut capture) = small();
        capture.push(&tone(64, 1000.0, 8000.0));
        capture.push(&vec![0.0; 64]);

        let mut current = SpectrumFrame::new(0);
        pipeline.current_frame(&mut current);
        assert!(current.is_silent());
        assert!(!pipeline.history().frame_at(0).unwrap().is_silent());
        assert_eq!(pipeline.history().frame_at(1).unwrap(), current);
        assert_eq!(pipeline.transform_failures(), 0);
    }
}
