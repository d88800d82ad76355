//! Real-input forward transform with every buffer sized up front.

use std::fmt;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

/// One-sided spectrum of a real block of `len` samples: bins `0 .. len / 2`.
///
/// The planner, output and scratch buffers are created in [`SpectralTransform::new`];
/// [`SpectralTransform::process`] only touches memory that already exists, so
/// it is safe to call from the audio thread.
pub struct SpectralTransform {
    fft: Arc<dyn RealToComplex<f32>>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    scale: f32,
}

impl SpectralTransform {
    pub fn new(len: usize) -> SpectralTransform {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(len);
        let output = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();
        SpectralTransform {
            fft,
            output,
            scratch,
            scale: 1f32 / (len as f32).sqrt(),
        }
    }

    pub fn len(&self) -> usize { self.fft.len() }

    pub fn bins(&self) -> usize { self.fft.len() / 2 }

    /// Transform `input` into `out`. `input` is clobbered (the FFT uses it
    /// as workspace). `out` receives `bins()` values; the Nyquist bin the
    /// real FFT also produces is dropped.
    ///
    /// Returns false, with `out` zeroed, if the buffer lengths do not match
    /// the planned length.
    pub fn process(&mut self, input: &mut [f32], out: &mut [Complex<f32>]) -> bool {
        let bins = self.bins();
        if out.len() != bins
            || self
                .fft
                .process_with_scratch(input, &mut self.output, &mut self.scratch)
                .is_err()
        {
            out.fill(Complex { re: 0.0, im: 0.0 });
            return false;
        }

        for (dst, src) in out.iter_mut().zip(&self.output[..bins]) {
            *dst = *src * self.scale;
        }
        true
    }
}

impl fmt::Debug for SpectralTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralTransform")
            .field("len", &self.len())
            .field("scale", &self.scale)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::peak_magnitude;
    use crate::window;
    use std::f32::consts::PI;

    fn sine(n: usize, freq: f32, rate: f32) -> Vec<f32> {
        (0..n).map(|i| (2.0 * PI * freq * i as f32 / rate).sin()).collect()
    }

    fn loudest(bins: &[Complex<f32>]) -> usize {
        bins.iter()
            .enumerate()
            .fold((0, -1f32), |a, (i, c)| if c.norm() > a.1 { (i, c.norm()) } else { a })
            .0
    }

    #[test]
    fn yields_half_as_many_bins() {
        let mut xf = SpectralTransform::new(512);
        assert_eq!(xf.len(), 512);
        assert_eq!(xf.bins(), 256);
        let mut input = vec![0.0f32; 512];
        let mut out = vec![Complex { re: 1.0, im: 1.0 }; 256];
        assert!(xf.process(&mut input, &mut out));
        assert!(out.iter().all(|c| c.re == 0.0 && c.im == 0.0));
    }

    #[test]
    fn sinusoid_lands_in_nearest_bin() {
        let (n, rate) = (512usize, 44100f32);
        let win = window::build("hann", n).unwrap();
        let mut xf = SpectralTransform::new(n);
        let mut out = vec![Complex { re: 0.0, im: 0.0 }; n / 2];

        for &freq in &[440f32, 1000.0, 2500.0, 5000.0] {
            let mut block = sine(n, freq, rate);
            win.apply(&mut block);
            assert!(xf.process(&mut block, &mut out));
            let expected = (freq * n as f32 / rate).round() as usize;
            assert_eq!(loudest(&out), expected, "freq {}", freq);
        }
    }

    #[test]
    fn mismatched_lengths_zero_the_output() {
        let mut xf = SpectralTransform::new(64);
        let mut input = vec![1.0f32; 32];
        let mut out = vec![Complex { re: 3.0, im: 0.0 }; 32];
        assert!(!xf.process(&mut input, &mut out));
        assert_eq!(peak_magnitude(&out), 0.0);

        let mut input = vec![1.0f32; 64];
        let mut short = vec![Complex { re: 3.0, im: 0.0 }; 31];
        assert!(!xf.process(&mut input, &mut short));
        assert_eq!(peak_magnitude(&short), 0.0);
    }

    #[test]
    fn dc_block_concentrates_in_bin_zero() {
        let mut xf = SpectralTransform::new(16);
        let mut input = vec![1.0f32; 16];
        let mut out = vec![Complex { re: 0.0, im: 0.0 }; 8];
        assert!(xf.process(&mut input, &mut out));
        // sum of 16 ones, scaled by 1/sqrt(16)
        assert!((out[0].re - 4.0).abs() < 1e-5);
        assert!(out[1..].iter().all(|c| c.norm() < 1e-5));
    }
}
