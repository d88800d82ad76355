use rustfft::num_complex::Complex;

/// Largest bin magnitude, or 0 for an empty or silent spectrum.
pub fn peak_magnitude(bins: &[Complex<f32>]) -> f32 {
    bins.iter().map(|c| c.norm()).fold(0f32, f32::max)
}

/// A reader-owned copy of one analysed block: `N / 2` complex bins and the
/// peak magnitude across them.
///
/// Frames are filled by copying out of the shared buffers (see
/// [`HistoryRing::read_slot`](crate::history::HistoryRing::read_slot)), so a
/// renderer can keep one around as long as it likes while the capture stage
/// recycles the slot it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    pub(crate) bins: Vec<Complex<f32>>,
    pub(crate) peak: f32,
}

impl SpectrumFrame {
    /// A silent frame of `bins` bins.
    pub fn new(bins: usize) -> SpectrumFrame {
        SpectrumFrame {
            bins: vec![Complex { re: 0.0, im: 0.0 }; bins],
            peak: 0.0,
        }
    }

    pub fn from_bins(bins: Vec<Complex<f32>>) -> SpectrumFrame {
        let peak = peak_magnitude(&bins);
        SpectrumFrame { bins, peak }
    }

    pub fn bins(&self) -> &[Complex<f32>] { &self.bins }

    pub fn len(&self) -> usize { self.bins.len() }

    pub fn is_empty(&self) -> bool { self.bins.is_empty() }

    pub fn peak_magnitude(&self) -> f32 { self.peak }

    pub fn magnitudes(&self) -> impl Iterator<Item = f32> + '_ {
        self.bins.iter().map(|c| c.norm())
    }

    /// Index of the loudest bin; the lowest index wins ties.
    pub fn dominant_bin(&self) -> Option<usize> {
        self.magnitudes()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, m)| match best {
                Some((_, bm)) if bm >= m => best,
                _ => Some((i, m)),
            })
            .map(|(i, _)| i)
    }

    pub fn is_silent(&self) -> bool {
        self.peak == 0.0 && self.bins.iter().all(|c| c.re == 0.0 && c.im == 0.0)
    }
}
