//! Tapering windows applied to each block before the transform.

use std::collections::BTreeMap;
use std::f32::consts::PI;

pub const DEFAULT_WINDOW: &str = "hann";

pub trait Window: Send + Sync {
    fn size(&self) -> usize;
    fn shape(&self) -> &[f32];

    /// Multiply `data` elementwise by the window. Lengths must match.
    fn apply(&self, data: &mut [f32]) {
        let shp = self.shape();
        debug_assert_eq!(shp.len(), data.len());
        for (datum, factor) in data.iter_mut().zip(shp.iter()) {
            *datum *= factor;
        }
    }
}

/// A window backed by a precomputed coefficient table.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericWindow(Vec<f32>);

impl GenericWindow {
    fn from_fn(sz: usize, f: impl Fn(f32) -> f32) -> GenericWindow {
        // Symmetric tables: phase runs 0..=1 across the block so both ends
        // land on the same coefficient.
        let span = sz.saturating_sub(1).max(1) as f32;
        GenericWindow((0..sz).map(|i| f(i as f32 / span)).collect())
    }
}

impl Window for GenericWindow {
    fn size(&self) -> usize { self.0.len() }
    fn shape(&self) -> &[f32] { &self.0 }
}

pub type WindowCtor = fn(usize) -> Box<dyn Window>;

fn new_rect(sz: usize) -> Box<dyn Window> {
    Box::new(GenericWindow(vec![1.0f32; sz]))
}

fn new_hann(sz: usize) -> Box<dyn Window> {
    Box::new(GenericWindow::from_fn(sz, |p| 0.5 * (1.0 - (2.0 * PI * p).cos())))
}

fn new_hamming(sz: usize) -> Box<dyn Window> {
    Box::new(GenericWindow::from_fn(sz, |p| 0.54 - 0.46 * (2.0 * PI * p).cos()))
}

fn new_blackman(sz: usize) -> Box<dyn Window> {
    Box::new(GenericWindow::from_fn(sz, |p| {
        0.42 - 0.5 * (2.0 * PI * p).cos() + 0.08 * (4.0 * PI * p).cos()
    }))
}

/// Named window constructors, sorted by name.
pub fn windows() -> BTreeMap<&'static str, WindowCtor> {
    let mut map: BTreeMap<&'static str, WindowCtor> = BTreeMap::new();
    map.insert("rect", new_rect);
    map.insert("hann", new_hann);
    map.insert("hamming", new_hamming);
    map.insert("blackman", new_blackman);
    map
}

/// Build the named window for a block of `sz` samples.
pub fn build(name: &str, sz: usize) -> Option<Box<dyn Window>> {
    windows().get(name).map(|ctor| ctor(sz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_tapers_to_zero_and_peaks_mid_block() {
        for &n in &[4usize, 16, 512, 1024] {
            let win = build("hann", n).unwrap();
            let shp = win.shape();
            assert_eq!(win.size(), n);
            assert!(shp[0].abs() < 1e-6);
            assert!(shp[n - 1].abs() < 1e-6);

            let (argmax, max) = shp
                .iter()
                .cloned()
                .enumerate()
                .fold((0, f32::MIN), |a, (i, v)| if v > a.1 { (i, v) } else { a });
            assert!(max <= 1.0 + 1e-6);
            assert!(max > 0.7, "n={} max={}", n, max);
            assert!((argmax as isize - (n / 2) as isize).abs() <= 1);
        }
    }

    #[test]
    fn construction_is_deterministic() {
        for name in windows().keys() {
            let a = build(name, 512).unwrap();
            let b = build(name, 512).unwrap();
            let a_bits: Vec<u32> = a.shape().iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u32> = b.shape().iter().map(|v| v.to_bits()).collect();
            assert_eq!(a_bits, b_bits, "{}", name);
        }
    }

    #[test]
    fn apply_scales_elementwise() {
        let win = build("hann", 8).unwrap();
        let mut data = vec![2.0f32; 8];
        win.apply(&mut data);
        for (d, w) in data.iter().zip(win.shape()) {
            assert_eq!(*d, 2.0 * w);
        }
    }

    #[test]
    fn unknown_window_is_none() {
        assert!(build("kaiser", 64).is_none());
        assert_eq!(build("rect", 3).unwrap().shape(), &[1.0, 1.0, 1.0]);
    }
}
