//! Fixed-capacity ring of published spectra.
//!
//! One writer (the capture stage) and any number of readers. Each slot is a
//! [`SeqBuffer`] holding the frame's peak followed by its bins as interleaved
//! `re, im` pairs, so readers always copy out a whole frame: the one that was
//! there, or the one that replaced it. The cursor is advanced only after the
//! slot and its peak are stored.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use rustfft::num_complex::Complex;

use crate::frame::SpectrumFrame;
use crate::seqlock::SeqBuffer;

/// Number of `f32`s a frame of `bins` bins occupies in a [`SeqBuffer`].
pub(crate) fn frame_len(bins: usize) -> usize {
    1 + 2 * bins
}

pub(crate) fn store_frame(buf: &SeqBuffer, bins: &[Complex<f32>], peak: f32) {
    buf.write_with(|i| {
        if i == 0 {
            return peak;
        }
        let bin = bins.get((i - 1) / 2).copied().unwrap_or_default();
        if (i - 1) % 2 == 0 { bin.re } else { bin.im }
    });
}

pub(crate) fn load_frame(buf: &SeqBuffer, frame: &mut SpectrumFrame) {
    let n = (buf.len() - 1) / 2;
    if frame.bins.len() != n {
        frame.bins.resize(n, Complex::default());
    }
    let SpectrumFrame { bins, peak } = frame;
    buf.read_with(|j, v| {
        if j == 0 {
            *peak = v;
        } else if (j - 1) % 2 == 0 {
            bins[(j - 1) / 2].re = v;
        } else {
            bins[(j - 1) / 2].im = v;
        }
    });
}

/// Cursor state as seen by a reader at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySnapshot {
    /// Slot the next frame will be written to.
    pub next_index: usize,
    /// Slots that have been written at least once, capped at `capacity`.
    pub valid_count: usize,
    /// Frames ever published.
    pub total_writes: u64,
    pub capacity: usize,
}

impl HistorySnapshot {
    pub fn is_full(&self) -> bool { self.valid_count == self.capacity }

    /// Slot holding the most recent frame.
    pub fn newest(&self) -> Option<usize> {
        if self.valid_count == 0 {
            None
        } else {
            Some((self.next_index + self.capacity - 1) % self.capacity)
        }
    }

    /// Written slot indices, oldest frame first. Approximate if the writer
    /// moved on after the snapshot was taken.
    pub fn oldest_to_newest(&self) -> impl Iterator<Item = usize> {
        let start = if self.is_full() { self.next_index } else { 0 };
        let cap = self.capacity;
        (0..self.valid_count).map(move |k| (start + k) % cap)
    }
}

pub struct HistoryRing {
    bins: usize,
    slots: Box<[SeqBuffer]>,
    peaks: Box<[AtomicU32]>,
    next_index: AtomicUsize,
    valid_count: AtomicUsize,
    total_writes: AtomicU64,
}

impl HistoryRing {
    /// `capacity` silent frames of `bins` bins each. `capacity` must be
    /// non-zero.
    pub fn new(capacity: usize, bins: usize) -> HistoryRing {
        assert!(capacity > 0, "history capacity must be non-zero");
        HistoryRing {
            bins,
            slots: (0..capacity).map(|_| SeqBuffer::new(frame_len(bins))).collect(),
            peaks: (0..capacity).map(|_| AtomicU32::new(0f32.to_bits())).collect(),
            next_index: AtomicUsize::new(0),
            valid_count: AtomicUsize::new(0),
            total_writes: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize { self.slots.len() }

    pub fn bins(&self) -> usize { self.bins }

    /// Publish a frame. Only the capture stage calls this; never blocks,
    /// never allocates.
    pub(crate) fn write(&self, bins: &[Complex<f32>], peak: f32) {
        let cap = self.capacity();
        let idx = self.next_index.load(Ordering::Relaxed);

        store_frame(&self.slots[idx], bins, peak);
        self.peaks[idx].store(peak.to_bits(), Ordering::Release);

        self.total_writes.fetch_add(1, Ordering::Release);
        self.next_index.store((idx + 1) % cap, Ordering::Release);
        let valid = self.valid_count.load(Ordering::Relaxed);
        if valid < cap {
            self.valid_count.store(valid + 1, Ordering::Release);
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            next_index: self.next_index.load(Ordering::Acquire),
            valid_count: self.valid_count.load(Ordering::Acquire),
            total_writes: self.total_writes.load(Ordering::Acquire),
            capacity: self.capacity(),
        }
    }

    /// Copy slot `i` into `frame`, resizing it if needed. Returns false if
    /// `i` is out of range. The copy may be a frame from an earlier lap of
    /// the ring, but it is never a mix of two frames.
    pub fn read_slot(&self, i: usize, frame: &mut SpectrumFrame) -> bool {
        let Some(slot) = self.slots.get(i) else {
            return false;
        };
        load_frame(slot, frame);
        true
    }

    /// Allocating variant of [`read_slot`](Self::read_slot).
    pub fn frame_at(&self, i: usize) -> Option<SpectrumFrame> {
        let mut frame = SpectrumFrame::new(self.bins);
        self.read_slot(i, &mut frame).then_some(frame)
    }

    /// Peak magnitude recorded for slot `i`.
    pub fn peak_at(&self, i: usize) -> Option<f32> {
        self.peaks
            .get(i)
            .map(|p| f32::from_bits(p.load(Ordering::Acquire)))
    }

    /// Every slot's recorded peak, in slot order.
    pub fn peaks(&self) -> impl Iterator<Item = f32> + '_ {
        self.peaks
            .iter()
            .map(|p| f32::from_bits(p.load(Ordering::Acquire)))
    }
}
