//! Single-writer sequence-locked buffer of `f32`s.
//!
//! The writer bumps the sequence to an odd value, stores every element, then
//! bumps it to the next even value. A reader copies the elements between two
//! sequence loads and starts over if they differ or if a write was in
//! progress, so what it ends up with is always one complete write. The
//! writer never waits on readers.

use std::hint;
use std::sync::atomic::{fence, AtomicU32, AtomicUsize, Ordering};

pub struct SeqBuffer {
    seq: AtomicUsize,
    data: Box<[AtomicU32]>,
}

impl SeqBuffer {
    /// A buffer of `len` zeros.
    pub fn new(len: usize) -> SeqBuffer {
        SeqBuffer {
            seq: AtomicUsize::new(0),
            data: (0..len).map(|_| AtomicU32::new(0f32.to_bits())).collect(),
        }
    }

    pub fn len(&self) -> usize { self.data.len() }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Overwrite every element with `value(i)`.
    ///
    /// Must only be called from one thread at a time; the owning type
    /// enforces that by keeping the write side private.
    pub(crate) fn write_with(&self, mut value: impl FnMut(usize) -> f32) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);
        for (i, slot) in self.data.iter().enumerate() {
            slot.store(value(i).to_bits(), Ordering::Relaxed);
        }
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    pub(crate) fn write_from(&self, src: &[f32]) {
        debug_assert_eq!(src.len(), self.len());
        self.write_with(|i| src.get(i).copied().unwrap_or(0.0));
    }

    /// Visit every element of one complete write, in index order. `visit`
    /// may be called again from index 0 if a write raced the copy, so it
    /// must only store what it is given.
    pub fn read_with(&self, mut visit: impl FnMut(usize, f32)) {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 1 {
                hint::spin_loop();
                continue;
            }
            for (i, slot) in self.data.iter().enumerate() {
                visit(i, f32::from_bits(slot.load(Ordering::Relaxed)));
            }
            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return;
            }
            hint::spin_loop();
        }
    }

    /// Copy into `dst`, which must be at least `len()` long.
    pub fn read_into(&self, dst: &mut [f32]) {
        self.read_with(|i, v| {
            if let Some(d) = dst.get_mut(i) {
                *d = v;
            }
        });
    }
}
