use crate::history::HistoryRing;

/// How a renderer wants the peak presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakMode {
    /// Peak of the newest published frame.
    #[default]
    Instant,
    /// Mean of the peak history over every slot.
    Average,
}

impl PeakMode {
    pub fn toggled(self) -> PeakMode {
        match self {
            PeakMode::Instant => PeakMode::Average,
            PeakMode::Average => PeakMode::Instant,
        }
    }
}

/// Read-only peak view over a [`HistoryRing`]'s peak history.
#[derive(Clone, Copy)]
pub struct PeakTracker<'r> {
    ring: &'r HistoryRing,
}

impl<'r> PeakTracker<'r> {
    pub fn new(ring: &'r HistoryRing) -> PeakTracker<'r> {
        PeakTracker { ring }
    }

    /// Peak of the most recently published frame, 0 before the first one.
    pub fn current(&self) -> f32 {
        self.ring
            .snapshot()
            .newest()
            .and_then(|i| self.ring.peak_at(i))
            .unwrap_or(0.0)
    }

    /// Mean peak over all `capacity` slots. Slots not yet written hold 0,
    /// so the average ramps up while the ring fills.
    pub fn average(&self) -> f32 {
        let sum: f32 = self.ring.peaks().sum();
        sum / self.ring.capacity() as f32
    }

    /// Largest peak still held in the history.
    pub fn max(&self) -> f32 {
        let valid = self.ring.snapshot().valid_count;
        self.ring.peaks().take(valid).fold(0f32, f32::max)
    }

    pub fn value(&self, mode: PeakMode) -> f32 {
        match mode {
            PeakMode::Instant => self.current(),
            PeakMode::Average => self.average(),
        }
    }
}
