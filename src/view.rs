//! SDL renderer. Everything here reads through [`SpectrumSource`] on the
//! display thread; nothing it does can hold up the capture stage.

pub mod scope;
pub mod spec;

use crate::error::{Error, Result};
use crate::frame::SpectrumFrame;
use crate::peak::PeakMode;
use crate::pipeline::SpectrumSource;

/// Display switches flipped from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub window: bool,
    pub waterfall: bool,
    pub circle: bool,
    pub sphere: bool,
    pub rotate: bool,
    pub peak_mode: PeakMode,
}

impl Default for Toggles {
    fn default() -> Toggles {
        Toggles {
            window: false,
            waterfall: false,
            circle: true,
            sphere: false,
            rotate: false,
            peak_mode: PeakMode::default(),
        }
    }
}

impl Toggles {
    /// Hiding or showing the circle always drops the sphere.
    pub fn toggle_circle(&mut self) {
        self.circle = !self.circle;
        self.sphere = false;
    }

    /// The sphere is made of circles, so turning it on shows them.
    pub fn toggle_sphere(&mut self) {
        self.sphere = !self.sphere;
        self.circle = true;
    }
}

/// One display frame's worth of data, already copied out of the pipeline.
pub struct Info<'i> {
    pub samples: &'i [f32],
    pub window: &'i [f32],
    pub current: &'i SpectrumFrame,
    /// History frames, oldest first. Empty unless the waterfall is on.
    pub history: &'i [SpectrumFrame],
    pub peak: f32,
    pub toggles: Toggles,
}

pub trait View {
    fn render<'i, 'j: 'i>(&mut self, info: &'j Info<'i>) -> Result<()>;
}

/// Buffers the display thread copies into, reused from one refresh to the
/// next.
pub struct Reader {
    samples: Vec<f32>,
    current: SpectrumFrame,
    history: Vec<SpectrumFrame>,
    count: usize,
}

impl Reader {
    pub fn new<S: SpectrumSource + ?Sized>(source: &S) -> Reader {
        let bins = source.history().bins();
        Reader {
            samples: vec![0.0; source.config().block_len],
            current: SpectrumFrame::new(bins),
            history: vec![SpectrumFrame::new(bins); source.history().capacity()],
            count: 0,
        }
    }

    pub fn poll<'a, S: SpectrumSource + ?Sized>(&'a mut self, source: &'a S, toggles: Toggles) -> Info<'a> {
        source.latest_samples(&mut self.samples);
        source.current_frame(&mut self.current);

        self.count = 0;
        if toggles.waterfall {
            let snap = source.snapshot();
            for (k, i) in snap.oldest_to_newest().enumerate() {
                source.history().read_slot(i, &mut self.history[k]);
                self.count = k + 1;
            }
        }

        Info {
            samples: &self.samples,
            window: source.window(),
            current: &self.current,
            history: &self.history[..self.count],
            peak: source.peak(toggles.peak_mode),
            toggles,
        }
    }
}

pub fn video_err(e: impl ToString) -> Error {
    Error::Video(e.to_string())
}

pub(crate) fn normalize_centered(samp: f32, height: u32) -> i32 {
    let hh = height / 2;
    hh as i32 - (hh as f32 * samp) as i32
}
