use std::f32::consts::PI;

use rustfft::num_complex::Complex;

use super::{video_err, Info, View};
use crate::error::Result;

use sdl2::pixels::Color;
use sdl2::rect::Point;
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

/// Copies of the current circle making up the sphere.
const SPHERE_SLICES: usize = 128;
/// Per-refresh increments while rotating, in radians.
const SPIN_STEP: f32 = 0.002;
const TILT_STEP: f32 = 0.009;

/// Radial spectrum: each bin pushes the circle outwards by the square root
/// of its magnitude. The base radius swells with the peak. With the
/// waterfall on, the history ring is drawn as nested circles, oldest
/// innermost, or as sphere slices when the sphere is on.
pub struct Spec {
    pub view: Canvas<Window>,
    pub radius_base: f32,
    pub radius_factor: f32,
    pub bin_gain: f32,
    hue: f32,
    spin: f32,
    tilt: f32,
    points: Vec<Point>,
}

/// Place a point at `r`, `angle` on a circle tilted by `tilt` about the
/// horizontal axis, seen head on, then spun by `spin` about the view axis.
fn project(r: f32, angle: f32, tilt: f32, spin: f32) -> (f32, f32) {
    let x = r * angle.cos();
    let y = r * angle.sin() * tilt.cos();
    let (ss, cs) = spin.sin_cos();
    (x * cs - y * ss, x * ss + y * cs)
}

impl Spec {
    pub fn new(view: Canvas<Window>) -> Spec {
        Spec {
            view,
            radius_base: 1.0,
            radius_factor: 0.5,
            bin_gain: 10.0,
            hue: 0.0,
            spin: 0.0,
            tilt: 0.0,
            points: Vec::new(),
        }
    }

    fn color(&self, level: f32) -> Color {
        let c = self.hue;
        let chan = |phase: f32| (((phase.sin() + 1.0) / 2.0) * level * 255.0) as u8;
        Color::RGB(chan(c), chan(c * 2.0), chan(c + 0.5))
    }

    fn circle(&mut self, bins: &[Complex<f32>], radius: f32, scale: f32, tilt: f32) -> Result<()> {
        if bins.is_empty() {
            return Ok(());
        }
        let (width, height) = self.view.output_size().map_err(video_err)?;
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        // world units: about six either side of the centre
        let unit = width.min(height) as f32 / 12.0 * scale;
        let n = bins.len();
        let spin = self.spin;

        self.points.clear();
        self.points.extend((0..=n).map(|i| {
            let angle = 2.0 * PI * i as f32 / n as f32;
            let r = (self.bin_gain * bins[i % n].norm().sqrt() + radius) * unit;
            let (x, y) = project(r, angle, tilt, spin);
            Point::new((cx + x) as i32, (cy - y) as i32)
        }));
        self.view.draw_lines(&self.points[..]).map_err(video_err)
    }
}

impl View for Spec {
    fn render<'i, 'j: 'i>(&mut self, info: &'j Info<'i>) -> Result<()> {
        self.view.set_draw_color(Color::RGB(0, 0, 0));
        self.view.clear();
        self.view.set_blend_mode(BlendMode::Add);

        let toggles = info.toggles;
        if toggles.rotate {
            self.spin += SPIN_STEP;
            self.tilt += TILT_STEP;
        } else {
            self.spin = 0.0;
            self.tilt = 0.0;
        }

        let radius = self.radius_base + self.radius_factor * info.peak.sqrt();
        let count = info.history.len() as f32;
        if toggles.circle {
            if toggles.sphere && !info.history.is_empty() {
                for (k, frame) in info.history.iter().enumerate() {
                    let color = self.color((k + 1) as f32 / count);
                    self.view.set_draw_color(color);
                    self.circle(frame.bins(), radius, 1.0, self.tilt + PI * k as f32 / count)?;
                }
            } else if toggles.sphere {
                let color = self.color(1.0);
                self.view.set_draw_color(color);
                for k in 0..SPHERE_SLICES {
                    let tilt = self.tilt + 2.0 * PI * k as f32 / SPHERE_SLICES as f32;
                    self.circle(info.current.bins(), radius, 1.0, tilt)?;
                }
            } else if info.history.is_empty() {
                let color = self.color(1.0);
                self.view.set_draw_color(color);
                self.circle(info.current.bins(), radius, 1.0, self.tilt)?;
            } else {
                for (k, frame) in info.history.iter().enumerate() {
                    let depth = (k + 1) as f32 / count;
                    let color = self.color(depth);
                    self.view.set_draw_color(color);
                    self.circle(frame.bins(), radius, depth, self.tilt)?;
                }
            }
        }

        self.view.set_blend_mode(BlendMode::None);
        self.view.present();
        self.hue += 0.01;
        Ok(())
    }
}
