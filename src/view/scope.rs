use super::{normalize_centered, video_err, Info, View};
use crate::error::Result;

use sdl2::pixels::Color;
use sdl2::rect::Point;
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

/// Waveform of the latest block, with the window shape overlaid on demand.
pub struct Scope {
    pub view: Canvas<Window>,
    /// Vertical gain applied to samples.
    pub gain: f32,
    points: Vec<Point>,
}

impl Scope {
    pub fn new(view: Canvas<Window>) -> Scope {
        Scope { view, gain: 5.0, points: Vec::new() }
    }

    fn trace(&mut self, data: &[f32], gain: f32, color: Color) -> Result<()> {
        let (width, height) = self.view.output_size().map_err(video_err)?;
        if data.len() < 2 {
            return Ok(());
        }
        let xinc = width as f32 / (data.len() - 1) as f32;
        self.points.clear();
        self.points.extend(data.iter().enumerate().map(|(i, &samp)| {
            Point::new((i as f32 * xinc) as i32, normalize_centered(samp * gain, height))
        }));
        self.view.set_draw_color(color);
        self.view.draw_lines(&self.points[..]).map_err(video_err)
    }
}

impl View for Scope {
    fn render<'i, 'j: 'i>(&mut self, info: &'j Info<'i>) -> Result<()> {
        self.view.set_draw_color(Color::RGB(0, 0, 0));
        self.view.clear();
        self.view.set_blend_mode(BlendMode::Add);

        if info.toggles.window {
            // the window spans 0..1; draw it over the top half
            self.trace(info.window, 1.0, Color::RGB(63, 63, 0))?;
        }
        let clipped = info.samples.iter().any(|s| s.abs() > 1.0);
        let color = if clipped { Color::RGB(255, 0, 0) } else { Color::RGB(255, 255, 255) };
        self.trace(info.samples, self.gain, color)?;

        self.view.set_blend_mode(BlendMode::None);
        self.view.present();
        Ok(())
    }
}
