use std::time::{Duration, Instant};
use std::{env, process, thread};

use log::{error, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use spectra::audio::{self, InputStream};
use spectra::config::{self, Command, Config, Display};
use spectra::view::{self, scope::Scope, spec::Spec, Reader, Toggles, View};
use spectra::{window, Error, PeakTracker, Pipeline, Result, SpectrumSource};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => (),
        Err(Error::Args(e)) => e.exit(),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    match config::parse_args(env::args_os())? {
        Command::ListWindows => {
            for name in window::windows().keys() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::ListDevices => audio::list_devices(),
        Command::Run { config, device, display } => visualize(&config, device.as_deref(), &display),
    }
}

fn visualize(config: &Config, device: Option<&str>, display: &Display) -> Result<()> {
    let (pipeline, capture) = Pipeline::new(config)?;
    info!(
        "{} samples/block ({:.1} ms deadline), {} bins of {:.1} Hz, {} frames of history, {} window",
        config.block_len,
        config.block_duration().as_secs_f64() * 1000.0,
        config.bins(),
        config.bin_frequency(1),
        config.capacity,
        config.window
    );

    let stream = InputStream::open(device, config, capture)?;

    let sdl = sdl2::init().map_err(view::video_err)?;
    let sdl_video = sdl.video().map_err(view::video_err)?;

    let scope_win = sdl_video.window("scope", display.width, display.height / 3)
        .position_centered()
        .resizable()
        .build().map_err(view::video_err)?;
    let mut scope = Scope::new(scope_win.into_canvas().build().map_err(view::video_err)?);

    let spec_win = sdl_video.window("spectrum", display.width, display.height)
        .position_centered()
        .resizable()
        .build().map_err(view::video_err)?;
    let mut spec = Spec::new(spec_win.into_canvas().build().map_err(view::video_err)?);

    let mut eloop = sdl.event_pump().map_err(view::video_err)?;
    let mut reader = Reader::new(&*pipeline);
    let mut toggles = Toggles::default();
    let rate = Duration::new(1, 0).div_f64(display.rate);
    let mut deadline;

    'main: loop {
        deadline = Instant::now() + rate;

        {
            let info = reader.poll(&*pipeline, toggles);
            scope.render(&info)?;
            spec.render(&info)?;
        }

        for event in eloop.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown { keycode: Some(Keycode::Q), .. }
                | Event::KeyDown { keycode: Some(Keycode::Escape), .. } => break 'main,
                Event::KeyDown { keycode: Some(Keycode::W), .. } => toggles.window = !toggles.window,
                Event::KeyDown { keycode: Some(Keycode::F), .. } => toggles.waterfall = !toggles.waterfall,
                Event::KeyDown { keycode: Some(Keycode::C), .. } => toggles.toggle_circle(),
                Event::KeyDown { keycode: Some(Keycode::S), .. } => toggles.toggle_sphere(),
                Event::KeyDown { keycode: Some(Keycode::R), .. } => toggles.rotate = !toggles.rotate,
                Event::KeyDown { keycode: Some(Keycode::A), .. } => {
                    toggles.peak_mode = toggles.peak_mode.toggled();
                    info!("peak mode: {:?}", toggles.peak_mode);
                }
                _ => (),
            }
        }

        let wait = deadline.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            thread::sleep(wait);
        }
    }

    // The audio thread must be gone before the pipeline it writes to.
    stream.close();
    info!(
        "analysed {} blocks ({} transform failures), loudest recent peak {:.3}",
        pipeline.blocks_analysed(),
        pipeline.transform_failures(),
        PeakTracker::new(pipeline.history()).max()
    );
    Ok(())
}
