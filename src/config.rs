//! Command line and the fixed parameters the pipeline is built from.

use std::ffi::OsString;
use std::str::FromStr;
use std::time::Duration;

use clap::{App, ArgMatches};

use crate::error::{Error, Result};
use crate::window;

pub const DEFAULT_BLOCK_LEN: usize = 512;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_HISTORY: usize = 255;

/// Analysis parameters. Fixed for the life of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub block_len: usize,
    pub sample_rate: u32,
    pub capacity: usize,
    pub window: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            block_len: DEFAULT_BLOCK_LEN,
            sample_rate: DEFAULT_SAMPLE_RATE,
            capacity: DEFAULT_HISTORY,
            window: window::DEFAULT_WINDOW.into(),
        }
    }
}

impl Config {
    pub fn new(block_len: usize, sample_rate: u32, capacity: usize) -> Result<Config> {
        Config {
            block_len,
            sample_rate,
            capacity,
            ..Config::default()
        }
        .validated()
    }

    pub fn with_window(mut self, name: &str) -> Result<Config> {
        self.window = name.into();
        self.validated()
    }

    pub fn validated(self) -> Result<Config> {
        if self.block_len < 4 || self.block_len % 2 != 0 {
            return Err(Error::InvalidConfig {
                name: "block length",
                value: self.block_len.to_string(),
                reason: "must be even and at least 4",
            });
        }
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfig {
                name: "sample rate",
                value: self.sample_rate.to_string(),
                reason: "must be positive",
            });
        }
        if self.capacity == 0 {
            return Err(Error::InvalidConfig {
                name: "history",
                value: self.capacity.to_string(),
                reason: "must hold at least one frame",
            });
        }
        if !window::windows().contains_key(self.window.as_str()) {
            return Err(Error::UnknownWindow(self.window));
        }
        Ok(self)
    }

    /// Bins per spectrum frame.
    pub fn bins(&self) -> usize { self.block_len / 2 }

    /// Playback time of one block: the capture stage's deadline.
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs_f64(self.block_len as f64 / self.sample_rate as f64)
    }

    /// Centre frequency of bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.sample_rate as f32 / self.block_len as f32
    }

    /// Bin nearest to `freq` Hz.
    pub fn bin_for(&self, freq: f32) -> usize {
        (freq * self.block_len as f32 / self.sample_rate as f32).round() as usize
    }
}

/// Viewer settings; only the binary uses these.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub rate: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ListDevices,
    ListWindows,
    Run {
        config: Config,
        device: Option<String>,
        display: Display,
    },
}

fn parse<T: FromStr>(matches: &ArgMatches, name: &'static str) -> Result<T> {
    let raw = matches.value_of(name).unwrap_or_default();
    raw.parse().map_err(|_| Error::InvalidConfig {
        name,
        value: raw.into(),
        reason: "not a number",
    })
}

/// Parse a command line (program name first).
pub fn parse_args<I, T>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parser_yaml = load_yaml!("args.yml");
    let parser = App::from_yaml(parser_yaml);
    let matches = parser.get_matches_from_safe(args)?;

    if matches.is_present("list-win") {
        return Ok(Command::ListWindows);
    }
    if matches.is_present("list-dev") {
        return Ok(Command::ListDevices);
    }

    let config = Config {
        block_len: parse(&matches, "block")?,
        sample_rate: parse(&matches, "aud-rate")?,
        capacity: parse(&matches, "history")?,
        window: matches.value_of("fft-win").unwrap_or(window::DEFAULT_WINDOW).into(),
    }
    .validated()?;

    let display = Display {
        rate: parse(&matches, "gfx-rate")?,
        width: parse(&matches, "width")?,
        height: parse(&matches, "height")?,
    };
    if !(display.rate.is_finite() && display.rate > 0.0) {
        return Err(Error::InvalidConfig {
            name: "refresh rate",
            value: display.rate.to_string(),
            reason: "must be positive",
        });
    }
    if display.width == 0 || display.height == 0 {
        return Err(Error::InvalidConfig {
            name: "window size",
            value: format!("{}x{}", display.width, display.height),
            reason: "must be non-zero",
        });
    }

    Ok(Command::Run {
        config,
        device: matches.value_of("aud-dev").map(String::from),
        display,
    })
}
