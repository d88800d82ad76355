//! Input device boundary: finds a device, opens a stream at the configured
//! rate and block size, and hands every host buffer to the capture stage.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, FromSample, Sample, SampleFormat, SampleRate, SizedSample, Stream,
    StreamConfig, SupportedBufferSize,
};
use log::{info, warn};

use crate::capture::CaptureStage;
use crate::config::Config;
use crate::error::{Error, Result};

fn device_err(e: impl std::fmt::Display) -> Error {
    Error::Device(e.to_string())
}

/// Print the input devices the default host can see.
pub fn list_devices() -> Result<()> {
    let host = cpal::default_host();
    for (idx, dev) in host.input_devices().map_err(device_err)?.enumerate() {
        let name = dev.name().unwrap_or_else(|_| "(unnamed)".into());
        match dev.default_input_config() {
            Ok(cfg) => println!(
                "{}: {} (default {} Hz, {} channels, {:?})",
                idx, name, cfg.sample_rate().0, cfg.channels(), cfg.sample_format()
            ),
            Err(_) => eprintln!("{}: {} (error querying default config)", idx, name),
        }
    }
    Ok(())
}

fn find_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    match name {
        Some(devname) => host
            .input_devices()
            .map_err(device_err)?
            .find(|dev| dev.name().map(|n| n == devname).unwrap_or(false))
            .ok_or_else(|| Error::DeviceNotFound(devname.into())),
        None => host.default_input_device().ok_or(Error::NoDevice),
    }
}

/// Sample formats [`InputStream::open`] can build a stream for.
fn capturable(fmt: SampleFormat) -> bool {
    matches!(fmt, SampleFormat::F32 | SampleFormat::I16 | SampleFormat::I32 | SampleFormat::U16)
}

/// Prefer a mono configuration at the requested rate; otherwise take the
/// device default's channel count and sample format. A fixed period of one
/// block is requested only where the host advertises it; elsewhere the
/// capture stage regroups whatever arrives into whole blocks.
fn choose_config(device: &Device, config: &Config) -> Result<(StreamConfig, SampleFormat)> {
    let rate = SampleRate(config.sample_rate);
    let period = config.block_len as u32;
    let mut fixed = false;
    let mut fallback = None;
    for range in device.supported_input_configs().map_err(device_err)? {
        if range.min_sample_rate() > rate || range.max_sample_rate() < rate {
            continue;
        }
        let fmt = range.sample_format();
        if !capturable(fmt) {
            continue;
        }
        let fits = match range.buffer_size() {
            SupportedBufferSize::Range { min, max } => (*min..=*max).contains(&period),
            SupportedBufferSize::Unknown => false,
        };
        if range.channels() == 1 {
            fallback = Some((1, fmt));
            fixed = fits;
            break;
        }
        if fallback.is_none() {
            fallback = Some((range.channels(), fmt));
            fixed = fits;
        }
    }

    let (channels, fmt) = match fallback {
        Some(found) => found,
        None => {
            let def = device.default_input_config().map_err(device_err)?;
            if def.sample_rate() != rate {
                return Err(Error::Device(format!(
                    "{} Hz not supported (device default is {} Hz)",
                    config.sample_rate,
                    def.sample_rate().0
                )));
            }
            (def.channels(), def.sample_format())
        }
    };

    Ok((
        StreamConfig {
            channels,
            sample_rate: rate,
            buffer_size: if fixed { BufferSize::Fixed(period) } else { BufferSize::Default },
        },
        fmt,
    ))
}

/// Host frames converted per pass through the scratch buffer.
const SCRATCH_FRAMES: usize = 1024;

/// Convert one host buffer of interleaved samples to `f32` through
/// `scratch` and hand it to the capture stage, which does the downmix.
/// `scratch.len()` must be a multiple of `channels`; it is never resized.
fn forward<T>(capture: &mut CaptureStage, scratch: &mut [f32], data: &[T], channels: usize)
where
    T: Sample,
    f32: FromSample<T>,
{
    for chunk in data.chunks(scratch.len()) {
        let buf = &mut scratch[..chunk.len()];
        for (dst, &src) in buf.iter_mut().zip(chunk) {
            *dst = f32::from_sample(src);
        }
        capture.push_interleaved(buf, channels);
    }
}

fn build_stream<T>(device: &Device, config: &StreamConfig, mut capture: CaptureStage) -> Result<Stream>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let mut scratch = vec![0f32; SCRATCH_FRAMES * channels];
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                forward(&mut capture, &mut scratch, data, channels)
            },
            |err| warn!("input stream: {}", err),
            None,
        )
        .map_err(device_err)
}

/// A running input stream. Dropping it stops the audio thread, after which
/// the capture stage it owned is released.
pub struct InputStream {
    stream: Stream,
    pub device: String,
    pub config: StreamConfig,
}

impl InputStream {
    pub fn open(device: Option<&str>, config: &Config, capture: CaptureStage) -> Result<InputStream> {
        let dev = find_device(device)?;
        let name = dev.name().unwrap_or_else(|_| "(unnamed)".into());
        let (stream_config, fmt) = choose_config(&dev, config)?;

        let stream = match fmt {
            SampleFormat::F32 => build_stream::<f32>(&dev, &stream_config, capture)?,
            SampleFormat::I16 => build_stream::<i16>(&dev, &stream_config, capture)?,
            SampleFormat::I32 => build_stream::<i32>(&dev, &stream_config, capture)?,
            SampleFormat::U16 => build_stream::<u16>(&dev, &stream_config, capture)?,
            other => return Err(Error::Device(format!("unsupported sample format {:?}", other))),
        };
        stream.play().map_err(device_err)?;

        info!(
            "capturing from {:?}: {} Hz, {} channel(s), {:?}, buffer {:?}",
            name, config.sample_rate, stream_config.channels, fmt, stream_config.buffer_size
        );
        Ok(InputStream { stream, device: name, config: stream_config })
    }

    /// Stop the stream and wait for the callback to be torn down.
    pub fn close(self) {
        if let Err(e) = self.stream.pause() {
            warn!("pausing input stream: {}", e);
        }
        drop(self.stream);
    }
}
