use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use spectra::{Config, PeakMode, Pipeline, SpectrumFrame, SpectrumSource};

fn tone(n: usize, freq: f32, rate: f32) -> Vec<f32> {
    (0..n).map(|i| (2.0 * PI * freq * i as f32 / rate).sin()).collect()
}

#[test]
fn silent_history_then_tone() {
    let config = Config::new(512, 44100, 255).unwrap();
    let (pipeline, mut capture) = Pipeline::new(&config).unwrap();

    let silence = vec![0f32; 512];
    let mut out = vec![1f32; 512];
    for _ in 0..255 {
        capture.process(&silence, &mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    let snap = pipeline.snapshot();
    assert_eq!(snap.valid_count, 255);
    assert_eq!(snap.next_index, 0);
    assert_eq!(snap.total_writes, 255);

    let mut frame = SpectrumFrame::new(0);
    for i in 0..255 {
        assert!(pipeline.history().read_slot(i, &mut frame));
        assert_eq!(frame.len(), 256);
        assert!(frame.is_silent(), "slot {} not silent", i);
        assert_eq!(pipeline.history().peak_at(i), Some(0.0));
    }
    assert_eq!(pipeline.peak(PeakMode::Average), 0.0);

    capture.process(&tone(512, 1000.0, 44100.0), &mut out);

    let snap = pipeline.snapshot();
    assert_eq!(snap.valid_count, 255);
    assert_eq!(snap.next_index, 1);
    assert_eq!(snap.newest(), Some(0));

    assert!(pipeline.history().read_slot(0, &mut frame));
    assert_eq!(frame.dominant_bin(), Some(config.bin_for(1000.0)));
    assert_eq!(frame.dominant_bin(), Some(12));
    assert!(frame.peak_magnitude() > 0.0);

    let instant = pipeline.peak(PeakMode::Instant);
    assert_eq!(instant, frame.peak_magnitude());
    let average = pipeline.peak(PeakMode::Average);
    assert!((average - instant / 255.0).abs() < 1e-4);

    // the rest of the ring still holds the silent era
    assert!(pipeline.history().frame_at(1).unwrap().is_silent());
    assert!(pipeline.history().frame_at(254).unwrap().is_silent());
}

#[test]
fn average_peak_ramps_up_during_warm_up() {
    let config = Config::new(64, 8000, 4).unwrap();
    let (pipeline, mut capture) = Pipeline::new(&config).unwrap();
    let mut out = vec![0f32; 64];

    capture.process(&tone(64, 1000.0, 8000.0), &mut out);
    let first = pipeline.peak(PeakMode::Instant);
    assert!((pipeline.peak(PeakMode::Average) - first / 4.0).abs() < 1e-6);

    let quiet: Vec<f32> = tone(64, 1000.0, 8000.0).iter().map(|s| s * 0.5).collect();
    capture.process(&quiet, &mut out);
    let second = pipeline.peak(PeakMode::Instant);
    assert!((second - first / 2.0).abs() < 1e-4);
    assert_eq!(pipeline.snapshot().valid_count, 2);
    assert!((pipeline.peak(PeakMode::Average) - (first + second) / 4.0).abs() < 1e-6);
}

#[test]
fn renderer_reads_while_audio_thread_writes() {
    let config = Config::new(256, 44100, 16).unwrap();
    let (pipeline, mut capture) = Pipeline::new(&config).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let pipeline = pipeline.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut frame = SpectrumFrame::new(0);
            let mut polls = 0u32;
            while !done.load(Ordering::Acquire) || polls == 0 {
                let snap = pipeline.snapshot();
                for i in snap.oldest_to_newest() {
                    assert!(pipeline.history().read_slot(i, &mut frame));
                    // frames are published whole: the stored peak always
                    // matches the bins it came with
                    let recomputed = frame.magnitudes().fold(0f32, f32::max);
                    assert_eq!(frame.peak_magnitude(), recomputed);
                }
                pipeline.current_frame(&mut frame);
                assert_eq!(frame.len(), 128);
                polls += 1;
            }
            polls
        })
    };

    let mut out = vec![0f32; 256];
    for n in 0..2000 {
        let freq = 200.0 + (n % 40) as f32 * 250.0;
        capture.process(&tone(256, freq, 44100.0), &mut out);
    }
    done.store(true, Ordering::Release);

    assert!(reader.join().unwrap() > 0);
    assert_eq!(pipeline.blocks_analysed(), 2000);
    assert_eq!(pipeline.snapshot().next_index, 2000 % 16);
}
