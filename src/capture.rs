//! Headless recording: PNG frames plus the stereo stream as a float WAV.
//!
//! Runs the same tick loop as the window, but as fast as the disk allows.
//! After every tick the feed is pulled for exactly the audio that a live
//! callback would have consumed during one tick interval.

use std::fs;
use std::path::Path;

use crate::audio::{frames_before_tick, AudioDoubleBuffer, RealtimeFeed};
use crate::engine::Kaleidosynth;
use crate::error::{Result, SynthError};
use crate::params::{RecordingConfig, Settings};
use crate::rendering::field_to_rgba8;

/// What a finished recording produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSummary {
    pub frames: usize,
    pub audio_frames: u64,
}

/// Record `recording.duration_secs` of output into `recording.output_dir`.
pub fn record(settings: &Settings, recording: &RecordingConfig) -> Result<CaptureSummary> {
    recording.validate().map_err(SynthError::Config)?;
    fs::create_dir_all(recording.frames_dir())?;

    let frame_len = settings.field.sample_count();
    let (writer, reader) = AudioDoubleBuffer::new(frame_len);
    let mut synth = Kaleidosynth::new(settings, writer)?;
    let mut feed = RealtimeFeed::new(reader, settings.audio.stereo);

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: settings.audio.sample_rate_hz,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut wav = hound::WavWriter::create(recording.audio_path(), spec)?;

    let total_frames = recording.total_frames();
    let (width, height) = (settings.field.width as u32, settings.field.height as u32);
    let mut pixels = Vec::new();
    let mut samples = Vec::new();
    let mut audio_written = 0u64;

    log::info!(
        "Recording {} frames ({:.1}s) to {}",
        total_frames,
        recording.duration_secs,
        recording.output_dir
    );

    for frame in 0..total_frames {
        synth.tick()?;

        field_to_rgba8(&synth.visual_field()?, &mut pixels);
        let frame_path = Path::new(&recording.frames_dir()).join(format!("frame_{:05}.png", frame));
        image::save_buffer(&frame_path, &pixels, width, height, image::ColorType::Rgba8)?;

        let due = frames_before_tick(frame as u64 + 1, settings.audio.sample_rate_hz, recording.fps);
        samples.resize(((due - audio_written) * 2) as usize, 0.0);
        feed.pull(&mut samples);
        for &sample in &samples {
            wav.write_sample(sample)?;
        }
        audio_written = due;

        if (frame + 1) % (recording.fps as usize).max(1) == 0 {
            log::debug!("Recorded {}/{} frames", frame + 1, total_frames);
        }
    }

    wav.finalize()?;
    log::info!(
        "Recording complete: {} frames, {} audio frames",
        total_frames,
        audio_written
    );

    Ok(CaptureSummary {
        frames: total_frames,
        audio_frames: audio_written,
    })
}
