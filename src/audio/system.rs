//! Audio device binding: a stereo `f32` output stream driven by the feed.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::feed::RealtimeFeed;
use crate::error::{Result, SynthError};
use crate::params::AudioParams;

/// Output stream that pulls from a [`RealtimeFeed`]
pub struct AudioSystem {
    /// Kept alive until shutdown; `None` once torn down
    stream: Option<cpal::Stream>,
}

impl AudioSystem {
    /// Open the default output device at the configured rate and start
    /// streaming. The feed moves into the callback.
    pub fn new(mut feed: RealtimeFeed, params: &AudioParams) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SynthError::Audio("No audio output device found".to_string()))?;

        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(params.sample_rate_hz),
            buffer_size: cpal::BufferSize::Default,
        };

        log::info!(
            "Audio: {} @ {}Hz, {} stereo",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            params.sample_rate_hz,
            feed.mode()
        );

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    feed.pull(data);
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| SynthError::Audio(format!("Failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| SynthError::Audio(format!("Failed to start audio stream: {}", e)))?;

        Ok(Self { stream: Some(stream) })
    }

    /// Pause the stream, then drop it. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::warn!("Failed to pause audio stream: {}", e);
            }
            drop(stream);
            log::info!("Audio stream stopped");
        }
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}
