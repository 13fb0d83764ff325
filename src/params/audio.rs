//! Audio output and overlay configuration.

use crate::audio::StereoMode;

/// Audio output configuration
#[derive(Debug, Clone)]
pub struct AudioParams {
    /// Output sample rate (Hz)
    pub sample_rate_hz: u32,

    /// How mono field samples are laid onto the stereo stream
    pub stereo: StereoMode,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            stereo: StereoMode::Interleaved,
        }
    }
}

impl AudioParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        Ok(())
    }
}

/// Melody and percussion overlays mixed into the resynthesised stream
#[derive(Debug, Clone)]
pub struct OverlayParams {
    /// Start with the melody overlay enabled
    pub melody_enabled: bool,

    /// Peak amplitude of the injected melody partial
    pub melody_gain: f32,

    /// Ticks between melody note changes
    pub melody_step_ticks: u32,

    /// Start with the percussion overlay enabled
    pub percussion_enabled: bool,

    /// Peak amplitude of each kick
    pub percussion_gain: f32,

    /// Kick tempo (beats per minute of playback)
    pub percussion_bpm: f32,

    /// Kick amplitude e-folding time (seconds)
    pub percussion_decay_s: f32,

    /// Kick body pitch (Hz)
    pub percussion_pitch_hz: f32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            melody_enabled: false,
            melody_gain: 0.05,
            melody_step_ticks: 6,
            percussion_enabled: false,
            percussion_gain: 0.2,
            percussion_bpm: 120.0,
            percussion_decay_s: 0.08,
            percussion_pitch_hz: 55.0,
        }
    }
}

impl OverlayParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.melody_step_ticks == 0 {
            return Err("Melody step must be at least one tick".to_string());
        }
        if !(self.percussion_bpm > 0.0) {
            return Err(format!("Percussion BPM must be > 0, got {}", self.percussion_bpm));
        }
        if !(self.percussion_decay_s > 0.0) {
            return Err(format!(
                "Percussion decay must be > 0, got {}",
                self.percussion_decay_s
            ));
        }
        Ok(())
    }
}
