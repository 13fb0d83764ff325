//! Parameter definitions with units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Units (pixels, Hz, seconds, ticks)
//! - Documented ranges and meanings
//! - A `validate()` check per concern

mod audio;
mod network;
mod render;
mod spectral;

// Re-export all types
pub use audio::{AudioParams, OverlayParams};
pub use network::{NetworkParams, INPUT_FEATURES};
pub use render::{FieldConfig, RecordingConfig};
pub use spectral::{HarmonicParams, SpectralParams, DEFAULT_SMOOTHING_KERNEL};

use crate::error::SynthError;

/// Every configuration concern in one place
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub field: FieldConfig,
    pub network: NetworkParams,
    pub harmonic: HarmonicParams,
    pub spectral: SpectralParams,
    pub overlay: OverlayParams,
    pub audio: AudioParams,
}

impl Settings {
    /// Validate all concerns together
    pub fn validate(&self) -> Result<(), SynthError> {
        self.field
            .validate()
            .and_then(|_| self.network.validate())
            .and_then(|_| self.harmonic.validate())
            .and_then(|_| self.overlay.validate())
            .and_then(|_| self.audio.validate())
            .map_err(SynthError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_field_sizes() {
        let field = FieldConfig::default();
        assert_eq!(field.pixel_count(), 320 * 240);
        assert_eq!(field.sample_count(), 320 * 240 * 3);
        assert_eq!(field.window_size(), (800, 600));
    }

    #[test]
    fn test_invalid_channels() {
        let mut settings = Settings::default();
        settings.field.channels = 4;
        assert!(matches!(settings.validate(), Err(SynthError::Config(_))));
    }

    #[test]
    fn test_invalid_octave_ratio_and_kernel() {
        for ratio in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let mut settings = Settings::default();
            settings.harmonic.octave_ratio = ratio;
            assert!(settings.validate().is_err(), "ratio {ratio}");
        }

        let mut settings = Settings::default();
        settings.harmonic.octave_ratio = 2.0;
        assert!(settings.validate().is_ok());

        let mut settings = Settings::default();
        settings.harmonic.smoothing_kernel = vec![0.5, 0.5];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_layer_widths() {
        let params = NetworkParams {
            hidden_layers: vec![8, 4],
            ..NetworkParams::default()
        };
        assert_eq!(params.layer_widths(3), vec![3, 8, 4, 3]);
    }

    #[test]
    fn test_recording_frames() {
        let config = RecordingConfig::new(2.5, 12);
        assert_eq!(config.total_frames(), 30);
        assert_eq!(config.audio_path(), "recording/audio.wav");
    }
}
