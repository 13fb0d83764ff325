//! Command-line argument parsing.

use clap::Parser;

use crate::audio::StereoMode;
use crate::error::{Result, SynthError};
use crate::harmonic::{parse_pitch_class, Key, Scale};
use crate::network::Activation;
use crate::params::{RecordingConfig, Settings};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Kaleidosynth")]
#[command(about = "A seeded CPPN painted on screen and played as sound", long_about = None)]
pub struct Args {
    /// Field width (pixels)
    #[arg(long, default_value_t = 320)]
    pub width: usize,

    /// Field height (pixels)
    #[arg(long, default_value_t = 240)]
    pub height: usize,

    /// Channels per pixel: 1 (grayscale) or 3 (RGB)
    #[arg(long, default_value_t = 3)]
    pub channels: usize,

    /// Tick rate (frames per second)
    #[arg(long, default_value_t = 12)]
    pub fps: u32,

    /// Window size as a multiple of the field size
    #[arg(long, value_name = "FACTOR", default_value_t = 2.5)]
    pub window_scale: f32,

    /// Hidden layer widths, comma separated
    #[arg(long, value_delimiter = ',', default_value = "16,16")]
    pub hidden: Vec<usize>,

    /// Activation: sigmoid, gaussian, tanh, relu
    #[arg(long, default_value_t = Activation::Sigmoid)]
    pub activation: Activation,

    /// Standard deviation of the weight fill
    #[arg(long, default_value_t = 0.5)]
    pub sigma: f32,

    /// RNG seed (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Seconds of playback per unit of the time coordinate
    #[arg(long, value_name = "SECONDS", default_value_t = 3.0)]
    pub period: f32,

    /// Key root pitch class (C, C#, Db, ... B)
    #[arg(long, default_value = "C")]
    pub key: String,

    /// Scale: major, minor, pentatonic, chromatic
    #[arg(long, default_value = "major")]
    pub scale: String,

    /// Octave of the key's notes
    #[arg(long, default_value_t = 4)]
    pub octave: i32,

    /// Octave partials per harmonic template
    #[arg(long, default_value_t = 6)]
    pub octaves: usize,

    /// Amplitude ratio between successive octave partials (> 0)
    #[arg(long, default_value_t = 1.0 / 1.5)]
    pub octave_ratio: f32,

    /// Zero every bin further than this from DC
    #[arg(long, value_name = "BINS")]
    pub cutoff: Option<usize>,

    /// Apply the cutoff even with no template selected
    #[arg(long)]
    pub cutoff_always: bool,

    /// Mask the imaginary part of each bin as well as the real part
    #[arg(long)]
    pub mask_imaginary: bool,

    /// Output sample rate (Hz)
    #[arg(long, value_name = "HZ", default_value_t = 44100)]
    pub sample_rate: u32,

    /// Stereo layout: interleaved or duplicated
    #[arg(long, default_value_t = StereoMode::Interleaved)]
    pub stereo: StereoMode,

    /// Start with the melody overlay on
    #[arg(long)]
    pub melody: bool,

    /// Start with the percussion overlay on
    #[arg(long)]
    pub percussion: bool,

    /// Percussion tempo (beats per minute)
    #[arg(long, default_value_t = 120.0)]
    pub bpm: f32,

    /// Record to PNG frames and a WAV file instead of opening a window (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Recording output directory
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output_dir: String,
}

impl Args {
    /// Map the flags onto validated settings
    pub fn to_settings(&self) -> Result<Settings> {
        let root = parse_pitch_class(&self.key).map_err(SynthError::Config)?;
        let scale: Scale = self.scale.parse().map_err(SynthError::Config)?;

        let mut settings = Settings::default();

        settings.field.width = self.width;
        settings.field.height = self.height;
        settings.field.channels = self.channels;
        settings.field.fps = self.fps;
        settings.field.window_scale = self.window_scale;

        settings.network.hidden_layers = self.hidden.clone();
        settings.network.activation = self.activation;
        settings.network.init_sigma = self.sigma;
        settings.network.seed = self.seed;
        settings.network.time_period_s = self.period;

        settings.harmonic.key = Key::new(root, scale);
        settings.harmonic.octave = self.octave;
        settings.harmonic.octaves = self.octaves;
        settings.harmonic.octave_ratio = self.octave_ratio;

        settings.spectral.bandpass_cutoff = self.cutoff;
        settings.spectral.cutoff_in_passthrough = self.cutoff_always;
        settings.spectral.mask_imaginary = self.mask_imaginary;

        settings.audio.sample_rate_hz = self.sample_rate;
        settings.audio.stereo = self.stereo;

        settings.overlay.melody_enabled = self.melody;
        settings.overlay.percussion_enabled = self.percussion;
        settings.overlay.percussion_bpm = self.bpm;

        settings.validate()?;
        Ok(settings)
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(|duration| {
            let mut config = RecordingConfig::new(duration, self.fps);
            config.output_dir = self.output_dir.clone();
            config
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_to_default_settings() {
        let args = Args::parse_from(["kaleidosynth"]);
        let settings = args.to_settings().unwrap();
        assert_eq!(settings.field.sample_count(), 320 * 240 * 3);
        assert_eq!(settings.network.hidden_layers, vec![16, 16]);
        assert_eq!(settings.harmonic.key, Key::new(0, Scale::Major));
        assert!(args.recording_config().is_none());
    }

    #[test]
    fn test_flags_override() {
        let args = Args::parse_from([
            "kaleidosynth",
            "--hidden",
            "8,4,2",
            "--activation",
            "tanh",
            "--key",
            "F#",
            "--scale",
            "minor",
            "--stereo",
            "duplicated",
            "--cutoff",
            "500",
            "--record",
            "2",
            "--fps",
            "10",
            "--octave-ratio",
            "2",
        ]);
        let settings = args.to_settings().unwrap();
        assert_eq!(settings.network.hidden_layers, vec![8, 4, 2]);
        assert_eq!(settings.network.activation, Activation::Tanh);
        assert_eq!(settings.harmonic.key, Key::new(6, Scale::Minor));
        assert_eq!(settings.audio.stereo, StereoMode::Duplicated);
        assert_eq!(settings.spectral.bandpass_cutoff, Some(500));
        assert_eq!(settings.harmonic.octave_ratio, 2.0);

        let recording = args.recording_config().unwrap();
        assert_eq!(recording.total_frames(), 20);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let args = Args::parse_from(["kaleidosynth", "--channels", "2"]);
        assert!(matches!(args.to_settings(), Err(SynthError::Config(_))));

        let args = Args::parse_from(["kaleidosynth", "--octave-ratio", "0"]);
        assert!(matches!(args.to_settings(), Err(SynthError::Config(_))));

        let args = Args::parse_from(["kaleidosynth", "--key", "H"]);
        assert!(args.to_settings().is_err());

        assert!(Args::try_parse_from(["kaleidosynth", "--activation", "softmax"]).is_err());
    }
}
