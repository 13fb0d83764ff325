//! Field geometry, display and recording configuration.

/// Shape and refresh rate of the generated field
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Field width (pixels, one network batch row per pixel)
    pub width: usize,

    /// Field height (pixels)
    pub height: usize,

    /// Channels per pixel: 1 (luminance) or 3 (RGB)
    pub channels: usize,

    /// Tick rate (frames per second)
    pub fps: u32,

    /// Window size as a multiple of the field size
    pub window_scale: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            channels: 3,
            fps: 12,
            window_scale: 2.5,
        }
    }
}

impl FieldConfig {
    /// Pixels per field (= network batch size)
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Samples per field (= spectral transform length = audio frame length)
    pub fn sample_count(&self) -> usize {
        self.pixel_count() * self.channels
    }

    pub fn window_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.window_scale).round() as u32,
            (self.height as f32 * self.window_scale).round() as u32,
        )
    }

    /// Validate configuration (channels must be 1 or 3, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Field must be non-empty, got {}x{}",
                self.width, self.height
            ));
        }
        if self.channels != 1 && self.channels != 3 {
            return Err(format!("Channels must be 1 or 3, got {}", self.channels));
        }
        if self.fps == 0 {
            return Err("FPS must be > 0".to_string());
        }
        if !(self.window_scale > 0.0) {
            return Err(format!("Window scale must be > 0, got {}", self.window_scale));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames and audio
    pub output_dir: String,

    /// Frame rate (FPS), matches the field tick rate
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32, fps: u32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Audio file path
    pub fn audio_path(&self) -> String {
        format!("{}/audio.wav", self.output_dir)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.duration_secs > 0.0) {
            return Err(format!(
                "Recording duration must be > 0, got {}",
                self.duration_secs
            ));
        }
        Ok(())
    }
}
