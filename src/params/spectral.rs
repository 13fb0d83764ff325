//! Harmonic template and spectral masking parameters.
//!
//! The octave ratio and kernel constants were tuned by ear; they are knobs, not a
//! single correct musical mapping.

use crate::harmonic::{Key, Scale};

/// 7-tap Gaussian-like smoothing kernel (sums to ~1)
pub const DEFAULT_SMOOTHING_KERNEL: [f32; 7] = [0.006, 0.061, 0.242, 0.382, 0.242, 0.061, 0.006];

/// How harmonic templates are derived from a key
#[derive(Debug, Clone)]
pub struct HarmonicParams {
    /// Key whose notes each get a template
    pub key: Key,

    /// Octave of the key's notes (scientific pitch, 4 = middle C octave)
    pub octave: i32,

    /// Maximum number of octave partials per template (base bin included)
    pub octaves: usize,

    /// Per-octave amplitude ratio: partial `o` has amplitude `ratio^o`.
    /// Below 1 the upper octaves fade, above 1 they grow.
    pub octave_ratio: f32,

    /// Smoothing kernel applied to the half spectrum
    pub smoothing_kernel: Vec<f32>,
}

impl Default for HarmonicParams {
    fn default() -> Self {
        Self {
            key: Key::new(0, Scale::Major),
            octave: 4,
            octaves: 6,
            octave_ratio: 1.0 / 1.5,
            smoothing_kernel: DEFAULT_SMOOTHING_KERNEL.to_vec(),
        }
    }
}

impl HarmonicParams {
    pub fn note_frequencies(&self) -> Vec<f32> {
        self.key.note_frequencies(self.octave)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.octaves == 0 {
            return Err("Template octave count must be > 0".to_string());
        }
        if !(self.octave_ratio > 0.0) || !self.octave_ratio.is_finite() {
            return Err(format!(
                "Octave ratio must be finite and > 0, got {}",
                self.octave_ratio
            ));
        }
        if self.smoothing_kernel.is_empty() {
            return Err("Smoothing kernel must have at least one tap".to_string());
        }
        if self.smoothing_kernel.len() % 2 == 0 {
            return Err(format!(
                "Smoothing kernel must have an odd tap count, got {}",
                self.smoothing_kernel.len()
            ));
        }
        Ok(())
    }
}

/// Frequency-domain masking behaviour
#[derive(Debug, Clone, Default)]
pub struct SpectralParams {
    /// Zero every bin further than this from DC (None = no bandpass)
    pub bandpass_cutoff: Option<usize>,

    /// Apply the cutoff even when no template is selected
    pub cutoff_in_passthrough: bool,

    /// Scale the imaginary component by the mask as well as the real one
    pub mask_imaginary: bool,
}
