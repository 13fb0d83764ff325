//! Harmonic template bank: one frequency-domain mask per note of a key.
//!
//! A template lights up the note's base bin and its octave doublings, each
//! octave scaled by the configured ratio, then smears the spikes into
//! narrow bands with a short smoothing kernel. Masks span the full transform
//! and are mirrored onto the conjugate bins, so masking a real signal's
//! spectrum keeps the inverse transform real.

mod convolve;
mod key;

pub use convolve::convolve_in_place;
pub use key::{midi_to_hz, parse_pitch_class, Key, Scale, A4_HZ};

use crate::error::{Result, SynthError};
use crate::params::HarmonicParams;

/// Read-only mask for one note.
#[derive(Debug, Clone)]
pub struct HarmonicTemplate {
    fundamental_hz: f32,
    base_bin: usize,
    mask: Vec<f32>,
}

impl HarmonicTemplate {
    /// Build the mask for `fundamental_hz` over a `transform_len`-point transform.
    ///
    /// Bin rule: `base_bin = round((f / 2) · N / sample_rate)`, then each octave
    /// doubles the bin until `params.octaves` entries are placed or the
    /// Nyquist bin is passed. Octave `o` has amplitude `ratio^o`.
    pub fn build(
        fundamental_hz: f32,
        sample_rate_hz: f32,
        transform_len: usize,
        params: &HarmonicParams,
    ) -> Result<Self> {
        let half = transform_len / 2;
        let bins_per_hz = transform_len as f32 / sample_rate_hz;
        let base_bin = (fundamental_hz * 0.5 * bins_per_hz).round() as usize;
        if base_bin == 0 {
            return Err(SynthError::NoteBelowResolution {
                freq_hz: fundamental_hz,
                transform_len,
            });
        }

        let mut half_mask = vec![0.0f32; half + 1];
        let mut bin = base_bin;
        let mut amplitude = 1.0f32;
        for _ in 0..params.octaves {
            if bin > half {
                break;
            }
            half_mask[bin] = half_mask[bin].max(amplitude);
            amplitude *= params.octave_ratio;
            bin *= 2;
        }

        convolve_in_place(&mut half_mask, &params.smoothing_kernel);

        let mut mask = vec![0.0f32; transform_len];
        for (k, &value) in half_mask.iter().enumerate().take(transform_len) {
            mask[k] = value;
            let mirror = transform_len - k;
            if k > 0 && mirror != k && mirror < transform_len {
                mask[mirror] = value;
            }
        }

        Ok(Self {
            fundamental_hz,
            base_bin,
            mask,
        })
    }

    pub fn fundamental_hz(&self) -> f32 {
        self.fundamental_hz
    }

    /// Bin of the lowest (halved) partial
    pub fn base_bin(&self) -> usize {
        self.base_bin
    }

    pub fn mask(&self) -> &[f32] {
        &self.mask
    }
}

/// All templates for the configured key, indexed by scale degree.
#[derive(Debug, Clone, Default)]
pub struct TemplateBank {
    templates: Vec<HarmonicTemplate>,
}

impl TemplateBank {
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&HarmonicTemplate> {
        self.templates
            .get(index)
            .ok_or(SynthError::TemplateOutOfRange {
                index,
                len: self.templates.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &HarmonicTemplate> {
        self.templates.iter()
    }
}

/// Build one template per note frequency.
pub fn build_templates(
    note_frequencies: &[f32],
    sample_rate_hz: f32,
    transform_len: usize,
    params: &HarmonicParams,
) -> Result<TemplateBank> {
    let templates = note_frequencies
        .iter()
        .map(|&f| HarmonicTemplate::build(f, sample_rate_hz, transform_len, params))
        .collect::<Result<Vec<_>>>()?;
    log::debug!(
        "Built {} harmonic templates over {} bins",
        templates.len(),
        transform_len
    );
    Ok(TemplateBank { templates })
}
