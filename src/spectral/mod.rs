//! Spectral resynthesis: FFT, harmonic mask, inverse FFT, normalisation.
//!
//! The pipeline owns its FFT plans and every buffer it touches, so a tick
//! performs no allocation. The caller hands in the flat field and gets the
//! resynthesised signal back in the same slice.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{Result, SynthError};
use crate::harmonic::TemplateBank;
use crate::params::SpectralParams;

/// FFT round trip with an optional harmonic mask in the middle
pub struct SpectralPipeline {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    bank: TemplateBank,
    selected: Option<usize>,
    params: SpectralParams,
}

impl SpectralPipeline {
    /// Plan both transforms for `transform_len` points.
    ///
    /// Every template in `bank` must span the same length.
    pub fn new(transform_len: usize, bank: TemplateBank, params: SpectralParams) -> Result<Self> {
        if let Some(bad) = bank.iter().find(|t| t.mask().len() != transform_len) {
            return Err(SynthError::FieldLength {
                expected: transform_len,
                actual: bad.mask().len(),
            });
        }

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(transform_len);
        let inverse = planner.plan_fft_inverse(transform_len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        log::debug!(
            "Spectral pipeline: {} points, {} templates, cutoff {:?}",
            transform_len,
            bank.len(),
            params.bandpass_cutoff
        );

        Ok(Self {
            forward,
            inverse,
            spectrum: vec![Complex::new(0.0, 0.0); transform_len],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            bank,
            selected: None,
            params,
        })
    }

    pub fn len(&self) -> usize {
        self.spectrum.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectrum.is_empty()
    }

    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select a template by scale degree. Out-of-range indices leave the
    /// current selection in place.
    pub fn select_template(&mut self, index: usize) -> Result<()> {
        self.bank.get(index)?;
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear_template(&mut self) {
        self.selected = None;
    }

    /// Load `signal` as the real part and run the forward transform.
    pub fn forward(&mut self, signal: &[f32]) -> Result<()> {
        self.check_len(signal.len())?;
        for (bin, &x) in self.spectrum.iter_mut().zip(signal) {
            *bin = Complex::new(x, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);
        Ok(())
    }

    /// Apply the selected template and the bandpass cutoff to the spectrum.
    pub fn apply_mask(&mut self) {
        let n = self.spectrum.len();

        match self.selected {
            Some(index) => {
                // select_template only stores indices the bank holds
                let mask = match self.bank.get(index) {
                    Ok(template) => template.mask(),
                    Err(_) => return,
                };
                for (bin, &m) in self.spectrum.iter_mut().zip(mask) {
                    bin.re *= m;
                    if self.params.mask_imaginary {
                        bin.im *= m;
                    }
                }
            }
            None if !self.params.cutoff_in_passthrough => return,
            None => {}
        }

        if let Some(cutoff) = self.params.bandpass_cutoff {
            for (k, bin) in self.spectrum.iter_mut().enumerate() {
                if k.min(n - k) > cutoff {
                    *bin = Complex::new(0.0, 0.0);
                }
            }
        }
    }

    /// Direct access for overlays that write partials between masking and
    /// the inverse transform.
    pub fn spectrum_mut(&mut self) -> &mut [Complex<f32>] {
        &mut self.spectrum
    }

    /// Inverse transform into `out`, dividing by the length once.
    pub fn inverse_normalized(&mut self, out: &mut [f32]) -> Result<()> {
        self.check_len(out.len())?;
        self.inverse
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);
        let scale = 1.0 / self.spectrum.len() as f32;
        for (x, bin) in out.iter_mut().zip(&self.spectrum) {
            *x = bin.re * scale;
        }
        Ok(())
    }

    /// Forward, mask, inverse and normalise `signal` in place.
    pub fn resynthesize(&mut self, signal: &mut [f32]) -> Result<()> {
        self.forward(signal)?;
        self.apply_mask();
        self.inverse_normalized(signal)
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual != self.spectrum.len() {
            return Err(SynthError::FieldLength {
                expected: self.spectrum.len(),
                actual,
            });
        }
        Ok(())
    }
}
