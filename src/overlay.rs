//! Melody and percussion overlays layered onto the resynthesised field.
//!
//! The melody writes a sine partial straight into the spectrum before the
//! inverse transform; the percussion pattern is added to the time-domain
//! frame after normalisation.

use rustfft::num_complex::Complex;
use std::f32::consts::PI;

use crate::params::OverlayParams;

/// Steps through the key's notes, one spectral partial at a time
#[derive(Debug, Clone)]
pub struct Melody {
    enabled: bool,
    gain: f32,
    step_ticks: u32,
    /// Base bin of each note, in scale order
    bins: Vec<usize>,
    ticks: u64,
}

impl Melody {
    pub fn new(params: &OverlayParams, bins: Vec<usize>) -> Self {
        Self {
            enabled: params.melody_enabled,
            gain: params.melody_gain,
            step_ticks: params.melody_step_ticks.max(1),
            bins,
            ticks: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the overlay on or off; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Bin of the note sounding at the current tick
    pub fn current_bin(&self) -> Option<usize> {
        if self.bins.is_empty() {
            return None;
        }
        let step = (self.ticks / self.step_ticks as u64) as usize;
        Some(self.bins[step % self.bins.len()])
    }

    /// Add the current note to `spectrum` if enabled, then advance one tick.
    ///
    /// A sine of amplitude `g` at bin `k` over `N` points has spectrum
    /// `-i·g·N/2` at `k` and `+i·g·N/2` at `N - k`.
    pub fn apply(&mut self, spectrum: &mut [Complex<f32>]) {
        let n = spectrum.len();
        if self.enabled {
            if let Some(k) = self.current_bin().filter(|&k| k > 0 && k < n) {
                let amplitude = self.gain * n as f32 * 0.5;
                spectrum[k].im -= amplitude;
                if n - k != k {
                    spectrum[n - k].im += amplitude;
                }
            }
        }
        self.ticks += 1;
    }
}

/// Periodic decaying kick, phased against the playback position.
///
/// The feed loops each frame until the next one lands, so a frame sample at
/// index `i` is heard at the playback position congruent to `i` modulo the
/// loop length. Mixing against that position keeps beats evenly spaced
/// across the cursor wrap.
#[derive(Debug, Clone)]
pub struct Percussion {
    enabled: bool,
    /// One beat period of the kick
    kick: Vec<f32>,
    /// Playback positions per pass over a frame
    loop_len: u64,
}

impl Percussion {
    /// `playback_rate_hz` is how many frame samples the feed consumes per
    /// second, so beats land every `60 / bpm` seconds of playback.
    /// `loop_len` is the feed's pass length, see [`StereoMode::loop_len`].
    ///
    /// [`StereoMode::loop_len`]: crate::audio::StereoMode::loop_len
    pub fn new(params: &OverlayParams, playback_rate_hz: f32, loop_len: usize) -> Self {
        let period = ((playback_rate_hz * 60.0 / params.percussion_bpm).round() as usize).max(1);
        let kick = (0..period)
            .map(|i| {
                let t = i as f32 / playback_rate_hz;
                let envelope = (-t / params.percussion_decay_s).exp();
                params.percussion_gain * envelope * (2.0 * PI * params.percussion_pitch_hz * t).sin()
            })
            .collect();
        log::debug!("Percussion: kick every {} samples", period);
        Self {
            enabled: params.percussion_enabled,
            kick,
            loop_len: loop_len.max(1) as u64,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Beat period in frame samples
    pub fn period(&self) -> usize {
        self.kick.len()
    }

    /// Kick value at absolute playback position `position`
    pub fn sample_at(&self, position: u64) -> f32 {
        self.kick[(position % self.kick.len() as u64) as usize]
    }

    /// Add the kick onto `frame` when enabled.
    ///
    /// `playhead` is the playback position (in frame samples) at which the
    /// feed starts reading this frame. Sample `i` is phased to the first
    /// position at or after `playhead` that the feed maps to index `i`.
    pub fn mix(&self, frame: &mut [f32], playhead: u64) {
        if !self.enabled || frame.is_empty() {
            return;
        }
        let len = self.loop_len;
        let offset = playhead % len;
        for (i, x) in frame.iter_mut().enumerate() {
            let position = playhead + (i as u64 + len - offset) % len;
            *x += self.sample_at(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioDoubleBuffer, RealtimeFeed, StereoMode};
    use approx::assert_abs_diff_eq;
    use rustfft::FftPlanner;

    fn enabled_params() -> OverlayParams {
        OverlayParams {
            melody_enabled: true,
            melody_step_ticks: 2,
            percussion_enabled: true,
            ..OverlayParams::default()
        }
    }

    #[test]
    fn test_melody_steps_through_notes() {
        let mut melody = Melody::new(&enabled_params(), vec![10, 12, 14]);
        let mut spectrum = vec![Complex::new(0.0, 0.0); 64];
        let mut heard = Vec::new();
        for _ in 0..8 {
            heard.push(melody.current_bin().unwrap());
            melody.apply(&mut spectrum);
        }
        assert_eq!(heard, vec![10, 10, 12, 12, 14, 14, 10, 10]);
    }

    #[test]
    fn test_melody_injects_sine_of_gain() {
        let n = 128;
        let params = enabled_params();
        let mut melody = Melody::new(&params, vec![8]);
        let mut spectrum = vec![Complex::new(0.0, 0.0); n];
        melody.apply(&mut spectrum);

        let mut planner = FftPlanner::<f32>::new();
        planner.plan_fft_inverse(n).process(&mut spectrum);
        for (i, bin) in spectrum.iter().enumerate() {
            let expected = params.melody_gain * (2.0 * PI * 8.0 * i as f32 / n as f32).sin();
            assert_abs_diff_eq!(bin.re / n as f32, expected, epsilon = 1e-5);
            assert_abs_diff_eq!(bin.im / n as f32, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_disabled_melody_leaves_spectrum() {
        let mut melody = Melody::new(&OverlayParams::default(), vec![8]);
        let mut spectrum = vec![Complex::new(1.0, 0.0); 32];
        melody.apply(&mut spectrum);
        assert!(spectrum.iter().all(|c| *c == Complex::new(1.0, 0.0)));

        assert!(melody.toggle());
        melody.apply(&mut spectrum);
        assert_ne!(spectrum[8].im, 0.0);
    }

    #[test]
    fn test_percussion_kick_shape() {
        let params = OverlayParams {
            percussion_bpm: 60.0,
            ..enabled_params()
        };
        // One beat per 1000 samples at a 1 kHz playback rate
        let percussion = Percussion::new(&params, 1000.0, 1000);
        assert_eq!(percussion.period(), 1000);
        assert_eq!(percussion.sample_at(0), 0.0);
        assert_eq!(percussion.sample_at(2000), 0.0);
        assert_abs_diff_eq!(percussion.sample_at(1003), percussion.sample_at(3));
        // Decayed well before the next beat
        assert!(percussion.sample_at(900).abs() < 1e-3);
    }

    #[test]
    fn test_percussion_mix_respects_toggle() {
        let mut percussion = Percussion::new(&enabled_params(), 8000.0, 256);
        let mut frame = vec![0.0; 256];
        percussion.mix(&mut frame, 0);
        let expected: Vec<f32> = (0..256).map(|i| percussion.sample_at(i)).collect();
        assert_eq!(frame, expected);

        assert!(!percussion.toggle());
        let mut silent = vec![0.0; 256];
        percussion.mix(&mut silent, 0);
        assert!(silent.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_percussion_spacing_survives_frame_wrap() {
        // 1 kHz playback, 150 bpm: a beat every 400 samples. Frames of 1000
        // samples do not hold a whole number of beats, and 250 samples are
        // consumed per tick, so the cursor wraps every fourth tick.
        let params = OverlayParams {
            percussion_bpm: 150.0,
            ..enabled_params()
        };
        let frame_len = 1000;
        let percussion = Percussion::new(&params, 1000.0, frame_len);
        assert_eq!(percussion.period(), 400);

        let per_tick = 250;
        let (mut writer, reader) = AudioDoubleBuffer::new(frame_len);
        let mut feed = RealtimeFeed::new(reader, StereoMode::Interleaved);

        let mut stream = Vec::new();
        let mut chunk = vec![0.0f32; per_tick];
        for tick in 0..12u64 {
            let mut frame = vec![0.0f32; frame_len];
            percussion.mix(&mut frame, tick * per_tick as u64);
            writer.publish(&frame).unwrap();
            feed.pull(&mut chunk);
            stream.extend_from_slice(&chunk);
        }

        // Three wraps in; every sample matches the unbroken kick train
        assert_eq!(stream.len(), 3000);
        for (position, &x) in stream.iter().enumerate() {
            assert_abs_diff_eq!(x, percussion.sample_at(position as u64), epsilon = 1e-6);
        }
        let onsets: Vec<usize> = (0..stream.len()).filter(|p| p % 400 == 0).collect();
        assert!(onsets.iter().all(|&p| stream[p] == 0.0 && stream[p + 1] > 0.0));
    }
}
