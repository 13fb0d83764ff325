//! Bounded 1D convolution with a clipped window.

/// Convolve `signal` with `kernel` in place.
///
/// The kernel is centred on each sample (`⌊k/2⌋` taps either side). Taps that
/// fall outside the signal are dropped, so edge samples get a partial sum.
/// All reads come from the untouched input.
pub fn convolve_in_place(signal: &mut [f32], kernel: &[f32]) {
    if signal.is_empty() || kernel.is_empty() {
        return;
    }
    let half = kernel.len() / 2;
    let len = signal.len();
    let source = signal.to_vec();

    for (i, out) in signal.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (t, &weight) in kernel.iter().enumerate() {
            // j = i + t - half, skipped when outside [0, len)
            let Some(j) = (i + t).checked_sub(half) else {
                continue;
            };
            if j >= len {
                break;
            }
            acc += source[j] * weight;
        }
        *out = acc;
    }
}
