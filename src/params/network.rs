//! CPPN layer stack parameters.

use crate::network::Activation;

/// Coordinate features fed to the input layer: x, y, t
pub const INPUT_FEATURES: usize = 3;

/// Network shape and seeding
#[derive(Debug, Clone)]
pub struct NetworkParams {
    /// Widths of the hidden layers (the output width is the field's channel count)
    pub hidden_layers: Vec<usize>,

    /// Activation shared by every computed layer
    pub activation: Activation,

    /// Standard deviation of the Gaussian weight/bias fill
    pub init_sigma: f32,

    /// RNG seed (None = seed from entropy)
    pub seed: Option<u64>,

    /// Seconds of playback per unit of the `t` coordinate
    pub time_period_s: f32,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            hidden_layers: vec![16, 16],
            activation: Activation::Sigmoid,
            init_sigma: 0.5,
            seed: None,
            time_period_s: 3.0,
        }
    }
}

impl NetworkParams {
    /// Full width list: input, hidden layers, output
    pub fn layer_widths(&self, output_channels: usize) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.hidden_layers.len() + 2);
        widths.push(INPUT_FEATURES);
        widths.extend_from_slice(&self.hidden_layers);
        widths.push(output_channels);
        widths
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.hidden_layers.iter().any(|&w| w == 0) {
            return Err(format!(
                "Hidden layer widths must be > 0, got {:?}",
                self.hidden_layers
            ));
        }
        if !(self.init_sigma >= 0.0) || !self.init_sigma.is_finite() {
            return Err(format!("Init sigma must be finite and >= 0, got {}", self.init_sigma));
        }
        if !(self.time_period_s > 0.0) {
            return Err(format!(
                "Time period must be > 0, got {}",
                self.time_period_s
            ));
        }
        Ok(())
    }
}
