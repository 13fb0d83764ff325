//! Activation functions for the CPPN layers.
//!
//! Each function takes the raw product `z` and the unit's bias `b` separately,
//! since the bias is broadcast along the batch rather than folded into the
//! matrix product.

use std::fmt;
use std::str::FromStr;

/// Closed set of supported activations. One network uses one choice for all
/// of its computed layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Sigmoid,
    Gaussian,
    Tanh,
    Relu,
}

impl Activation {
    /// Evaluate the activation at `z + bias`
    #[inline]
    pub fn apply(self, z: f32, bias: f32) -> f32 {
        let sum = z + bias;
        match self {
            Activation::Sigmoid => {
                // Branch on sign so exp() only ever sees a non-positive argument
                if sum >= 0.0 {
                    1.0 / (1.0 + (-sum).exp())
                } else {
                    let e = sum.exp();
                    e / (1.0 + e)
                }
            }
            Activation::Gaussian => (-(sum * sum)).exp(),
            Activation::Tanh => sum.tanh(),
            Activation::Relu => sum.max(0.0),
        }
    }

    /// Derivative expressed through the already-computed activation.
    ///
    /// Only a training path would need this; the runtime never trains.
    pub fn derivative(self, z: f32, activation: f32) -> f32 {
        match self {
            Activation::Sigmoid => activation * (1.0 - activation),
            Activation::Gaussian => -2.0 * z * activation,
            Activation::Tanh => 1.0 - activation * activation,
            Activation::Relu => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Gaussian => "gaussian",
            Activation::Tanh => "tanh",
            Activation::Relu => "relu",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sigmoid" => Ok(Activation::Sigmoid),
            "gaussian" | "gauss" => Ok(Activation::Gaussian),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::Relu),
            other => Err(format!("unknown activation '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sigmoid_midpoint_and_bias() {
        assert_abs_diff_eq!(Activation::Sigmoid.apply(0.0, 0.0), 0.5);
        assert_abs_diff_eq!(Activation::Sigmoid.apply(1.0, -1.0), 0.5);
        assert!(Activation::Sigmoid.apply(2.0, 0.0) > 0.5);
    }

    #[test]
    fn test_sigmoid_extremes_stay_finite() {
        let high = Activation::Sigmoid.apply(1.0e4, 0.0);
        let low = Activation::Sigmoid.apply(-1.0e4, 0.0);
        assert_abs_diff_eq!(high, 1.0);
        assert_abs_diff_eq!(low, 0.0);
        assert!(!high.is_nan() && !low.is_nan());
    }

    #[test]
    fn test_sigmoid_symmetry() {
        for &x in &[0.1f32, 1.0, 3.5, 20.0] {
            let sum = Activation::Sigmoid.apply(x, 0.0) + Activation::Sigmoid.apply(-x, 0.0);
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gaussian_peak_and_decay() {
        assert_eq!(Activation::Gaussian.apply(0.0, 0.0), 1.0);
        assert_abs_diff_eq!(Activation::Gaussian.apply(0.5, 0.5), (-1.0f32).exp());
        assert_eq!(Activation::Gaussian.apply(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_tanh_and_relu() {
        assert_abs_diff_eq!(Activation::Tanh.apply(0.3, 0.2), 0.5f32.tanh());
        assert_eq!(Activation::Relu.apply(-2.0, 1.0), 0.0);
        assert_eq!(Activation::Relu.apply(2.0, 1.0), 3.0);
    }

    #[test]
    fn test_derivatives() {
        assert_abs_diff_eq!(Activation::Sigmoid.derivative(0.0, 0.5), 0.25);
        assert_abs_diff_eq!(Activation::Gaussian.derivative(0.5, 1.0), -1.0);
        assert_abs_diff_eq!(Activation::Tanh.derivative(0.0, 0.0), 1.0);
        assert_eq!(Activation::Relu.derivative(-1.0, 0.0), 0.0);
        assert_eq!(Activation::Relu.derivative(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_parse_round_trip() {
        for act in [
            Activation::Sigmoid,
            Activation::Gaussian,
            Activation::Tanh,
            Activation::Relu,
        ] {
            assert_eq!(act.to_string().parse::<Activation>(), Ok(act));
        }
        assert_eq!("RELU".parse::<Activation>(), Ok(Activation::Relu));
        assert!("softmax".parse::<Activation>().is_err());
    }
}
