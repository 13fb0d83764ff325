//! One stage of the layer stack.

use rand::Rng;

use super::Activation;
use crate::matrix::{randomize_gaussian, Matrix};

/// A layer's parameters and per-batch buffers.
///
/// The input layer carries empty parameter matrices and no activation; only its
/// `activation` buffer is meaningful, and the caller writes it every tick.
/// Buffers are sized once at construction and overwritten in place afterwards.
#[derive(Debug, Clone)]
pub struct Layer {
    pub weights: Matrix,
    pub weight_gradients: Matrix,
    pub biases: Matrix,
    pub bias_gradients: Matrix,
    pub pre_activation: Matrix,
    pub activation: Matrix,
    pub activation_fn: Option<Activation>,
}

impl Layer {
    /// Input layer holding `batch_size` rows of `width` features
    pub fn input(batch_size: usize, width: usize) -> Self {
        Self {
            weights: Matrix::zeros(0, 0),
            weight_gradients: Matrix::zeros(0, 0),
            biases: Matrix::zeros(0, 0),
            bias_gradients: Matrix::zeros(0, 0),
            pre_activation: Matrix::zeros(0, 0),
            activation: Matrix::zeros(batch_size, width),
            activation_fn: None,
        }
    }

    /// Fully-connected layer mapping `fan_in` features to `width` units
    pub fn dense(batch_size: usize, fan_in: usize, width: usize, activation: Activation) -> Self {
        Self {
            weights: Matrix::zeros(fan_in, width),
            weight_gradients: Matrix::zeros(fan_in, width),
            biases: Matrix::zeros(1, width),
            bias_gradients: Matrix::zeros(1, width),
            pre_activation: Matrix::zeros(batch_size, width),
            activation: Matrix::zeros(batch_size, width),
            activation_fn: Some(activation),
        }
    }

    pub fn width(&self) -> usize {
        self.activation.cols()
    }

    pub fn is_input(&self) -> bool {
        self.activation_fn.is_none()
    }

    /// Redraw weights and biases; leaves the activation buffers alone.
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R, sigma: f32) {
        if self.is_input() {
            return;
        }
        randomize_gaussian(rng, self.weights.as_mut_slice(), sigma);
        randomize_gaussian(rng, self.biases.as_mut_slice(), sigma);
        self.weight_gradients.zero();
        self.bias_gradients.zero();
    }

    /// `activation[r, k] = f(pre_activation[r, k], bias[k])` for every row.
    pub(super) fn activate(&mut self) {
        let Some(f) = self.activation_fn else {
            return;
        };
        let width = self.activation.cols();
        if width == 0 {
            return;
        }
        let biases = self.biases.as_slice();
        for (z_row, a_row) in self
            .pre_activation
            .as_slice()
            .chunks_exact(width)
            .zip(self.activation.as_mut_slice().chunks_exact_mut(width))
        {
            for ((a, &z), &b) in a_row.iter_mut().zip(z_row).zip(biases) {
                *a = f.apply(z, b);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dense_shapes() {
        let layer = Layer::dense(8, 3, 5, Activation::Tanh);
        assert_eq!((layer.weights.rows(), layer.weights.cols()), (3, 5));
        assert_eq!((layer.biases.rows(), layer.biases.cols()), (1, 5));
        assert_eq!((layer.activation.rows(), layer.activation.cols()), (8, 5));
        assert_eq!(layer.pre_activation.len(), 40);
        assert_eq!(layer.weight_gradients.len(), 15);
        assert!(!layer.is_input());
    }

    #[test]
    fn test_seed_leaves_activations_untouched() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut layer = Layer::dense(2, 2, 2, Activation::Relu);
        layer.activation.as_mut_slice().fill(0.25);
        layer.seed(&mut rng, 1.0);

        assert!(layer.weights.as_slice().iter().any(|&w| w != 0.0));
        assert!(layer.biases.as_slice().iter().any(|&b| b != 0.0));
        assert!(layer.activation.as_slice().iter().all(|&a| a == 0.25));
    }

    #[test]
    fn test_bias_broadcast_along_batch() {
        let mut layer = Layer::dense(3, 1, 2, Activation::Relu);
        layer.biases.as_mut_slice().copy_from_slice(&[1.0, -1.0]);
        layer
            .pre_activation
            .as_mut_slice()
            .copy_from_slice(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        layer.activate();
        assert_eq!(layer.activation.as_slice(), &[1.0, 0.0, 2.0, 0.0, 3.0, 1.0]);
    }
}
