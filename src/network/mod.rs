//! Feed-forward layer stack (the CPPN that paints the field).
//!
//! The stack is seeded once from a Gaussian and re-seeded on demand; it is
//! never trained. A forward pass runs the whole pixel batch through every
//! computed layer in one matrix product per layer.

mod activation;
mod layer;

pub use activation::Activation;
pub use layer::Layer;

use rand::Rng;

use crate::error::{Result, SynthError};
use crate::matrix::{multiply_into, Matrix, MatrixError};

/// Ordered layers: input first, output last, at least one computed layer.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Allocate a stack with the given layer widths (input width first).
    ///
    /// Every computed layer uses `activation`. Weights start at zero until
    /// [`Network::seed`] is called.
    pub fn new(batch_size: usize, widths: &[usize], activation: Activation) -> Result<Self> {
        if widths.len() < 2 {
            return Err(SynthError::Config(format!(
                "a network needs an input and at least one computed layer, got {} widths",
                widths.len()
            )));
        }
        if let Some(pos) = widths.iter().position(|&w| w == 0) {
            return Err(SynthError::Config(format!("layer {} has zero width", pos)));
        }

        let mut layers = Vec::with_capacity(widths.len());
        layers.push(Layer::input(batch_size, widths[0]));
        for pair in widths.windows(2) {
            layers.push(Layer::dense(batch_size, pair[0], pair[1], activation));
        }
        Ok(Self { layers })
    }

    /// Assemble a stack from prebuilt layers, checking the shape chain.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(SynthError::Config(
                "a network needs an input and at least one computed layer".to_string(),
            ));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.weights.rows() != prev.activation.cols() {
                return Err(MatrixError::InnerDimension {
                    op: "layer chain",
                    lhs: prev.activation.cols(),
                    rhs: next.weights.rows(),
                }
                .into());
            }
            if next.is_input() {
                return Err(SynthError::Config(format!(
                    "layer {} has no activation function",
                    i + 1
                )));
            }
        }
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Rows per forward pass
    pub fn batch_size(&self) -> usize {
        self.layers[0].activation.rows()
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].width()
    }

    pub fn output_width(&self) -> usize {
        self.output().cols()
    }

    /// The input layer's activation buffer, written by the caller every tick
    pub fn input_mut(&mut self) -> &mut Matrix {
        &mut self.layers[0].activation
    }

    pub fn output(&self) -> &Matrix {
        &self.layers[self.layers.len() - 1].activation
    }

    pub fn output_mut(&mut self) -> &mut Matrix {
        let last = self.layers.len() - 1;
        &mut self.layers[last].activation
    }

    /// Redraw every computed layer's weights and biases from N(0, sigma²)
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R, sigma: f32) {
        for layer in self.layers.iter_mut().skip(1) {
            layer.seed(rng, sigma);
        }
    }

    /// Run the current input buffer through every computed layer.
    pub fn forward(&mut self) -> Result<&Matrix> {
        for j in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(j);
            let prev = &done[j - 1];
            let layer = &mut rest[0];
            multiply_into(&prev.activation, &layer.weights, &mut layer.pre_activation)?;
            layer.activate();
        }
        Ok(self.output())
    }

    /// Copy `inputs` into the input layer, then run [`Network::forward`].
    pub fn forward_batch(&mut self, inputs: &Matrix) -> Result<&Matrix> {
        let input = self.input_mut();
        if inputs.rows() != input.rows() || inputs.cols() != input.cols() {
            return Err(MatrixError::OutputShape {
                op: "forward_batch",
                rows: input.rows(),
                cols: input.cols(),
                actual_rows: inputs.rows(),
                actual_cols: inputs.cols(),
            }
            .into());
        }
        input.as_mut_slice().copy_from_slice(inputs.as_slice());
        self.forward()
    }
}
