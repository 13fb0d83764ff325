//! Error types shared across the synth.

use thiserror::Error;

use crate::matrix::MatrixError;

/// Everything that can go wrong outside the matrix engine itself.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("template index {index} out of range (bank holds {len} templates)")]
    TemplateOutOfRange { index: usize, len: usize },

    #[error("note at {freq_hz:.2} Hz maps below bin 1 for a {transform_len}-point transform")]
    NoteBelowResolution { freq_hz: f32, transform_len: usize },

    #[error("buffer of {actual} samples does not match the {expected}-sample field")]
    FieldLength { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("audio output: {0}")]
    Audio(String),

    #[error("render: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SynthError>;
