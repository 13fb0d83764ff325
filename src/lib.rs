//! Kaleidosynth library - a CPPN field rendered as picture and sound

pub mod audio;
pub mod capture;
pub mod cli;
pub mod controls;
pub mod engine;
pub mod error;
pub mod field;
pub mod harmonic;
pub mod matrix;
pub mod network;
pub mod overlay;
pub mod params;
pub mod rendering;
pub mod spectral;

pub use error::{Result, SynthError};
