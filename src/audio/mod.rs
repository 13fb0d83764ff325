//! Audio hand-off and output.
//!
//! The tick context publishes whole frames through [`BufferWriter`]; the
//! device callback owns a [`RealtimeFeed`] that loops over the newest frame.

mod double_buffer;
mod feed;
mod system;

pub use double_buffer::{AudioDoubleBuffer, BufferReader, BufferWriter};
pub use feed::{frames_before_tick, RealtimeFeed, StereoMode};
pub use system::AudioSystem;
