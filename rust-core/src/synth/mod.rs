//! Additive sine synthesis into the shared sample buffer

pub mod wave;
pub mod buffer;

pub use wave::{WaveDescriptor, synthesize};
pub use buffer::SampleBuffer;
