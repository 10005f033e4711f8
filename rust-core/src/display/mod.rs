//! Low-resolution monochrome rendering of time- and frequency-domain data

pub mod raster;
pub mod render;
pub mod framebuffer;

pub use raster::{AxisBounds, RasterCanvas, rasterize};
pub use render::{blit, draw_frequency_labels, render_spectrum, render_waveform};
pub use framebuffer::FrameBuffer;
