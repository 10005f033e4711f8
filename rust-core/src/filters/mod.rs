//! Window functions and anti-aliasing FIR decimation

pub mod windows;
pub mod design;
pub mod fir;

pub use windows::{WindowKind, generate_window, generate_window_by_selector};
pub use design::{design_decimation_lowpass, decimation_cutoff};
pub use fir::FirDecimator;
