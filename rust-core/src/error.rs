//! Error types shared by every component

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("FFT engine is not initialized, call `initialize` first")]
    NotInitialized,

    #[error("Unknown window type: {0}")]
    UnknownWindowType(String),

    #[error("Failed to allocate working memory for {requested} elements")]
    AllocationFailure { requested: usize },

    #[error("Display error: {0}")]
    Display(String),

    #[error("Timer error: {0}")]
    Timer(String),
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Allocate a zeroed working buffer, reporting failure instead of aborting
pub(crate) fn try_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_: TryReserveError| CoreError::AllocationFailure { requested: len })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}
