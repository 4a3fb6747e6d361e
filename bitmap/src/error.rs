use std::io;
use thiserror::Error;

/// Errors that can occur when creating or (de)serializing bitmaps
#[derive(Debug, Error)]
pub enum BitmapError {
    /// No constructor is registered under the requested engine name
    #[error("no such engine: {0}")]
    NoSuchEngine(String),

    /// I/O error from the underlying stream, with the bytes processed before it
    #[error("I/O error after {bytes} bytes: {source}")]
    Io {
        bytes: u64,
        #[source]
        source: io::Error,
    },

    /// A registered constructor failed to build its engine
    #[error("Failed to construct engine {engine}: {reason}")]
    Construction { engine: String, reason: String },

    /// The default bitmap was already built, so its engine can no longer change
    #[error("Default bitmap already initialized")]
    DefaultInitialized,
}

impl BitmapError {
    pub(crate) fn io(bytes: u64, source: io::Error) -> Self {
        Self::Io { bytes, source }
    }

    /// Bytes processed before the failure, for stream errors.
    pub fn bytes_processed(&self) -> Option<u64> {
        match self {
            Self::Io { bytes, .. } => Some(*bytes),
            _ => None,
        }
    }
}

/// A specialized Result type for bitmap operations
pub type Result<T> = std::result::Result<T, BitmapError>;
