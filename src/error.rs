//! Error types for convsoak operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for convsoak operations
pub type Result<T> = std::result::Result<T, ConvError>;

/// Errors that can occur while loading inputs or running the pool
///
/// The convolution itself never fails; every variant comes from setup,
/// input validation, or thread management.
#[derive(Debug, Error)]
pub enum ConvError {
    /// Wrong command-line usage
    #[error("Usage error: {0}")]
    Usage(String),

    /// Input or kernel file could not be opened or read
    #[error("Could not open {what} file {}: {source}", .path.display())]
    FileOpen {
        /// Which input ("input" or "kernel")
        what: &'static str,
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Other I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed matrix or kernel text
    #[error("Malformed {what}: {message}")]
    Parse {
        /// Which input ("input" or "kernel")
        what: &'static str,
        /// Description of the problem
        message: String,
    },

    /// Matrix dimensions are zero or inconsistent with the data
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Kernel is not square or not odd-sized
    #[error("Invalid kernel: {0}")]
    InvalidKernel(String),

    /// The OS refused to create a worker thread
    #[error("Could not create worker thread {id}: {source}")]
    WorkerSpawn {
        /// Worker id that failed to spawn
        id: usize,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before completing its iterations
    #[error("Worker {id} panicked")]
    WorkerPanicked {
        /// Worker id that panicked
        id: usize,
    },
}

impl ConvError {
    /// Create a parse error for the named input
    pub fn parse(what: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            what,
            message: message.into(),
        }
    }
}
