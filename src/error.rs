//! Error types for the simulator

use thiserror::Error;

use crate::mac::StationId;

/// Errors that can stop a simulation from starting or finishing
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file or report (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A station thread panicked
    #[error("station {0} panicked")]
    StationPanicked(StationId),

    /// The access point thread panicked
    #[error("access point panicked")]
    AccessPointPanicked,

    /// Could not install the Ctrl+C handler
    #[error("signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
