//! Error types for the Aurora presentation core
//!
//! This module defines the error types used throughout the crate, covering
//! swap chain configuration, device failures, initialization and misuse.
//!
//! Transient surface conditions (out-of-date, suboptimal, minimized) are NOT
//! errors: they are reported as `FrameOutcome::Skip` by acquire/present.

use std::fmt;

/// Result type for Aurora operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aurora errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Resolved swap chain extent is degenerate or outside the surface bounds
    ConfigurationError(String),

    /// Unrecognized acquire/present result or failed device synchronization
    DeviceError(String),

    /// Backend-specific call failure (Vulkan, mock, etc.)
    BackendError(String),

    /// Initialization failed (instance, device, surface, semaphores)
    InitializationFailed(String),

    /// Resource used in an invalid state (e.g. after destruction)
    InvalidResource(String),
}

impl Error {
    /// Whether the error is fatal for the frame loop
    ///
    /// Every variant is fatal except `InvalidResource`, which signals a
    /// caller bug on an already torn-down object.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::InvalidResource(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Error::DeviceError(msg) => write!(f, "Unrecoverable device error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
