//! Error types for the IP registry
//!
//! The registry core only ever fails with [`Error::NotFound`] or
//! [`Error::NotAuthorized`]. The remaining variants belong to the call
//! dispatcher, script replay and configuration loading.

use crate::registry::{IpId, Principal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the registry
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Registry Errors
    // =========================================================================
    #[error("IP record not found: {id}")]
    NotFound { id: IpId },

    #[error("Principal {caller} is not the owner of IP record {id}")]
    NotAuthorized { id: IpId, caller: Principal },

    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    // =========================================================================
    // Dispatch Errors
    // =========================================================================
    #[error("Function not found: {0}")]
    UnknownFunction(String),

    #[error("Invalid arguments for {function}: {reason}")]
    InvalidArguments { function: String, reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`], carried in call outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Referenced id has no record
    NotFound,
    /// Caller is not the current owner
    NotAuthorized,
    /// Dispatcher was asked for a function it does not know
    UnknownFunction,
    /// Call arguments could not be decoded
    InvalidArguments,
    /// Configuration, IO or other driver-level failure
    Internal,
}

impl ErrorKind {
    /// Numeric code reported to callers. `1` and `2` are the registry's
    /// contract codes for missing records and ownership failures.
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::NotFound => 1,
            ErrorKind::NotAuthorized => 2,
            ErrorKind::UnknownFunction => 3,
            ErrorKind::InvalidArguments => 4,
            ErrorKind::Internal => 5,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::NotAuthorized => write!(f, "not-authorized"),
            ErrorKind::UnknownFunction => write!(f, "unknown-function"),
            ErrorKind::InvalidArguments => write!(f, "invalid-arguments"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Error::UnknownFunction(_) => ErrorKind::UnknownFunction,

            Error::InvalidArguments { .. }
            | Error::InvalidPrincipal(_)
            | Error::JsonParse(_) => ErrorKind::InvalidArguments,

            Error::Configuration(_) | Error::YamlParse(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Numeric error code for this error
    pub fn code(&self) -> u32 {
        self.kind().code()
    }

    /// Check if this error was raised by the registry core
    pub fn is_registry_error(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::NotAuthorized { .. })
    }
}

/// Result type alias for the registry
pub type Result<T> = std::result::Result<T, Error>;
