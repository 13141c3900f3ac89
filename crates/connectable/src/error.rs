//! Connection error types

use thiserror::Error;

/// Errors raised when wiring signals to slots
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The signal is not in the owner's declared signal set
    #[error("{owner} is trying to connect a slot to an undefined signal: {signal}")]
    UndefinedSignal { owner: String, signal: String },
}

/// Result type for connection operations
pub type Result<T> = std::result::Result<T, ConnectError>;
