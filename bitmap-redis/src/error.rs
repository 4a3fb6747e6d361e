use std::time::Duration;
use thiserror::Error;

use crate::script::Operation;

/// Errors that can occur when calling a distributed bitmap
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport or script execution failure reported by Redis
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The script call did not complete within the configured timeout
    #[error("Script call timed out after {0:?}")]
    Timeout(Duration),

    /// The script returned a value outside the range of the operation's reply
    #[error("Unexpected reply {reply} to {op}")]
    UnexpectedReply { op: Operation, reply: i64 },
}

/// A specialized Result type for distributed bitmap operations
pub type Result<T> = std::result::Result<T, RemoteError>;
