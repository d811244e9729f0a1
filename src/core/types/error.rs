//! Custom error types for Memory-Editor

use super::{Address, ValueType};
use thiserror::Error;

/// Main error type for memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Process not found: {0}")]
    ProcessNotFound(u32),

    #[error("Access denied to process {pid}: {reason}")]
    AccessDenied { pid: u32, reason: String },

    #[error("Process handle for {0} is closed")]
    HandleClosed(u32),

    #[error("Process handle for {0} was already closed")]
    AlreadyClosed(u32),

    #[error("Invalid memory address {address}: {reason}")]
    InvalidAddress { address: Address, reason: String },

    #[error("Partial read at {address}: expected {expected} bytes, got {actual}")]
    PartialRead {
        address: Address,
        expected: usize,
        actual: usize,
    },

    #[error("Partial write at {address}: expected {expected} bytes, wrote {actual}")]
    PartialWrite {
        address: Address,
        expected: usize,
        actual: usize,
    },

    #[error("Memory at {0} is not writable")]
    ProtectedMemory(Address),

    #[error("Invalid length {actual} for {kind}: {expected}")]
    LengthMismatch {
        kind: ValueType,
        expected: String,
        actual: usize,
    },

    #[error("Value {value} does not fit in {length} bytes of {kind}")]
    ValueTooLarge {
        kind: ValueType,
        length: usize,
        value: String,
    },

    #[error("Expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Invalid scan predicate: {0}")]
    InvalidPredicate(String),

    #[error("Invalid scan options: {0}")]
    InvalidOptions(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates an access denied error for a process
    pub fn access_denied(pid: u32, reason: impl Into<String>) -> Self {
        MemoryError::AccessDenied {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates an invalid address error
    pub fn invalid_address(address: impl Into<Address>, reason: impl Into<String>) -> Self {
        MemoryError::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Creates a length mismatch error
    pub fn length_mismatch(kind: ValueType, expected: impl Into<String>, actual: usize) -> Self {
        MemoryError::LengthMismatch {
            kind,
            expected: expected.into(),
            actual,
        }
    }

    /// Creates a value too large error
    pub fn value_too_large(kind: ValueType, length: usize, value: impl ToString) -> Self {
        MemoryError::ValueTooLarge {
            kind,
            length,
            value: value.to_string(),
        }
    }

    /// Whether a scan may treat this error as "no match here" and keep going.
    ///
    /// Only per-address failures qualify; handle and argument errors never do.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MemoryError::InvalidAddress { .. } | MemoryError::PartialRead { .. }
        )
    }
}
