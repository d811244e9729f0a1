//! Windows utility functions

pub mod error_codes;

pub use error_codes::ErrorCode;
