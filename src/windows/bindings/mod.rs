//! Windows API bindings
//!
//! Low-level FFI wrappers over kernel32.

pub mod kernel32;

pub use kernel32::*;
