//! Windows API layer for memory manipulation
//!
//! All unsafe FFI calls are contained within this module. The rest of the
//! crate only sees [`WindowsProcess`] through the `MemoryAccess` trait.

pub mod bindings;
pub mod process;
pub mod utils;

pub use process::WindowsProcess;
pub use utils::ErrorCode;
