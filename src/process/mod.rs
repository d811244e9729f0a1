//! Process access module
//!
//! Provides the exclusively owned [`ProcessHandle`] and the [`MemoryAccess`]
//! trait that separates it from the platform backends.

pub mod backend;
pub mod handle;

pub use backend::MemoryAccess;
pub use handle::{ProcessAccess, ProcessHandle};
