//! Memory region management
//!
//! This module provides the region model shared by every platform backend and
//! the enumerator that turns a raw OS memory map into the ascending,
//! non-overlapping list of readable regions the scanner walks.

pub mod enumerator;
pub mod protection;

pub use enumerator::{enumerate_regions, MemoryRegion, RegionEnumerator};
pub use protection::ProtectionFlags;
