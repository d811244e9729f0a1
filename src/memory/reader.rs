//! Typed single-address memory reads

use super::codec;
use crate::core::types::{Address, MemoryError, MemoryResult, MemoryValue, ValueType};
use crate::process::ProcessHandle;
use tracing::trace;

/// Reads typed values from an open process
pub struct MemoryReader<'a> {
    handle: &'a ProcessHandle,
}

impl<'a> MemoryReader<'a> {
    /// Create a new memory reader
    pub fn new(handle: &'a ProcessHandle) -> Self {
        MemoryReader { handle }
    }

    /// Get the underlying handle
    pub fn handle(&self) -> &'a ProcessHandle {
        self.handle
    }

    /// Reads exactly `size` bytes at `address`.
    ///
    /// Nothing readable fails with `InvalidAddress`, a short read with
    /// `PartialRead`.
    pub fn read_bytes(&self, address: Address, size: usize) -> MemoryResult<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        if size == 0 {
            self.handle.ensure_open()?;
            return Ok(buffer);
        }

        let read = self.handle.read_memory(address, &mut buffer)?;
        match read {
            0 => Err(MemoryError::invalid_address(
                address,
                "no bytes could be read",
            )),
            n if n < size => Err(MemoryError::PartialRead {
                address,
                expected: size,
                actual: n,
            }),
            _ => Ok(buffer),
        }
    }

    /// Reads `length` bytes at `address` and decodes them as `kind`
    pub fn read(
        &self,
        address: Address,
        kind: ValueType,
        length: usize,
    ) -> MemoryResult<MemoryValue> {
        codec::check_length(kind, length)?;
        let bytes = self.read_bytes(address, length)?;
        codec::decode(&bytes, kind, length)
    }

    /// Reads every address independently, keeping input order.
    ///
    /// A failure at one address does not affect the others.
    pub fn read_batch(
        &self,
        addresses: &[Address],
        kind: ValueType,
        length: usize,
    ) -> Vec<(Address, MemoryResult<MemoryValue>)> {
        addresses
            .iter()
            .map(|&address| {
                let result = self.read(address, kind, length);
                if let Err(err) = &result {
                    trace!(address = %address, error = %err, "Batch read failed");
                }
                (address, result)
            })
            .collect()
    }
}
