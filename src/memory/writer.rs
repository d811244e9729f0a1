//! Typed single-address memory writes
//!
//! Writes never change page protection. The target range is checked against
//! the live memory map first and a read-only page surfaces as
//! `ProtectedMemory`.

use super::codec;
use crate::core::types::{Address, MemoryError, MemoryResult, MemoryValue, ValueType};
use crate::process::ProcessHandle;
use tracing::debug;

/// Writes typed values into an open process
pub struct MemoryWriter<'a> {
    handle: &'a ProcessHandle,
}

impl<'a> MemoryWriter<'a> {
    /// Create a new memory writer
    pub fn new(handle: &'a ProcessHandle) -> Self {
        MemoryWriter { handle }
    }

    /// Get the underlying handle
    pub fn handle(&self) -> &'a ProcessHandle {
        self.handle
    }

    /// Encodes `value` as `kind` into `length` bytes and writes it at `address`
    pub fn write(
        &self,
        address: Address,
        kind: ValueType,
        length: usize,
        value: &MemoryValue,
    ) -> MemoryResult<()> {
        let bytes = codec::encode(value, kind, length)?;
        self.write_bytes(address, &bytes)
    }

    /// Writes all of `data` at `address` with a single OS write
    pub fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if data.is_empty() {
            return self.handle.ensure_open();
        }

        self.check_writable(address, data.len())?;

        let written = self.handle.write_memory(address, data)?;
        match written {
            0 => Err(MemoryError::invalid_address(
                address,
                "no bytes could be written",
            )),
            n if n < data.len() => Err(MemoryError::PartialWrite {
                address,
                expected: data.len(),
                actual: n,
            }),
            _ => {
                debug!(address = %address, size = data.len(), "Wrote memory");
                Ok(())
            }
        }
    }

    /// Every region overlapping `[address, address + size)` must be mapped
    /// and writable
    fn check_writable(&self, address: Address, size: usize) -> MemoryResult<()> {
        let end = address
            .checked_add(size)
            .ok_or_else(|| {
                MemoryError::invalid_address(address, "range wraps the address space")
            })?;

        let mut cursor = address;
        while cursor < end {
            let region = self
                .handle
                .region_at(cursor)?
                .ok_or_else(|| MemoryError::invalid_address(cursor, "not mapped"))?;

            if !region.is_writable() {
                return Err(MemoryError::ProtectedMemory(cursor));
            }
            cursor = region.end_address();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::reader::MemoryReader;
    use crate::process::ProcessAccess;
    use crate::testing::FakeProcess;

    fn fake_handle() -> ProcessHandle {
        let fake = FakeProcess::new()
            .with_region(0x1000, vec![0u8; 0x100], true)
            .with_region(0x1100, vec![0u8; 0x100], true)
            .with_region(0x2000, vec![0u8; 0x100], false);
        ProcessHandle::from_backend(3, ProcessAccess::ALL, Box::new(fake))
    }

    #[test]
    fn test_write_then_read() {
        let handle = fake_handle();
        let writer = MemoryWriter::new(&handle);
        let reader = MemoryReader::new(&handle);

        let cases = [
            (ValueType::Int, 4, MemoryValue::Int(12345)),
            (ValueType::Int, 1, MemoryValue::Int(-7)),
            (ValueType::Float, 4, MemoryValue::Float(0.25)),
            (ValueType::Bool, 1, MemoryValue::Bool(true)),
            (ValueType::Text, 6, MemoryValue::from("hello")),
        ];

        for (kind, length, value) in cases {
            let address = Address::new(0x1010);
            writer.write(address, kind, length, &value).unwrap();
            assert_eq!(reader.read(address, kind, length).unwrap(), value);
        }
    }

    #[test]
    fn test_write_across_adjacent_regions() {
        let handle = fake_handle();
        let writer = MemoryWriter::new(&handle);

        // Both regions pass the protection walk, but the fake copies within
        // one region, so the transfer is short
        let err = writer
            .write_bytes(Address::new(0x10FE), &[1, 2, 3, 4])
            .unwrap_err();
        assert!(matches!(err, MemoryError::PartialWrite { actual: 2, .. }));
    }

    #[test]
    fn test_write_read_only_region() {
        let handle = fake_handle();
        let writer = MemoryWriter::new(&handle);
        let value = MemoryValue::Int(1);
        let err = writer
            .write(Address::new(0x2000), ValueType::Int, 4, &value)
            .unwrap_err();
        assert!(matches!(
            err,
            MemoryError::ProtectedMemory(addr) if addr == Address::new(0x2000)
        ));
    }

    #[test]
    fn test_write_unmapped() {
        let handle = fake_handle();
        let writer = MemoryWriter::new(&handle);
        let value = MemoryValue::Int(1);
        let err = writer
            .write(Address::new(0x5000), ValueType::Int, 4, &value)
            .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidAddress { .. }));

        // Runs off the end of the last region into unmapped memory
        let err = writer
            .write_bytes(Address::new(0x20FE), &[0; 4])
            .unwrap_err();
        assert!(matches!(err, MemoryError::ProtectedMemory(_)));
        let err = writer
            .write_bytes(Address::new(0x11FE), &[0; 4])
            .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidAddress { .. }));
    }

    #[test]
    fn test_write_validates_value() {
        let handle = fake_handle();
        let writer = MemoryWriter::new(&handle);

        let value = MemoryValue::Int(300);

        let err = writer

            .write(Address::new(0x1000), ValueType::Int, 1, &value)

            .unwrap_err();
        assert!(matches!(err, MemoryError::ValueTooLarge { .. }));

        let value = MemoryValue::Int(1);

        let err = writer

            .write(Address::new(0x1000), ValueType::Int, 3, &value)

            .unwrap_err();
        assert!(matches!(err, MemoryError::LengthMismatch { .. }));

        let value = MemoryValue::Float(1.0);

        let err = writer

            .write(Address::new(0x1000), ValueType::Int, 4, &value)

            .unwrap_err();
        assert!(matches!(err, MemoryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_write_after_close() {
        let mut handle = fake_handle();
        handle.close().unwrap();
        let writer = MemoryWriter::new(&handle);
        let value = MemoryValue::Int(1);
        let err = writer
            .write(Address::new(0x1000), ValueType::Int, 4, &value)
            .unwrap_err();
        assert!(matches!(err, MemoryError::HandleClosed(3)));
    }
}
