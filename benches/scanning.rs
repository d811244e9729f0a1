use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memory_editor::memory::{MemoryRegion, MemoryScanner, ProtectionFlags};
use memory_editor::{
    Address, MemoryAccess, MemoryError, MemoryResult, ProcessAccess, ProcessHandle, ScanOptions,
    ScanPredicate, ValueType,
};

const BASE: usize = 0x10_0000;
const REGION_SIZE: usize = 4 * 1024 * 1024;

/// One large readable region held in memory
struct Snapshot {
    data: Vec<u8>,
}

impl MemoryAccess for Snapshot {
    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        let offset = address
            .as_usize()
            .checked_sub(BASE)
            .filter(|&offset| offset < self.data.len())
            .ok_or_else(|| MemoryError::invalid_address(address, "unmapped"))?;
        let count = buffer.len().min(self.data.len() - offset);
        buffer[..count].copy_from_slice(&self.data[offset..offset + count]);
        Ok(count)
    }

    fn write(&self, address: Address, _data: &[u8]) -> MemoryResult<usize> {
        Err(MemoryError::ProtectedMemory(address))
    }

    fn regions(&self) -> MemoryResult<Vec<MemoryRegion>> {
        Ok(vec![MemoryRegion::new(
            Address::new(BASE),
            self.data.len(),
            ProtectionFlags::read_only(),
        )])
    }

    fn close(&mut self) -> MemoryResult<()> {
        Ok(())
    }
}

fn snapshot_handle() -> ProcessHandle {
    // Deterministic noise with a sprinkling of the searched value
    let mut state = 0x2545_F491u32;
    let mut data = vec![0u8; REGION_SIZE];
    for byte in data.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *byte = state as u8;
    }
    for offset in (0..REGION_SIZE - 4).step_by(4099) {
        data[offset..offset + 4].copy_from_slice(&12345i32.to_ne_bytes());
    }

    ProcessHandle::from_backend(1, ProcessAccess::READ, Box::new(Snapshot { data }))
}

fn benchmark_search(c: &mut Criterion) {
    let handle = snapshot_handle();
    let mut group = c.benchmark_group("search");
    group.throughput(Throughput::Bytes(REGION_SIZE as u64));

    for alignment in [1usize, 4] {
        let scanner = MemoryScanner::with_options(
            &handle,
            ScanOptions {
                alignment,
                ..ScanOptions::default()
            },
        );
        let predicate = ScanPredicate::exact(12345);

        group.bench_with_input(
            BenchmarkId::new("exact_int", alignment),
            &predicate,
            |b, predicate| {
                b.iter(|| {
                    let count = scanner
                        .search(ValueType::Int, 4, predicate)
                        .map(|search| search.count())
                        .unwrap_or_default();
                    black_box(count)
                });
            },
        );
    }

    let scanner = MemoryScanner::new(&handle);
    let between = ScanPredicate::between(0.5, 1.5).unwrap_or_else(|_| ScanPredicate::exact(1.0));
    group.bench_function("between_f32", |b| {
        b.iter(|| {
            let count = scanner
                .search(ValueType::Float, 4, &between)
                .map(|search| search.count())
                .unwrap_or_default();
            black_box(count)
        });
    });

    group.finish();
}

fn benchmark_parallel(c: &mut Criterion) {
    let handle = snapshot_handle();
    let scanner = MemoryScanner::new(&handle);
    let predicate = ScanPredicate::exact(12345);

    c.bench_function("collect_parallel_single_region", |b| {
        b.iter(|| {
            let found = scanner
                .collect_parallel(ValueType::Int, 4, &predicate)
                .map(|found| found.len())
                .unwrap_or_default();
            black_box(found)
        });
    });
}

criterion_group!(benches, benchmark_search, benchmark_parallel);
criterion_main!(benches);
