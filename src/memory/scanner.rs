//! Region-aware value scanning
//!
//! A scan computes its region plan once, then reads each region in chunks and
//! tests every candidate window against the predicate. Windows that straddle
//! two chunks are covered because every chunk read overlaps the next one by
//! `length - 1` bytes. Per-address failures (unmapped or unreadable pages) are
//! treated as "no match here"; anything else ends the scan.

use super::codec;
use super::reader::MemoryReader;
use super::regions::{MemoryRegion, RegionEnumerator};
use crate::config::ScannerConfig;
use crate::core::types::{
    Address, MemoryError, MemoryResult, MemoryValue, ScanPredicate, ScanType, ValueType,
};
use crate::process::ProcessHandle;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::iter::FusedIterator;
use tracing::{debug, info, trace, warn};

/// Granularity used to skip past unreadable memory
pub const PAGE_SIZE: usize = 4096;

/// Options for memory scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Start address for scanning
    pub start_address: Option<Address>,
    /// End address (exclusive) for scanning
    pub end_address: Option<Address>,
    /// Scan only writable regions
    pub writable_only: bool,
    /// Distance between candidate addresses; 1 scans every byte offset
    pub alignment: usize,
    /// Bytes tested per region read
    pub chunk_size: usize,
    /// Worker threads for [`MemoryScanner::collect_parallel`]
    pub max_threads: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for ScanOptions {
    fn from(config: &ScannerConfig) -> Self {
        ScanOptions {
            start_address: None,
            end_address: None,
            writable_only: config.writable_only,
            alignment: config.alignment,
            chunk_size: config.chunk_size,
            max_threads: config.max_threads,
        }
    }
}

impl ScanOptions {
    /// Checks the numeric options before a scan starts
    pub fn validate(&self) -> MemoryResult<()> {
        if !self.chunk_size.is_power_of_two() {
            return Err(MemoryError::InvalidOptions(format!(
                "chunk size {} is not a power of two",
                self.chunk_size
            )));
        }
        if !self.alignment.is_power_of_two() || self.alignment > self.chunk_size {
            return Err(MemoryError::InvalidOptions(format!(
                "alignment {} must be a power of two no larger than the chunk size",
                self.alignment
            )));
        }
        if self.max_threads == 0 {
            return Err(MemoryError::InvalidOptions(
                "at least one scan thread is required".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_address, self.end_address) {
            if start > end {
                return Err(MemoryError::InvalidOptions(format!(
                    "start address {} is above end address {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

/// How far a scan has got
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Bytes of the region plan already covered, readable or not
    pub scanned_bytes: usize,
    /// Total bytes in the region plan
    pub total_bytes: usize,
    /// Addresses yielded so far
    pub matches: usize,
}

/// A predicate bound reduced to what a raw window is compared against
#[derive(Debug, Clone)]
enum Bound {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Vec<u8>),
}

impl Bound {
    fn from_value(value: &MemoryValue) -> Self {
        match value {
            MemoryValue::Bool(v) => Bound::Bool(*v),
            MemoryValue::Int(v) => Bound::Int(*v),
            MemoryValue::Float(v) => Bound::Float(*v),
            MemoryValue::Text(v) => Bound::Text(v.as_bytes().to_vec()),
        }
    }

    /// Orders `window` relative to the bound without building a `MemoryValue`.
    /// Agrees with `codec::decode` followed by `MemoryValue::compare`.
    fn order(&self, window: &[u8]) -> Option<Ordering> {
        match self {
            Bound::Bool(b) => Some(codec::read_bool(window).cmp(b)),
            Bound::Int(b) => codec::read_int(window).map(|v| v.cmp(b)),
            Bound::Float(b) => codec::read_float(window).and_then(|v| v.partial_cmp(b)),
            Bound::Text(b) => {
                let text: Cow<'_, str> = String::from_utf8_lossy(codec::trim_text(window));
                Some(text.as_bytes().cmp(b.as_slice()))
            }
        }
    }
}

/// A predicate compiled for one value kind and width
#[derive(Debug, Clone)]
struct Matcher {
    scan_type: ScanType,
    lower: Bound,
    upper: Option<Bound>,
    length: usize,
}

impl Matcher {
    fn compile(kind: ValueType, length: usize, predicate: &ScanPredicate) -> MemoryResult<Self> {
        codec::check_length(kind, length)?;
        if predicate.value_type() != kind {
            return Err(MemoryError::InvalidPredicate(format!(
                "predicate compares {} values but the scan reads {}",
                predicate.value_type(),
                kind
            )));
        }

        // Bounds are compared the way a stored value would be: encoded at the
        // scan width and decoded again. Ints that do not fit keep their value.
        let predicate = predicate.map_bounds(|bound| match codec::encode(bound, kind, length) {
            Ok(bytes) => codec::decode(&bytes, kind, length),
            Err(MemoryError::ValueTooLarge { .. }) => Ok(bound.clone()),
            Err(err) => Err(err),
        })?;

        Ok(Matcher {
            scan_type: predicate.scan_type(),
            lower: Bound::from_value(predicate.value()),
            upper: predicate.upper().map(Bound::from_value),
            length,
        })
    }

    fn test(&self, window: &[u8]) -> bool {
        let lower = self.lower.order(window);
        let upper = self.upper.as_ref().and_then(|upper| upper.order(window));
        self.scan_type.accepts(lower, upper)
    }
}

/// Memory scanner for value predicates
pub struct MemoryScanner<'a> {
    handle: &'a ProcessHandle,
    options: ScanOptions,
}

impl<'a> MemoryScanner<'a> {
    /// Create a new memory scanner with default options
    pub fn new(handle: &'a ProcessHandle) -> Self {
        Self::with_options(handle, ScanOptions::default())
    }

    /// Create a new memory scanner with explicit options
    pub fn with_options(handle: &'a ProcessHandle, options: ScanOptions) -> Self {
        MemoryScanner { handle, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Starts a lazy scan for addresses whose `length`-byte value of `kind`
    /// satisfies `predicate`.
    ///
    /// Argument and handle errors are reported here, before anything is read.
    pub fn search(
        &self,
        kind: ValueType,
        length: usize,
        predicate: &ScanPredicate,
    ) -> MemoryResult<Search<'a>> {
        let (matcher, regions) = self.prepare(kind, length, predicate)?;
        debug!(
            pid = self.handle.pid(),
            kind = %kind,
            length,
            scan_type = ?predicate.scan_type(),
            regions = regions.len(),
            "Starting scan"
        );
        Search::new(self.handle, regions, matcher, &self.options)
    }

    /// Searches with a single-value comparison, `Exact` being the usual one
    pub fn search_by_value(
        &self,
        kind: ValueType,
        length: usize,
        value: impl Into<MemoryValue>,
        scan_type: ScanType,
    ) -> MemoryResult<Search<'a>> {
        let predicate = ScanPredicate::new(scan_type, value)?;
        self.search(kind, length, &predicate)
    }

    /// Searches for values in `[lower, upper]`
    pub fn search_by_value_between(
        &self,
        kind: ValueType,
        length: usize,
        lower: impl Into<MemoryValue>,
        upper: impl Into<MemoryValue>,
    ) -> MemoryResult<Search<'a>> {
        let predicate = ScanPredicate::between(lower, upper)?;
        self.search(kind, length, &predicate)
    }

    /// Scans every region on its own rayon worker and merges the results in
    /// ascending address order.
    pub fn collect_parallel(
        &self,
        kind: ValueType,
        length: usize,
        predicate: &ScanPredicate,
    ) -> MemoryResult<Vec<Address>> {
        let (matcher, regions) = self.prepare(kind, length, predicate)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.max_threads)
            .build()
            .map_err(|err| {
                MemoryError::Unknown(format!("failed to start scan threads: {}", err))
            })?;

        let handle = self.handle;
        let options = &self.options;
        let per_region: Vec<Vec<Address>> = pool.install(|| {
            regions
                .into_par_iter()
                .map(|region| {
                    Search::new(handle, vec![region], matcher.clone(), options)?.collect_all()
                })
                .collect::<MemoryResult<_>>()
        })?;

        let addresses: Vec<Address> = per_region.into_iter().flatten().collect();
        info!(
            pid = handle.pid(),
            matches = addresses.len(),
            threads = options.max_threads,
            "Parallel scan finished"
        );
        Ok(addresses)
    }

    /// Re-reads `addresses` and keeps those that still satisfy `predicate`.
    ///
    /// Addresses that became unreadable are dropped; input order is kept.
    pub fn refine(
        &self,
        addresses: &[Address],
        kind: ValueType,
        length: usize,
        predicate: &ScanPredicate,
    ) -> MemoryResult<Vec<Address>> {
        self.handle.ensure_open()?;
        let matcher = Matcher::compile(kind, length, predicate)?;
        let reader = MemoryReader::new(self.handle);

        let mut kept = Vec::new();
        for &address in addresses {
            match reader.read_bytes(address, length) {
                Ok(bytes) if matcher.test(&bytes) => kept.push(address),
                Ok(_) => {}
                Err(err) if err.is_recoverable() => {
                    trace!(address = %address, error = %err, "Dropping unreadable address");
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            before = addresses.len(),
            after = kept.len(),
            "Refined scan results"
        );
        Ok(kept)
    }

    fn prepare(
        &self,
        kind: ValueType,
        length: usize,
        predicate: &ScanPredicate,
    ) -> MemoryResult<(Matcher, Vec<MemoryRegion>)> {
        self.handle.ensure_open()?;
        let matcher = Matcher::compile(kind, length, predicate)?;
        self.options.validate()?;

        let mut enumerator = RegionEnumerator::new(self.handle);
        if let Some(start) = self.options.start_address {
            enumerator.set_start_address(start);
        }
        if let Some(end) = self.options.end_address {
            enumerator.set_max_address(end);
        }
        enumerator.set_writable_only(self.options.writable_only);

        Ok((matcher, enumerator.enumerate()?))
    }
}

/// The lazy address sequence of one scan.
///
/// Addresses come out strictly ascending. The sequence cannot be restarted;
/// dropping it early releases nothing but its buffer.
pub struct Search<'a> {
    handle: &'a ProcessHandle,
    matcher: Matcher,
    regions: Vec<MemoryRegion>,
    region_index: usize,
    alignment: usize,
    chunk_size: usize,
    /// Next address to read in the current region
    cursor: usize,
    buffer: Vec<u8>,
    buffer_base: usize,
    /// Next candidate address and the exclusive end of candidates in `buffer`
    candidate: usize,
    candidate_end: usize,
    progress: ScanProgress,
    error: Option<MemoryError>,
    done: bool,
}

impl<'a> Search<'a> {
    fn new(
        handle: &'a ProcessHandle,
        regions: Vec<MemoryRegion>,
        matcher: Matcher,
        options: &ScanOptions,
    ) -> MemoryResult<Self> {
        let window = options
            .chunk_size
            .checked_add(matcher.length - 1)
            .ok_or_else(|| {
                MemoryError::InvalidOptions("chunk size overflows with value length".to_string())
            })?;

        let total_bytes = regions.iter().map(|region| region.size).sum();
        let cursor = regions
            .first()
            .map_or(0, |region| region.base_address.as_usize());

        Ok(Search {
            handle,
            matcher,
            regions,
            region_index: 0,
            alignment: options.alignment,
            chunk_size: options.chunk_size,
            cursor,
            buffer: vec![0u8; window],
            buffer_base: 0,
            candidate: 0,
            candidate_end: 0,
            progress: ScanProgress {
                total_bytes,
                ..ScanProgress::default()
            },
            error: None,
            done: false,
        })
    }

    /// Bytes covered and matches found so far
    pub fn progress(&self) -> ScanProgress {
        self.progress
    }

    /// The error that ended the scan early, if any
    pub fn error(&self) -> Option<&MemoryError> {
        self.error.as_ref()
    }

    /// Drains the sequence, failing if the scan was cut short
    pub fn collect_all(mut self) -> MemoryResult<Vec<Address>> {
        let addresses: Vec<Address> = self.by_ref().collect();
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(addresses),
        }
    }

    fn region_end(&self) -> usize {
        self.regions[self.region_index].end_address().as_usize()
    }

    /// Moves the cursor forward within the current region, counting progress
    fn advance(&mut self, to: usize) {
        let end = self.region_end();
        let to = to.clamp(self.cursor, end);
        self.progress.scanned_bytes += to - self.cursor;
        self.cursor = to;
    }

    fn next_region(&mut self) {
        let end = self.region_end();
        self.advance(end);
        self.region_index += 1;
        if let Some(region) = self.regions.get(self.region_index) {
            self.cursor = region.base_address.as_usize();
        }
    }

    /// Loads the next readable chunk into the buffer. `false` once the plan is
    /// exhausted or a non-recoverable error stopped the scan.
    fn fill(&mut self) -> bool {
        let length = self.matcher.length;

        while self.region_index < self.regions.len() {
            let end = self.region_end();
            if end - self.cursor < length {
                self.next_region();
                continue;
            }

            let want = self.buffer.len().min(end - self.cursor);
            let address = Address::new(self.cursor);

            match self.handle.read_memory(address, &mut self.buffer[..want]) {
                Ok(read) if read >= length => {
                    let first = align_up(self.cursor, self.alignment);
                    self.buffer_base = self.cursor;
                    self.candidate = first;
                    self.candidate_end = (self.cursor + read - length + 1)
                        .min(self.cursor.saturating_add(self.chunk_size));

                    let next = if read == want {
                        self.cursor.saturating_add(self.chunk_size)
                    } else {
                        trace!(
                            address = %address,
                            read,
                            want,
                            "Short read, skipping to next page"
                        );
                        page_after(self.cursor + read)
                    };
                    self.skip_to(next);
                    return true;
                }
                Ok(read) => {
                    trace!(
                        address = %address,
                        read,
                        "Too few bytes for a window, skipping page"
                    );
                    let next = page_after(self.cursor + read);
                    self.skip_to(next);
                }
                Err(err) if err.is_recoverable() => {
                    trace!(
                        address = %address,
                        error = %err,
                        "Unreadable chunk, skipping page"
                    );
                    let next = page_after(self.cursor);
                    self.skip_to(next);
                }
                Err(err) => {
                    warn!(
                        pid = self.handle.pid(),
                        address = %address,
                        error = %err,
                        "Scan aborted"
                    );
                    self.error = Some(err);
                    return false;
                }
            }
        }

        false
    }

    fn skip_to(&mut self, next: usize) {
        if next <= self.cursor {
            // Saturated at the top of the address space
            self.next_region();
        } else {
            self.advance(next);
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.candidate = self.candidate_end;
        if self.error.is_none() {
            debug!(
                pid = self.handle.pid(),
                matches = self.progress.matches,
                scanned_bytes = self.progress.scanned_bytes,
                "Scan finished"
            );
        }
    }
}

impl Iterator for Search<'_> {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        loop {
            if self.done {
                return None;
            }

            while self.candidate < self.candidate_end {
                let address = self.candidate;
                self.candidate = address
                    .checked_add(self.alignment)
                    .unwrap_or(self.candidate_end);

                let offset = address - self.buffer_base;
                if self.matcher.test(&self.buffer[offset..offset + self.matcher.length]) {
                    self.progress.matches += 1;
                    return Some(Address::new(address));
                }
            }

            if !self.fill() {
                self.finish();
            }
        }
    }
}

impl FusedIterator for Search<'_> {}

/// Start of the page following the one containing `address`
fn page_after(address: usize) -> usize {
    Address::new(address).next_page(PAGE_SIZE).as_usize()
}

fn align_up(address: usize, alignment: usize) -> usize {
    match address % alignment {
        0 => address,
        rest => address.saturating_add(alignment - rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessAccess;
    use crate::testing::FakeProcess;

    fn ints(size: usize, values: &[(usize, i32)]) -> Vec<u8> {
        let mut data = vec![0u8; size];
        for &(offset, value) in values {
            data[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
        }
        data
    }

    fn handle(fake: FakeProcess) -> ProcessHandle {
        ProcessHandle::from_backend(9, ProcessAccess::ALL, Box::new(fake))
    }

    fn options(chunk_size: usize) -> ScanOptions {
        ScanOptions {
            chunk_size,
            ..ScanOptions::default()
        }
    }

    #[test]
    fn test_exact_search_finds_unaligned_values() {
        let data = ints(0x100, &[(0x03, 777), (0x41, 777), (0xFC, 777)]);
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::new(&handle);

        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Int, 4, 777, ScanType::Exact)
            .unwrap()
            .collect();
        assert_eq!(
            found,
            vec![Address::new(0x1003), Address::new(0x1041), Address::new(0x10FC)]
        );
    }

    #[test]
    fn test_windows_straddling_chunks() {
        let data = ints(0x100, &[(0x0E, 42), (0x1F, 42), (0x24, 7)]);
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::with_options(&handle, options(16));

        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Int, 4, 42, ScanType::Exact)
            .unwrap()
            .collect();
        assert_eq!(found, vec![Address::new(0x100E), Address::new(0x101F)]);
    }

    #[test]
    fn test_alignment() {
        let data = ints(0x40, &[(0x03, 5), (0x08, 5)]);
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::with_options(
            &handle,
            ScanOptions {
                alignment: 4,
                ..options(16)
            },
        );

        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Int, 4, 5, ScanType::Exact)
            .unwrap()
            .collect();
        assert_eq!(found, vec![Address::new(0x1008)]);
    }

    #[test]
    fn test_regions_in_ascending_order() {
        let high = ints(0x20, &[(0x00, 3)]);
        let low = ints(0x20, &[(0x10, 3)]);
        let handle = handle(
            FakeProcess::new()
                .with_region(0x8000, high, true)
                .with_region(0x2000, low, false),
        );
        let scanner = MemoryScanner::new(&handle);

        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Int, 4, 3, ScanType::Exact)
            .unwrap()
            .collect();
        assert_eq!(found, vec![Address::new(0x2010), Address::new(0x8000)]);

        let writable = MemoryScanner::with_options(
            &handle,
            ScanOptions {
                writable_only: true,
                ..ScanOptions::default()
            },
        );
        let found: Vec<Address> = writable
            .search_by_value(ValueType::Int, 4, 3, ScanType::Exact)
            .unwrap()
            .collect();
        assert_eq!(found, vec![Address::new(0x8000)]);
    }

    #[test]
    fn test_unreadable_pages_are_skipped() {
        let data = ints(
            3 * PAGE_SIZE,
            &[(0x10, 9), (PAGE_SIZE + 4, 9), (2 * PAGE_SIZE + 8, 9)],
        );
        let hole = 0x10000 + PAGE_SIZE..0x10000 + 2 * PAGE_SIZE;
        let handle = handle(
            FakeProcess::new()
                .with_region(0x10000, data, true)
                .with_hole(hole),
        );
        let scanner = MemoryScanner::with_options(&handle, options(1024));

        let mut search = scanner
            .search_by_value(ValueType::Int, 4, 9, ScanType::Exact)
            .unwrap();
        let found: Vec<Address> = search.by_ref().collect();

        assert_eq!(
            found,
            vec![Address::new(0x10010), Address::new(0x10000 + 2 * PAGE_SIZE + 8)]
        );
        assert!(search.error().is_none());

        let progress = search.progress();
        assert_eq!(progress.total_bytes, 3 * PAGE_SIZE);
        assert_eq!(progress.scanned_bytes, 3 * PAGE_SIZE);
        assert_eq!(progress.matches, 2);
    }

    #[test]
    fn test_between_and_relational() {
        let data = ints(
            0x20,
            &[
                (0x00, 11999),
                (0x04, 12000),
                (0x08, 12345),
                (0x0C, 13000),
                (0x10, 13001),
            ],
        );
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::with_options(
            &handle,
            ScanOptions {
                alignment: 4,
                ..ScanOptions::default()
            },
        );

        let found: Vec<usize> = scanner
            .search_by_value_between(ValueType::Int, 4, 12000, 13000)
            .unwrap()
            .map(|a| a.as_usize())
            .collect();
        assert_eq!(found, vec![0x1004, 0x1008, 0x100C]);

        let found: Vec<usize> = scanner
            .search_by_value(ValueType::Int, 4, 13000, ScanType::BiggerOrEqual)
            .unwrap()
            .map(|a| a.as_usize())
            .collect();
        assert_eq!(found, vec![0x100C, 0x1010]);
    }

    #[test]
    fn test_float_bounds_use_scan_width() {
        let mut data = vec![0u8; 8];
        data[..4].copy_from_slice(&0.1f32.to_ne_bytes());
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::new(&handle);

        // 0.1f64 is not representable as f32; the bound is narrowed first
        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Float, 4, 0.1, ScanType::Exact)
            .unwrap()
            .collect();
        assert_eq!(found, vec![Address::new(0x1000)]);
    }

    #[test]
    fn test_out_of_range_int_bound() {
        let data = vec![0x7F, 0x80, 0x00];
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::new(&handle);

        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Int, 1, 1000, ScanType::SmallerThan)
            .unwrap()
            .collect();
        assert_eq!(found.len(), 3);

        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Int, 1, 1000, ScanType::Exact)
            .unwrap()
            .collect();
        assert!(found.is_empty());
    }

    #[test]
    fn test_text_search() {
        let mut data = vec![0u8; 0x40];
        data[0x11..0x16].copy_from_slice(b"HELLO");
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::new(&handle);

        let found: Vec<Address> = scanner
            .search_by_value(ValueType::Text, 5, "HELLO", ScanType::Exact)
            .unwrap()
            .collect();
        assert_eq!(found, vec![Address::new(0x1011)]);
    }

    #[test]
    fn test_search_argument_errors() {
        let handle = handle(FakeProcess::new().with_region(0x1000, vec![0; 16], true));
        let scanner = MemoryScanner::new(&handle);

        assert!(matches!(
            scanner.search_by_value(ValueType::Int, 3, 1, ScanType::Exact),
            Err(MemoryError::LengthMismatch { .. })
        ));
        assert!(matches!(
            scanner.search_by_value(ValueType::Int, 4, 1.5, ScanType::Exact),
            Err(MemoryError::InvalidPredicate(_))
        ));
        assert!(matches!(
            scanner.search_by_value(ValueType::Int, 4, 1, ScanType::Between),
            Err(MemoryError::InvalidPredicate(_))
        ));
        assert!(matches!(
            scanner.search_by_value_between(ValueType::Int, 4, 10, 1),
            Err(MemoryError::InvalidPredicate(_))
        ));

        let bad = MemoryScanner::with_options(&handle, options(1000));
        assert!(matches!(
            bad.search_by_value(ValueType::Int, 4, 1, ScanType::Exact),
            Err(MemoryError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_search_on_closed_handle() {
        let mut handle = handle(FakeProcess::new().with_region(0x1000, vec![0; 16], true));
        handle.close().unwrap();
        let scanner = MemoryScanner::new(&handle);
        assert!(matches!(
            scanner.search_by_value(ValueType::Int, 4, 0, ScanType::Exact),
            Err(MemoryError::HandleClosed(9))
        ));
    }

    #[test]
    fn test_search_is_lazy_and_fused() {
        let data = ints(0x20, &[(0x00, 1), (0x08, 1)]);
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::new(&handle);

        let mut search = scanner
            .search_by_value(ValueType::Int, 4, 1, ScanType::Exact)
            .unwrap();
        assert_eq!(search.next(), Some(Address::new(0x1000)));
        assert_eq!(search.progress().matches, 1);
        assert_eq!(search.next(), Some(Address::new(0x1008)));
        assert_eq!(search.next(), None);
        assert_eq!(search.next(), None);
    }

    #[test]
    fn test_collect_parallel_matches_sequential() {
        let mut fake = FakeProcess::new();
        for i in 0..8 {
            let base = 0x10000 * (8 - i);
            fake = fake.with_region(base, ints(0x100, &[(i, 55), (0x80 + i, 55)]), true);
        }
        let handle = handle(fake);
        let scanner = MemoryScanner::with_options(
            &handle,
            ScanOptions {
                max_threads: 4,
                ..options(64)
            },
        );
        let predicate = ScanPredicate::exact(55);

        let sequential: Vec<Address> = scanner
            .search(ValueType::Int, 4, &predicate)
            .unwrap()
            .collect();
        let parallel = scanner
            .collect_parallel(ValueType::Int, 4, &predicate)
            .unwrap();

        assert_eq!(sequential.len(), 16);
        assert_eq!(parallel, sequential);
        assert!(parallel.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_refine() {
        let data = ints(0x20, &[(0x00, 10), (0x04, 20), (0x08, 10)]);
        let handle = handle(FakeProcess::new().with_region(0x1000, data, true));
        let scanner = MemoryScanner::new(&handle);

        let candidates = [
            Address::new(0x1008),
            Address::new(0x1000),
            Address::new(0x1004),
            Address::new(0x9000),
        ];
        let kept = scanner
            .refine(&candidates, ValueType::Int, 4, &ScanPredicate::exact(10))
            .unwrap();
        assert_eq!(kept, vec![Address::new(0x1008), Address::new(0x1000)]);
    }

    #[test]
    fn test_options_from_config() {
        let config = ScannerConfig {
            alignment: 8,
            writable_only: true,
            ..ScannerConfig::default()
        };
        let options = ScanOptions::from(&config);
        assert_eq!(options.alignment, 8);
        assert!(options.writable_only);
        assert_eq!(options.chunk_size, config.chunk_size);
        assert!(options.validate().is_ok());
    }
}
