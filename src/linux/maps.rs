//! `/proc/<pid>/maps` parsing

use super::open_error;
use crate::core::types::{Address, MemoryResult, ProcessId};
use crate::memory::regions::{MemoryRegion, ProtectionFlags};
use std::fs;
use tracing::trace;

/// Reads the current memory map of `pid`
pub fn read_maps(pid: ProcessId) -> MemoryResult<Vec<MemoryRegion>> {
    let contents = fs::read(format!("/proc/{}/maps", pid)).map_err(|err| open_error(pid, err))?;
    Ok(parse_maps(&String::from_utf8_lossy(&contents)))
}

/// Parses the text of a maps file, skipping lines it cannot understand
pub fn parse_maps(contents: &str) -> Vec<MemoryRegion> {
    contents
        .lines()
        .filter_map(|line| {
            let region = parse_line(line);
            if region.is_none() && !line.trim().is_empty() {
                trace!(line, "Skipping malformed maps line");
            }
            region
        })
        .collect()
}

// 7f1c2a000000-7f1c2a021000 rw-p 00000000 00:00 0          [heap]
fn parse_line(line: &str) -> Option<MemoryRegion> {
    let mut fields = line.split_whitespace();
    let (start, end) = fields.next()?.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    let protection = ProtectionFlags::from_maps(fields.next()?);

    if end <= start {
        return None;
    }

    // offset, device and inode precede the optional path, which may contain spaces
    let path = fields.skip(3).collect::<Vec<_>>().join(" ");
    let region = MemoryRegion::new(Address::new(start), end - start, protection);

    Some(if path.is_empty() {
        region
    } else {
        region.with_path(path)
    })
}
