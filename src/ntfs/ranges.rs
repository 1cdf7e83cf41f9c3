//! Allocated range scanning
//!
//! Walks the populated byte ranges of a (possibly sparse) file through
//! `FSCTL_QUERY_ALLOCATED_RANGES`, one window at a time.

use crate::error::{LayoutError, Result};
use crate::ntfs::structs::AllocatedRange;
use log::debug;

/// The allocated-ranges query service
pub trait AllocatedRangeSource {
    /// Current size of the file in bytes
    fn file_size(&mut self) -> Result<u64>;

    /// Populated ranges inside `window`; an empty result ends the scan
    fn query_ranges(&mut self, window: AllocatedRange) -> Result<Vec<AllocatedRange>>;
}

/// Report every allocated range to `callback` as `(offset, length)`.
///
/// Stops early, successfully, when the callback returns false. Returns the
/// number of ranges reported.
pub fn scan_allocated_ranges<S, F>(source: &mut S, mut callback: F) -> Result<u64>
where
    S: AllocatedRangeSource + ?Sized,
    F: FnMut(u64, u64) -> bool,
{
    let file_size = source.file_size()?;
    let mut cursor = 0u64;
    let mut reported = 0u64;

    while cursor < file_size {
        let window = AllocatedRange::new(cursor, file_size - cursor);
        let ranges = source.query_ranges(window)?;

        let Some(last) = ranges.last().copied() else {
            break;
        };
        debug!("{} allocated ranges in window {:#x}+{:#x}", ranges.len(), window.offset, window.length);

        for range in &ranges {
            reported += 1;
            if !callback(range.offset, range.length) {
                return Ok(reported);
            }
        }

        let next = last.end();
        if next <= cursor {
            return Err(LayoutError::Malformed(format!(
                "allocated ranges did not advance past {:#x}",
                cursor
            )));
        }
        cursor = next;
    }

    Ok(reported)
}
