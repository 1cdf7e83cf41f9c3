//! File Layout Walker
//!
//! Decodes `FSCTL_QUERY_FILE_LAYOUT` response pages into layout tree nodes.
//! Each page holds offset-chained file entries; each entry links to a chain
//! of hard-link names, a chain of streams and an extra-info block. Every
//! offset is resolved against the bytes the service actually returned, so a
//! chain that runs off the page is a decode failure rather than a bad read.

use crate::error::{LayoutError, Result};
use crate::format::{
    format_grouped, format_reference, format_relative_time, format_size, name_flags_to_string,
    stream_display_name, stream_flags_to_string,
};
use crate::layout_tree::{LayoutTree, NodeId};
use crate::ntfs::structs::*;
use chrono::{DateTime, Local, Utc};
use log::{debug, error, warn};

/// Response buffer size for one page (32 MiB)
pub const DEFAULT_LAYOUT_BUFFER_SIZE: usize = 0x200_0000;

/// Number of fixed facts emitted for every file entry
pub const FILE_ENTRY_FACT_COUNT: usize = 17;

/// Outcome of a single page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// The service filled this many bytes of the output buffer
    Data(usize),
    /// The enumeration is exhausted
    EndOfData,
}

/// The filesystem query service, as seen by the walker
pub trait LayoutSource {
    /// Reference number of the file being inspected
    fn file_reference_number(&mut self) -> Result<u64>;

    /// Issue one page of the layout query into `output`
    fn query_layout(&mut self, input: &QueryFileLayoutInput, output: &mut [u8]) -> Result<PageStatus>;

    /// Metadata optimization counters; None when the query fails
    fn metadata_optimization(&mut self) -> Option<MetadataOptimization>;
}

/// Counters from one enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub pages: u32,
    pub entries: u32,
    pub names: u32,
    pub streams: u32,
}

/// Map a file path to the device path of its volume (`C:\x` -> `\\.\C:`).
///
/// Only drive-letter volumes are supported.
pub fn volume_device_path(path: &str) -> Result<String> {
    let trimmed = path.strip_prefix(r"\\?\").unwrap_or(path);

    let drive = match trimmed.split_once(':') {
        Some((drive, _)) => drive,
        None => return Err(LayoutError::NotSupported(path.to_string())),
    };

    let mut chars = drive.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            Ok(format!(r"\\.\{}:", letter.to_ascii_uppercase()))
        }
        _ => Err(LayoutError::NotSupported(path.to_string())),
    }
}

// ============================================================================
// Layout Walker
// ============================================================================

/// Turns decoded layout records into nodes of a `LayoutTree`
pub struct LayoutWalker<'t> {
    tree: &'t mut LayoutTree,
    optimization: MetadataOptimization,
    now: DateTime<Utc>,
    stats: WalkStats,
}

impl<'t> LayoutWalker<'t> {
    pub fn new(tree: &'t mut LayoutTree, optimization: MetadataOptimization) -> Self {
        Self {
            tree,
            optimization,
            now: Utc::now(),
            stats: WalkStats::default(),
        }
    }

    /// Reference time for the "ago" part of timestamps
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Issue the query page by page until the service runs dry, a page has
    /// no entries or a page fails to decode.
    pub fn run<S: LayoutSource + ?Sized>(
        &mut self,
        source: &mut S,
        mut input: QueryFileLayoutInput,
        buffer_size: usize,
    ) -> Result<WalkStats> {
        let mut buffer = vec![0u8; buffer_size];

        loop {
            debug!(
                "querying layout page {} (restart={}, frn={:#x})",
                self.stats.pages + 1,
                input.is_restart(),
                input.starting_file_reference_number
            );

            let returned = match source.query_layout(&input, &mut buffer) {
                Ok(PageStatus::Data(len)) => len.min(buffer.len()),
                Ok(PageStatus::EndOfData) => break,
                Err(e) if e.is_end_of_data() => break,
                Err(e) => {
                    warn!("layout query failed: {}", e);
                    return Err(e);
                }
            };
            if returned == 0 {
                debug!("layout query returned no bytes");
                break;
            }
            self.stats.pages += 1;

            let entries = match self.decode_page(&buffer[..returned]) {
                Ok(entries) => entries,
                Err(e) => {
                    error!("layout page {} rejected: {}", self.stats.pages, e);
                    return Err(e);
                }
            };

            if entries == 0 {
                break;
            }

            if input.is_restart() {
                input.clear_restart();
            }
        }

        debug!(
            "layout enumeration finished: {} pages, {} entries",
            self.stats.pages, self.stats.entries
        );

        Ok(self.stats)
    }

    /// Decode one response page. Returns the number of file entries found.
    pub fn decode_page(&mut self, page: &[u8]) -> Result<u32> {
        let header = QueryFileLayoutOutput::from_bytes(page)?;
        if header.file_entry_count == 0 || header.first_file_offset == 0 {
            return Ok(0);
        }

        let mut offset = header.first_file_offset as usize;
        let mut count = 0;

        loop {
            let entry = FileLayoutEntry::parse(page, offset)?;
            self.decode_entry(page, offset, &entry)?;
            count += 1;
            self.stats.entries += 1;

            if entry.next_file_offset == 0 {
                break;
            }
            offset = relative_offset(offset, entry.next_file_offset, "next file entry")?;
        }

        Ok(count)
    }

    fn decode_entry(&mut self, page: &[u8], offset: usize, entry: &FileLayoutEntry) -> Result<()> {
        let info = if entry.extra_info_offset != 0 {
            let info_offset = relative_offset(offset, entry.extra_info_offset, "extra info")?;
            FileLayoutInfoEntry::parse(page, info_offset, entry.extra_info_length)?
        } else {
            FileLayoutInfoEntry::default()
        };

        self.emit_entry_facts(entry, &info);

        if entry.first_name_offset != 0 {
            let name_offset = relative_offset(offset, entry.first_name_offset, "first name")?;
            self.decode_names(page, name_offset)?;
        }

        if entry.first_stream_offset != 0 {
            let stream_offset = relative_offset(offset, entry.first_stream_offset, "first stream")?;
            self.decode_streams(page, stream_offset)?;
        }

        Ok(())
    }

    fn emit_entry_facts(&mut self, entry: &FileLayoutEntry, info: &FileLayoutInfoEntry) {
        let opt = self.optimization;
        let facts: [(&str, String); FILE_ENTRY_FACT_COUNT] = [
            ("File reference number", format_reference(entry.file_reference_number)),
            ("File attributes", entry.file_attributes.to_string()),
            ("File entry flags", entry.flags.to_string()),
            ("Creation time", self.time(info.creation_time)),
            ("Last access time", self.time(info.last_access_time)),
            ("Last write time", self.time(info.last_write_time)),
            ("Change time", self.time(info.change_time)),
            ("LastUsn", format_grouped(info.usn.max(0) as u64)),
            ("OwnerId", info.owner_id.to_string()),
            ("SecurityId", info.security_id.to_string()),
            ("StorageReserveId", info.storage_reserve_id.to_string()),
            ("Attribute list size", format_size(opt.attribute_list_size as u64)),
            ("Metadata space used", format_size(opt.metadata_space_used as u64)),
            ("Metadata space allocated", format_size(opt.metadata_space_allocated as u64)),
            ("Number of file records", format_grouped(opt.number_of_file_records as u64)),
            (
                "Number of resident attributes",
                format_grouped(opt.number_of_resident_attributes as u64),
            ),
            (
                "Number of nonresident attributes",
                format_grouped(opt.number_of_nonresident_attributes as u64),
            ),
        ];

        for (name, value) in facts {
            self.tree.add_child(None, name, value);
        }
    }

    fn time(&self, filetime: i64) -> String {
        format_relative_time(filetime, self.now, &Local)
    }

    fn decode_names(&mut self, page: &[u8], mut offset: usize) -> Result<()> {
        loop {
            let name = FileLayoutNameEntry::parse(page, offset)?;

            let node = self
                .tree
                .add_child(None, name_flags_to_string(name.flags), name.name());
            self.tree.add_child(
                Some(node),
                "Parent ID",
                format_reference(name.parent_file_reference_number),
            );
            self.stats.names += 1;

            if name.next_name_offset == 0 {
                return Ok(());
            }
            offset = relative_offset(offset, name.next_name_offset, "next name")?;
        }
    }

    fn decode_streams(&mut self, page: &[u8], mut offset: usize) -> Result<()> {
        loop {
            // Decode everything a stream needs before emitting any of it
            let stream = StreamLayoutEntry::parse(page, offset)?;
            let extents = if stream.extent_information_offset != 0 {
                let extent_offset =
                    relative_offset(offset, stream.extent_information_offset, "extent info")?;
                Some(StreamExtentEntry::parse(page, extent_offset)?)
            } else {
                None
            };

            self.emit_stream(&stream, extents.as_ref());
            self.stats.streams += 1;

            if stream.next_stream_offset == 0 {
                return Ok(());
            }
            offset = relative_offset(offset, stream.next_stream_offset, "next stream")?;
        }
    }

    fn emit_stream(&mut self, stream: &StreamLayoutEntry, extents: Option<&StreamExtentEntry>) -> NodeId {
        let name = stream_display_name(stream.attribute_type_code, &stream.identifier());
        let node = self.tree.add_child(None, "Stream", name);

        self.tree
            .add_child(Some(node), "Attributes", stream.attribute_flags.to_string());
        self.tree.add_child(
            Some(node),
            "Attribute typecode",
            format!("0x{:x}", stream.attribute_type_code),
        );
        self.tree
            .add_child(Some(node), "Flags", stream_flags_to_string(stream.flags));
        self.tree
            .add_child(Some(node), "Size", format_size(stream.end_of_file.max(0) as u64));
        self.tree.add_child(
            Some(node),
            "Allocated Size",
            format_size(stream.allocation_size.max(0) as u64),
        );

        if let Some(extents) = extents {
            self.tree
                .add_child(Some(node), "Extents", extents.extent_count.to_string());
        }

        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_letter_paths_map_to_volume_devices() {
        assert_eq!(volume_device_path(r"C:\Windows\notepad.exe").unwrap(), r"\\.\C:");
        assert_eq!(volume_device_path(r"d:\data.bin").unwrap(), r"\\.\D:");
        assert_eq!(volume_device_path(r"\\?\E:\x").unwrap(), r"\\.\E:");
    }

    #[test]
    fn non_rooted_paths_are_not_supported() {
        for path in [r"\\server\share\file", r"relative\file", r"AB:\x", r"\\?\UNC\s\f", r"1:\x"] {
            assert!(
                matches!(volume_device_path(path), Err(LayoutError::NotSupported(_))),
                "{}",
                path
            );
        }
    }

    #[test]
    fn header_only_page_has_no_entries() {
        let mut tree = LayoutTree::new();
        let mut walker = LayoutWalker::new(&mut tree, MetadataOptimization::default());
        assert_eq!(walker.decode_page(&[0u8; QUERY_FILE_LAYOUT_OUTPUT_SIZE]).unwrap(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn short_page_is_malformed() {
        let mut tree = LayoutTree::new();
        let mut walker = LayoutWalker::new(&mut tree, MetadataOptimization::default());
        assert!(matches!(walker.decode_page(&[0u8; 4]), Err(LayoutError::Malformed(_))));
    }
}
