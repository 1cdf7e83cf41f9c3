//! File layout query structures and constants
//!
//! Wire formats of `FSCTL_QUERY_FILE_LAYOUT`, `FSCTL_QUERY_ALLOCATED_RANGES`
//! and `FSCTL_QUERY_FILE_METADATA_OPTIMIZATION`. Every decoder checks the
//! record against the bytes actually returned before reading it; decoded
//! entries borrow from the response buffer and never outlive it.

use crate::error::{LayoutError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use std::io::Cursor;

// ============================================================================
// Layout Constants
// ============================================================================

/// Only supported `FILE_LAYOUT_ENTRY` version
pub const FILE_LAYOUT_ENTRY_VERSION: u32 = 0x1;

/// Only supported `STREAM_LAYOUT_ENTRY` version
pub const STREAM_LAYOUT_ENTRY_VERSION: u32 = 0x1;

// QUERY_FILE_LAYOUT_INPUT flags
pub const QUERY_FILE_LAYOUT_RESTART: u32 = 0x0000_0001;
pub const QUERY_FILE_LAYOUT_INCLUDE_NAMES: u32 = 0x0000_0002;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAMS: u32 = 0x0000_0004;
pub const QUERY_FILE_LAYOUT_INCLUDE_EXTENTS: u32 = 0x0000_0008;
pub const QUERY_FILE_LAYOUT_INCLUDE_EXTRA_INFO: u32 = 0x0000_0010;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAMS_WITH_NO_CLUSTERS_ALLOCATED: u32 = 0x0000_0020;
pub const QUERY_FILE_LAYOUT_INCLUDE_FULL_PATH_IN_NAMES: u32 = 0x0000_0040;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION: u32 = 0x0000_0080;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_DSC_ATTRIBUTE: u32 = 0x0000_0100;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_TXF_ATTRIBUTE: u32 = 0x0000_0200;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_EFS_ATTRIBUTE: u32 = 0x0000_0400;
pub const QUERY_FILE_LAYOUT_INCLUDE_FILES_WITH_DSC_ATTRIBUTE: u32 = 0x0000_1000;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_DATA_ATTRIBUTE: u32 = 0x0000_2000;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_REPARSE_ATTRIBUTE: u32 = 0x0000_4000;
pub const QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_EA_ATTRIBUTE: u32 = 0x0000_8000;

/// Every optional section the inspector asks for
pub const QUERY_FILE_LAYOUT_INCLUDE_ALL: u32 = QUERY_FILE_LAYOUT_INCLUDE_NAMES
    | QUERY_FILE_LAYOUT_INCLUDE_STREAMS
    | QUERY_FILE_LAYOUT_INCLUDE_EXTENTS
    | QUERY_FILE_LAYOUT_INCLUDE_EXTRA_INFO
    | QUERY_FILE_LAYOUT_INCLUDE_STREAMS_WITH_NO_CLUSTERS_ALLOCATED
    | QUERY_FILE_LAYOUT_INCLUDE_FULL_PATH_IN_NAMES
    | QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION
    | QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_DSC_ATTRIBUTE
    | QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_TXF_ATTRIBUTE
    | QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_EFS_ATTRIBUTE
    | QUERY_FILE_LAYOUT_INCLUDE_FILES_WITH_DSC_ATTRIBUTE
    | QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_DATA_ATTRIBUTE
    | QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_REPARSE_ATTRIBUTE
    | QUERY_FILE_LAYOUT_INCLUDE_STREAM_INFORMATION_FOR_EA_ATTRIBUTE;

/// `QUERY_FILE_LAYOUT_FILTER_TYPE_FILEID`
pub const QUERY_FILE_LAYOUT_FILTER_TYPE_FILEID: u32 = 2;

// FILE_LAYOUT_NAME_ENTRY flags
pub const FILE_LAYOUT_NAME_ENTRY_PRIMARY: u32 = 0x0000_0001;
pub const FILE_LAYOUT_NAME_ENTRY_DOS: u32 = 0x0000_0002;

// STREAM_LAYOUT_ENTRY flags
pub const STREAM_LAYOUT_ENTRY_IMMOVABLE: u32 = 0x0000_0001;
pub const STREAM_LAYOUT_ENTRY_PINNED: u32 = 0x0000_0002;
pub const STREAM_LAYOUT_ENTRY_RESIDENT: u32 = 0x0000_0004;
pub const STREAM_LAYOUT_ENTRY_NO_CLUSTERS_ALLOCATED: u32 = 0x0000_0008;
pub const STREAM_LAYOUT_ENTRY_HAS_INFORMATION: u32 = 0x0000_0010;

// Fixed record sizes (without trailing variable-length names)
pub const QUERY_FILE_LAYOUT_INPUT_SIZE: usize = 32;
pub const QUERY_FILE_LAYOUT_OUTPUT_SIZE: usize = 16;
pub const FILE_LAYOUT_ENTRY_SIZE: usize = 40;
pub const FILE_LAYOUT_NAME_ENTRY_SIZE: usize = 24;
pub const FILE_LAYOUT_INFO_ENTRY_MIN_SIZE: usize = 56;
pub const STREAM_LAYOUT_ENTRY_SIZE: usize = 48;
pub const STREAM_EXTENT_ENTRY_MIN_SIZE: usize = 12;
pub const METADATA_OPTIMIZATION_OUTPUT_SIZE: usize = 36;
pub const ALLOCATED_RANGE_SIZE: usize = 16;

/// Borrow `len` bytes at `offset`, or fail with a decode error naming `what`
fn record_slice<'a>(buf: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .map(|end| &buf[offset..end])
        .ok_or_else(|| {
            LayoutError::Malformed(format!(
                "{} at offset {:#x} ({} bytes) exceeds returned data ({} bytes)",
                what,
                offset,
                len,
                buf.len()
            ))
        })
}

/// Resolve an offset relative to a record's own position
pub fn relative_offset(base: usize, offset: u32, what: &str) -> Result<usize> {
    base.checked_add(offset as usize)
        .ok_or_else(|| LayoutError::Malformed(format!("{} offset {:#x} overflows", what, offset)))
}

fn utf16_to_string(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

// ============================================================================
// Attribute Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AttributeType {
    StandardInformation = 0x10,
    AttributeList = 0x20,
    FileName = 0x30,
    ObjectId = 0x40,
    SecurityDescriptor = 0x50,
    VolumeName = 0x60,
    VolumeInformation = 0x70,
    Data = 0x80,
    IndexRoot = 0x90,
    IndexAllocation = 0xA0,
    Bitmap = 0xB0,
    ReparsePoint = 0xC0,
    EaInformation = 0xD0,
    Ea = 0xE0,
    LoggedUtilityStream = 0x100,
}

impl AttributeType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x10 => Some(Self::StandardInformation),
            0x20 => Some(Self::AttributeList),
            0x30 => Some(Self::FileName),
            0x40 => Some(Self::ObjectId),
            0x50 => Some(Self::SecurityDescriptor),
            0x60 => Some(Self::VolumeName),
            0x70 => Some(Self::VolumeInformation),
            0x80 => Some(Self::Data),
            0x90 => Some(Self::IndexRoot),
            0xA0 => Some(Self::IndexAllocation),
            0xB0 => Some(Self::Bitmap),
            0xC0 => Some(Self::ReparsePoint),
            0xD0 => Some(Self::EaInformation),
            0xE0 => Some(Self::Ea),
            0x100 => Some(Self::LoggedUtilityStream),
            _ => None,
        }
    }

    /// NTFS system name of the attribute type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardInformation => "$STANDARD_INFORMATION",
            Self::AttributeList => "$ATTRIBUTE_LIST",
            Self::FileName => "$FILE_NAME",
            Self::ObjectId => "$OBJECT_ID",
            Self::SecurityDescriptor => "$SECURITY_DESCRIPTOR",
            Self::VolumeName => "$VOLUME_NAME",
            Self::VolumeInformation => "$VOLUME_INFORMATION",
            Self::Data => "$DATA",
            Self::IndexRoot => "$INDEX_ROOT",
            Self::IndexAllocation => "$INDEX_ALLOCATION",
            Self::Bitmap => "$BITMAP",
            Self::ReparsePoint => "$REPARSE_POINT",
            Self::EaInformation => "$EA_INFORMATION",
            Self::Ea => "$EA",
            Self::LoggedUtilityStream => "$LOGGED_UTILITY_STREAM",
        }
    }
}

// ============================================================================
// Query Input (QUERY_FILE_LAYOUT_INPUT)
// ============================================================================

/// Request state for `FSCTL_QUERY_FILE_LAYOUT`, filtered to a file
/// reference range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFileLayoutInput {
    pub flags: u32,
    pub starting_file_reference_number: u64,
    pub ending_file_reference_number: u64,
}

impl QueryFileLayoutInput {
    /// Cursor pinned to a single file, restarting the enumeration
    pub fn for_file(reference_number: u64, include_flags: u32) -> Self {
        Self {
            flags: include_flags | QUERY_FILE_LAYOUT_RESTART,
            starting_file_reference_number: reference_number,
            ending_file_reference_number: reference_number,
        }
    }

    pub fn is_restart(&self) -> bool {
        self.flags & QUERY_FILE_LAYOUT_RESTART != 0
    }

    /// Continue from the service's own cursor on the next page
    pub fn clear_restart(&mut self) {
        self.flags &= !QUERY_FILE_LAYOUT_RESTART;
    }

    /// Serialize into the 32-byte input structure
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(QUERY_FILE_LAYOUT_INPUT_SIZE);
        // Writes into a Vec cannot fail.
        let _ = out.write_u32::<LittleEndian>(1); // FilterEntryCount
        let _ = out.write_u32::<LittleEndian>(self.flags);
        let _ = out.write_u32::<LittleEndian>(QUERY_FILE_LAYOUT_FILTER_TYPE_FILEID);
        let _ = out.write_u32::<LittleEndian>(0); // Reserved
        let _ = out.write_u64::<LittleEndian>(self.starting_file_reference_number);
        let _ = out.write_u64::<LittleEndian>(self.ending_file_reference_number);
        out
    }
}

// ============================================================================
// Query Output Header (QUERY_FILE_LAYOUT_OUTPUT)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct QueryFileLayoutOutput {
    pub file_entry_count: u32,
    pub first_file_offset: u32,
    pub flags: u32,
}

impl QueryFileLayoutOutput {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let raw = record_slice(data, 0, QUERY_FILE_LAYOUT_OUTPUT_SIZE, "layout output header")?;
        let mut cursor = Cursor::new(raw);

        Ok(Self {
            file_entry_count: cursor.read_u32::<LittleEndian>()?,
            first_file_offset: cursor.read_u32::<LittleEndian>()?,
            flags: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

// ============================================================================
// File Layout Entry (FILE_LAYOUT_ENTRY)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FileLayoutEntry {
    pub version: u32,
    pub next_file_offset: u32,
    pub flags: u32,
    pub file_attributes: u32,
    pub file_reference_number: u64,
    pub first_name_offset: u32,
    pub first_stream_offset: u32,
    pub extra_info_offset: u32,
    pub extra_info_length: u32,
}

impl FileLayoutEntry {
    /// Parse the entry at `offset`, rejecting unknown versions
    pub fn parse(buf: &[u8], offset: usize) -> Result<Self> {
        let raw = record_slice(buf, offset, FILE_LAYOUT_ENTRY_SIZE, "file layout entry")?;
        let mut cursor = Cursor::new(raw);

        let entry = Self {
            version: cursor.read_u32::<LittleEndian>()?,
            next_file_offset: cursor.read_u32::<LittleEndian>()?,
            flags: cursor.read_u32::<LittleEndian>()?,
            file_attributes: cursor.read_u32::<LittleEndian>()?,
            file_reference_number: cursor.read_u64::<LittleEndian>()?,
            first_name_offset: cursor.read_u32::<LittleEndian>()?,
            first_stream_offset: cursor.read_u32::<LittleEndian>()?,
            extra_info_offset: cursor.read_u32::<LittleEndian>()?,
            extra_info_length: cursor.read_u32::<LittleEndian>()?,
        };

        if entry.version != FILE_LAYOUT_ENTRY_VERSION {
            return Err(LayoutError::UnsupportedVersion {
                record: "file layout entry",
                found: entry.version,
                expected: FILE_LAYOUT_ENTRY_VERSION,
            });
        }

        Ok(entry)
    }
}

// ============================================================================
// Name Entry (FILE_LAYOUT_NAME_ENTRY)
// ============================================================================

/// One hard-link name; the name bytes borrow from the response buffer
#[derive(Debug, Clone)]
pub struct FileLayoutNameEntry<'a> {
    pub next_name_offset: u32,
    pub flags: u32,
    pub parent_file_reference_number: u64,
    pub file_name: &'a [u8],
}

impl<'a> FileLayoutNameEntry<'a> {
    pub fn parse(buf: &'a [u8], offset: usize) -> Result<Self> {
        let raw = record_slice(buf, offset, FILE_LAYOUT_NAME_ENTRY_SIZE, "name entry")?;
        let mut cursor = Cursor::new(raw);

        let next_name_offset = cursor.read_u32::<LittleEndian>()?;
        let flags = cursor.read_u32::<LittleEndian>()?;
        let parent_file_reference_number = cursor.read_u64::<LittleEndian>()?;
        let file_name_length = cursor.read_u32::<LittleEndian>()? as usize;

        let file_name = record_slice(
            buf,
            offset + FILE_LAYOUT_NAME_ENTRY_SIZE,
            file_name_length,
            "file name",
        )?;

        Ok(Self {
            next_name_offset,
            flags,
            parent_file_reference_number,
            file_name,
        })
    }

    pub fn name(&self) -> String {
        utf16_to_string(self.file_name)
    }
}

// ============================================================================
// Extra Info (FILE_LAYOUT_INFO_ENTRY)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FileLayoutInfoEntry {
    pub creation_time: i64,
    pub last_access_time: i64,
    pub last_write_time: i64,
    pub change_time: i64,
    pub file_attributes: u32,
    pub owner_id: u32,
    pub security_id: u32,
    pub usn: i64,
    /// Absent on systems that emit the shorter pre-storage-reserve block
    pub storage_reserve_id: u32,
}

impl FileLayoutInfoEntry {
    /// Parse the block at `offset`; `declared_length` is the entry's
    /// `ExtraInfoLength`
    pub fn parse(buf: &[u8], offset: usize, declared_length: u32) -> Result<Self> {
        let raw = record_slice(buf, offset, FILE_LAYOUT_INFO_ENTRY_MIN_SIZE, "extra info")?;
        let mut cursor = Cursor::new(raw);

        let mut info = Self {
            creation_time: cursor.read_i64::<LittleEndian>()?,
            last_access_time: cursor.read_i64::<LittleEndian>()?,
            last_write_time: cursor.read_i64::<LittleEndian>()?,
            change_time: cursor.read_i64::<LittleEndian>()?,
            file_attributes: cursor.read_u32::<LittleEndian>()?,
            ..Default::default()
        };
        let _padding = cursor.read_u32::<LittleEndian>()?;
        info.owner_id = cursor.read_u32::<LittleEndian>()?;
        info.security_id = cursor.read_u32::<LittleEndian>()?;
        info.usn = cursor.read_i64::<LittleEndian>()?;

        if declared_length as usize >= FILE_LAYOUT_INFO_ENTRY_MIN_SIZE + 4 {
            let raw = record_slice(buf, offset + FILE_LAYOUT_INFO_ENTRY_MIN_SIZE, 4, "storage reserve id")?;
            info.storage_reserve_id = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        }

        Ok(info)
    }
}

// ============================================================================
// Stream Entry (STREAM_LAYOUT_ENTRY)
// ============================================================================

/// One data/attribute stream; the identifier borrows from the response buffer
#[derive(Debug, Clone)]
pub struct StreamLayoutEntry<'a> {
    pub version: u32,
    pub next_stream_offset: u32,
    pub flags: u32,
    pub extent_information_offset: u32,
    pub allocation_size: i64,
    pub end_of_file: i64,
    pub stream_information_offset: u32,
    pub attribute_type_code: u32,
    pub attribute_flags: u32,
    pub stream_identifier: &'a [u8],
}

impl<'a> StreamLayoutEntry<'a> {
    /// Parse the stream at `offset`, rejecting unknown versions
    pub fn parse(buf: &'a [u8], offset: usize) -> Result<Self> {
        let raw = record_slice(buf, offset, STREAM_LAYOUT_ENTRY_SIZE, "stream entry")?;
        let mut cursor = Cursor::new(raw);

        let version = cursor.read_u32::<LittleEndian>()?;
        if version != STREAM_LAYOUT_ENTRY_VERSION {
            return Err(LayoutError::UnsupportedVersion {
                record: "stream entry",
                found: version,
                expected: STREAM_LAYOUT_ENTRY_VERSION,
            });
        }

        let next_stream_offset = cursor.read_u32::<LittleEndian>()?;
        let flags = cursor.read_u32::<LittleEndian>()?;
        let extent_information_offset = cursor.read_u32::<LittleEndian>()?;
        let allocation_size = cursor.read_i64::<LittleEndian>()?;
        let end_of_file = cursor.read_i64::<LittleEndian>()?;
        let stream_information_offset = cursor.read_u32::<LittleEndian>()?;
        let attribute_type_code = cursor.read_u32::<LittleEndian>()?;
        let attribute_flags = cursor.read_u32::<LittleEndian>()?;
        let identifier_length = cursor.read_u32::<LittleEndian>()? as usize;

        let stream_identifier = record_slice(
            buf,
            offset + STREAM_LAYOUT_ENTRY_SIZE,
            identifier_length,
            "stream identifier",
        )?;

        Ok(Self {
            version,
            next_stream_offset,
            flags,
            extent_information_offset,
            allocation_size,
            end_of_file,
            stream_information_offset,
            attribute_type_code,
            attribute_flags,
            stream_identifier,
        })
    }

    pub fn identifier(&self) -> String {
        utf16_to_string(self.stream_identifier)
    }
}

// ============================================================================
// Extent Summary (STREAM_EXTENT_ENTRY)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct StreamExtentEntry {
    pub flags: u32,
    /// `ExtentInformation.RetrievalPointers.ExtentCount`
    pub extent_count: u32,
}

impl StreamExtentEntry {
    pub fn parse(buf: &[u8], offset: usize) -> Result<Self> {
        let raw = record_slice(buf, offset, STREAM_EXTENT_ENTRY_MIN_SIZE, "extent entry")?;
        let mut cursor = Cursor::new(raw);

        let flags = cursor.read_u32::<LittleEndian>()?;
        let _padding = cursor.read_u32::<LittleEndian>()?;
        let extent_count = cursor.read_u32::<LittleEndian>()?;

        Ok(Self { flags, extent_count })
    }
}

// ============================================================================
// Metadata Optimization (FILE_QUERY_METADATA_OPTIMIZATION_OUTPUT)
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataOptimization {
    pub state: u32,
    pub attribute_list_size: u32,
    pub metadata_space_used: u32,
    pub metadata_space_allocated: u32,
    pub number_of_file_records: u32,
    pub number_of_resident_attributes: u32,
    pub number_of_nonresident_attributes: u32,
    pub total_in_progress: u32,
    pub total_pending: u32,
}

impl MetadataOptimization {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < METADATA_OPTIMIZATION_OUTPUT_SIZE {
            return None;
        }

        let mut cursor = Cursor::new(data);

        Some(Self {
            state: cursor.read_u32::<LittleEndian>().ok()?,
            attribute_list_size: cursor.read_u32::<LittleEndian>().ok()?,
            metadata_space_used: cursor.read_u32::<LittleEndian>().ok()?,
            metadata_space_allocated: cursor.read_u32::<LittleEndian>().ok()?,
            number_of_file_records: cursor.read_u32::<LittleEndian>().ok()?,
            number_of_resident_attributes: cursor.read_u32::<LittleEndian>().ok()?,
            number_of_nonresident_attributes: cursor.read_u32::<LittleEndian>().ok()?,
            total_in_progress: cursor.read_u32::<LittleEndian>().ok()?,
            total_pending: cursor.read_u32::<LittleEndian>().ok()?,
        })
    }
}

// ============================================================================
// Allocated Ranges (FILE_ALLOCATED_RANGE_BUFFER)
// ============================================================================

/// A byte range of a file that is backed by storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatedRange {
    pub offset: u64,
    pub length: u64,
}

impl AllocatedRange {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    pub fn to_bytes(&self) -> [u8; ALLOCATED_RANGE_SIZE] {
        let mut out = [0u8; ALLOCATED_RANGE_SIZE];
        out[0..8].copy_from_slice(&(self.offset as i64).to_le_bytes());
        out[8..16].copy_from_slice(&(self.length as i64).to_le_bytes());
        out
    }

    /// Decode every complete range in a response buffer
    pub fn parse_all(data: &[u8]) -> Vec<Self> {
        data.chunks_exact(ALLOCATED_RANGE_SIZE)
            .map(|chunk| {
                let offset = i64::from_le_bytes(chunk[0..8].try_into().unwrap_or([0; 8]));
                let length = i64::from_le_bytes(chunk[8..16].try_into().unwrap_or([0; 8]));
                Self::new(offset.max(0) as u64, length.max(0) as u64)
            })
            .collect()
    }
}

// ============================================================================
// FILETIME conversion utilities
// ============================================================================

/// 1970-01-01 in 100-nanosecond intervals since 1601
pub const FILETIME_UNIX_EPOCH: i64 = 116_444_736_000_000_000;

/// Convert Windows FILETIME to chrono DateTime, keeping pre-1970 values
pub fn filetime_to_datetime(filetime: i64) -> DateTime<Utc> {
    let ticks = filetime.saturating_sub(FILETIME_UNIX_EPOCH);
    let secs = ticks.div_euclid(10_000_000);
    let nanos = (ticks.rem_euclid(10_000_000) * 100) as u32;

    DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
