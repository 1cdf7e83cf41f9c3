//! NTFS layout support
//!
//! - Wire records of the file layout and allocated-range FSCTLs
//! - The layout walker that turns response pages into tree nodes
//! - The allocated-range scanner
//! - Win32 query sources (Windows only)

pub mod layout;
pub mod ranges;
pub mod structs;
#[cfg(windows)]
pub mod winapi;

pub use layout::{volume_device_path, LayoutSource, LayoutWalker, PageStatus, WalkStats};
pub use ranges::{scan_allocated_ranges, AllocatedRangeSource};
pub use structs::{AllocatedRange, AttributeType, MetadataOptimization, QueryFileLayoutInput};
#[cfg(windows)]
pub use winapi::{FileRangeSource, SafeHandle, VolumeLayoutSource};
