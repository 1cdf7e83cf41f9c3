//! Windows API bindings for layout queries
//!
//! Safe wrappers around the Win32 calls the inspector needs: opening the
//! target file and its volume, and issuing the layout, metadata and
//! allocated-range FSCTLs.

use crate::error::{LayoutError, Result, ERROR_HANDLE_EOF};
use crate::ntfs::layout::{volume_device_path, LayoutSource, PageStatus};
use crate::ntfs::ranges::AllocatedRangeSource;
use crate::ntfs::structs::*;
use log::{debug, warn};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::ptr;

// ============================================================================
// IOCTL Control Codes
// ============================================================================

pub const FSCTL_QUERY_ALLOCATED_RANGES: u32 = 0x000940CF;
pub const FSCTL_QUERY_FILE_LAYOUT: u32 = 0x00090277;
pub const FSCTL_QUERY_FILE_METADATA_OPTIMIZATION: u32 = 0x00090288;

// Access rights and flags for CreateFile
pub const GENERIC_READ: u32 = 0x80000000;
pub const FILE_READ_ATTRIBUTES: u32 = 0x0080;
pub const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
pub const SYNCHRONIZE: u32 = 0x0010_0000;
pub const FILE_SHARE_READ: u32 = 0x00000001;
pub const FILE_SHARE_WRITE: u32 = 0x00000002;
pub const FILE_SHARE_DELETE: u32 = 0x00000004;
pub const FILE_FLAG_BACKUP_SEMANTICS: u32 = 0x02000000;

pub const INVALID_HANDLE_VALUE: isize = -1;

/// Partial output; `bytes_returned` is still valid
const ERROR_MORE_DATA: u32 = 234;

/// Ranges requested per allocated-ranges call
const RANGES_PER_QUERY: usize = 4096;

// ============================================================================
// Safe Handle Wrapper
// ============================================================================

/// RAII wrapper for Windows HANDLE
pub struct SafeHandle {
    handle: isize,
}

impl SafeHandle {
    pub fn new(handle: isize) -> Option<Self> {
        if handle == INVALID_HANDLE_VALUE || handle == 0 {
            None
        } else {
            Some(Self { handle })
        }
    }

    pub fn as_raw(&self) -> isize {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle != INVALID_HANDLE_VALUE && self.handle != 0
    }

    fn win32(&self) -> windows::Win32::Foundation::HANDLE {
        windows::Win32::Foundation::HANDLE(self.handle as *mut std::ffi::c_void)
    }
}

impl Drop for SafeHandle {
    fn drop(&mut self) {
        if self.is_valid() {
            unsafe {
                let _ = windows::Win32::Foundation::CloseHandle(self.win32());
            }
        }
    }
}

// ============================================================================
// Open Operations
// ============================================================================

/// Win32 error code carried in a `windows` error's HRESULT
fn win32_code(error: &windows::core::Error) -> u32 {
    (error.code().0 as u32) & 0xFFFF
}

fn open_handle(path: &str, access: u32, share: u32, flags: u32) -> Result<SafeHandle> {
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::{
        CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_MODE, OPEN_EXISTING,
    };

    let wide_path: Vec<u16> = OsStr::new(path)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let handle = unsafe {
        CreateFileW(
            PCWSTR::from_raw(wide_path.as_ptr()),
            access,
            FILE_SHARE_MODE(share),
            None,
            OPEN_EXISTING,
            FILE_FLAGS_AND_ATTRIBUTES(flags),
            None,
        )
    };

    match handle {
        Ok(h) => SafeHandle::new(h.0 as isize)
            .ok_or_else(|| LayoutError::OpenError(path.to_string(), std::io::Error::last_os_error())),
        Err(e) => Err(LayoutError::OpenError(
            path.to_string(),
            std::io::Error::from_raw_os_error(win32_code(&e) as i32),
        )),
    }
}

/// Open a file for attribute queries only. Directories are refused.
pub fn open_file_attributes(path: &str) -> Result<SafeHandle> {
    open_handle(
        path,
        FILE_READ_ATTRIBUTES,
        FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
        0,
    )
}

/// Open a file by path with read access
pub fn open_file_read(path: &str) -> Result<SafeHandle> {
    open_handle(
        path,
        GENERIC_READ,
        FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
        FILE_FLAG_BACKUP_SEMANTICS,
    )
}

/// Open a volume device (`\\.\C:`) with the rights the layout query requires
pub fn open_volume_for_layout(device_path: &str) -> Result<SafeHandle> {
    open_handle(
        device_path,
        FILE_READ_ATTRIBUTES | FILE_WRITE_ATTRIBUTES | SYNCHRONIZE,
        FILE_SHARE_READ | FILE_SHARE_WRITE,
        0,
    )
}

// ============================================================================
// IOCTL Operations
// ============================================================================

/// Send a DeviceIoControl request. `ERROR_MORE_DATA` with a partial
/// buffer counts as success.
pub fn device_io_control(
    handle: &SafeHandle,
    control_code: u32,
    in_buffer: Option<&[u8]>,
    out_buffer: &mut [u8],
) -> Result<u32> {
    use windows::Win32::System::IO::DeviceIoControl;

    let mut bytes_returned: u32 = 0;

    let (in_ptr, in_size) = match in_buffer {
        Some(buf) => (buf.as_ptr() as *const std::ffi::c_void, buf.len() as u32),
        None => (ptr::null(), 0),
    };

    let result = unsafe {
        DeviceIoControl(
            handle.win32(),
            control_code,
            Some(in_ptr),
            in_size,
            Some(out_buffer.as_mut_ptr() as *mut std::ffi::c_void),
            out_buffer.len() as u32,
            Some(&mut bytes_returned),
            None,
        )
    };

    let code = match result {
        Ok(()) => return Ok(bytes_returned),
        Err(e) => win32_code(&e),
    };
    if code == ERROR_MORE_DATA && bytes_returned > 0 {
        return Ok(bytes_returned);
    }

    Err(LayoutError::from_win32(
        code,
        &format!("DeviceIoControl(0x{:08X})", control_code),
    ))
}

/// File reference number of an open file (the NTFS file index)
pub fn file_reference_number(handle: &SafeHandle) -> Result<u64> {
    use windows::Win32::Storage::FileSystem::{
        GetFileInformationByHandle, BY_HANDLE_FILE_INFORMATION,
    };

    let mut info = BY_HANDLE_FILE_INFORMATION::default();
    unsafe { GetFileInformationByHandle(handle.win32(), &mut info) }
        .map_err(|e| LayoutError::from_win32(win32_code(&e), "GetFileInformationByHandle"))?;

    Ok(((info.nFileIndexHigh as u64) << 32) | info.nFileIndexLow as u64)
}

/// Current size of an open file
pub fn file_size(handle: &SafeHandle) -> Result<u64> {
    use windows::Win32::Storage::FileSystem::GetFileSizeEx;

    let mut size: i64 = 0;
    unsafe { GetFileSizeEx(handle.win32(), &mut size) }
        .map_err(|e| LayoutError::from_win32(win32_code(&e), "GetFileSizeEx"))?;

    Ok(size.max(0) as u64)
}

/// Metadata optimization counters; None when the volume refuses the query
pub fn query_metadata_optimization(handle: &SafeHandle) -> Option<MetadataOptimization> {
    let mut buffer = [0u8; METADATA_OPTIMIZATION_OUTPUT_SIZE];

    match device_io_control(handle, FSCTL_QUERY_FILE_METADATA_OPTIMIZATION, None, &mut buffer) {
        Ok(returned) => MetadataOptimization::from_bytes(&buffer[..returned as usize]),
        Err(e) => {
            debug!("metadata optimization query unavailable: {}", e);
            None
        }
    }
}

// ============================================================================
// Query Sources
// ============================================================================

/// Layout query against a file's volume
pub struct VolumeLayoutSource {
    file: SafeHandle,
    volume: SafeHandle,
}

impl VolumeLayoutSource {
    pub fn open(path: &str) -> Result<Self> {
        let device = volume_device_path(path)?;
        let file = open_file_attributes(path)?;
        let volume = open_volume_for_layout(&device)?;
        debug!("opened {} on volume {}", path, device);
        Ok(Self { file, volume })
    }
}

impl LayoutSource for VolumeLayoutSource {
    fn file_reference_number(&mut self) -> Result<u64> {
        file_reference_number(&self.file)
    }

    fn query_layout(&mut self, input: &QueryFileLayoutInput, output: &mut [u8]) -> Result<PageStatus> {
        match device_io_control(&self.volume, FSCTL_QUERY_FILE_LAYOUT, Some(&input.to_bytes()), output) {
            Ok(returned) => Ok(PageStatus::Data(returned as usize)),
            Err(e) if e.status_code() == Some(ERROR_HANDLE_EOF) => Ok(PageStatus::EndOfData),
            Err(e) => Err(e),
        }
    }

    fn metadata_optimization(&mut self) -> Option<MetadataOptimization> {
        query_metadata_optimization(&self.file)
    }
}

/// Allocated-range query against a file opened for reading
pub struct FileRangeSource {
    file: SafeHandle,
    buffer: Vec<u8>,
}

impl FileRangeSource {
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self {
            file: open_file_read(path)?,
            buffer: vec![0u8; RANGES_PER_QUERY * ALLOCATED_RANGE_SIZE],
        })
    }
}

impl AllocatedRangeSource for FileRangeSource {
    fn file_size(&mut self) -> Result<u64> {
        file_size(&self.file)
    }

    fn query_ranges(&mut self, window: AllocatedRange) -> Result<Vec<AllocatedRange>> {
        let returned = device_io_control(
            &self.file,
            FSCTL_QUERY_ALLOCATED_RANGES,
            Some(&window.to_bytes()),
            &mut self.buffer,
        )
        .map_err(|e| {
            warn!("allocated range query failed at {:#x}: {}", window.offset, e);
            e
        })?;

        Ok(AllocatedRange::parse_all(&self.buffer[..returned as usize]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_open_accepts_files_and_refuses_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"data").unwrap();

        assert!(open_file_attributes(file.to_str().unwrap()).is_ok());
        assert!(matches!(
            open_file_attributes(dir.path().to_str().unwrap()),
            Err(LayoutError::OpenError(..))
        ));
    }
}
