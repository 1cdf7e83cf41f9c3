//! Error types for LayoutView
//!
//! Every failure a layout enumeration can hit, from path resolution to
//! malformed response buffers.

use thiserror::Error;

/// Win32 code the layout service reports once the enumeration is exhausted
/// (`STATUS_END_OF_FILE` surfaces as `ERROR_HANDLE_EOF`).
pub const ERROR_HANDLE_EOF: u32 = 38;

/// Main error type for LayoutView operations
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Path '{0}' does not resolve to a rooted volume")]
    NotSupported(String),

    #[error("Failed to open '{0}': {1}")]
    OpenError(String, std::io::Error),

    #[error("{context}: Win32 error code {code}")]
    Win32 { code: u32, context: String },

    #[error("Unsupported {record} version {found} (expected {expected})")]
    UnsupportedVersion {
        record: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("Malformed layout buffer: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Result type alias for LayoutView operations
pub type Result<T> = std::result::Result<T, LayoutError>;

impl LayoutError {
    /// Create a Windows API error from a raw error code
    pub fn from_win32(code: u32, context: &str) -> Self {
        LayoutError::Win32 {
            code,
            context: context.to_string(),
        }
    }

    /// The service status code, unchanged, when this error came from the OS
    pub fn status_code(&self) -> Option<u32> {
        match self {
            LayoutError::Win32 { code, .. } => Some(*code),
            LayoutError::OpenError(_, e) | LayoutError::IoError(e) => {
                e.raw_os_error().map(|c| c as u32)
            }
            _ => None,
        }
    }

    /// True for the terminal "no more data" status
    pub fn is_end_of_data(&self) -> bool {
        self.status_code() == Some(ERROR_HANDLE_EOF)
    }

    /// Check if this error came from the record decoder rather than the OS
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            LayoutError::UnsupportedVersion { .. } | LayoutError::Malformed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_errors_keep_their_code() {
        let err = LayoutError::from_win32(5, "FSCTL_QUERY_FILE_LAYOUT");
        assert_eq!(err.status_code(), Some(5));
        assert!(!err.is_end_of_data());
        assert!(err.to_string().starts_with("FSCTL_QUERY_FILE_LAYOUT: Win32 error code 5"));
    }

    #[test]
    fn end_of_data_is_recognised() {
        assert!(LayoutError::from_win32(ERROR_HANDLE_EOF, "query").is_end_of_data());
    }

    #[test]
    fn decode_failures_have_no_status() {
        let err = LayoutError::UnsupportedVersion {
            record: "stream entry",
            found: 2,
            expected: 1,
        };
        assert!(err.is_decode_failure());
        assert_eq!(err.status_code(), None);
        assert_eq!(
            err.to_string(),
            "Unsupported stream entry version 2 (expected 1)"
        );
    }
}
