//! Error types for the NTFS backend.

use thiserror::Error;

/// Errors raised by NTFS volume access and enumeration.
///
/// Cycle, depth and name-length failures are per-record: the driver drops
/// the offending record and keeps scanning. Volume-open failures are
/// per-volume: the coordinator skips that volume. Enumeration failures end
/// one volume's stream without discarding what it already yielded.
#[derive(Error, Debug)]
pub enum NtfsError {
    /// Failed to open a raw volume handle
    #[error("failed to open volume {volume}: (code {code}) {message}")]
    VolumeOpen {
        volume: char,
        code: u32,
        message: String,
    },

    /// The enumeration control failed mid-stream
    #[error("MFT enumeration failed on volume {volume}: (code {code}) {message}")]
    Enumeration {
        volume: char,
        code: u32,
        message: String,
    },

    /// Access denied
    #[error("access denied: {operation} (try running as administrator)")]
    AccessDenied { operation: String },

    /// A parent chain revisited a file reference number
    #[error("parent chain of file reference {frn:#x} contains a cycle")]
    ResolutionCycle { frn: u64 },

    /// A parent chain exceeded the hop limit
    #[error("parent chain of file reference {frn:#x} exceeds the depth limit")]
    ResolutionTooDeep { frn: u64 },

    /// A record did not fit even the fallback lookup buffer
    #[error("record for file reference {frn:#x} does not fit the lookup buffer")]
    NameTooLong { frn: u64 },

    /// Windows API error outside the cases above
    #[error("Windows API error: {function} failed with code {code}: {message}")]
    WinApi {
        function: String,
        code: u32,
        message: String,
    },

    /// The backend was invoked on a platform without NTFS volume access
    #[error("NTFS volume access is only available on Windows")]
    Unsupported,
}

impl NtfsError {
    /// Create a WinAPI error from the calling thread's last Windows error.
    #[cfg(windows)]
    pub fn from_win32(function: &str) -> Self {
        use windows::Win32::Foundation::GetLastError;

        let code = unsafe { GetLastError().0 };
        if code == 5 {
            return NtfsError::AccessDenied {
                operation: function.to_string(),
            };
        }

        NtfsError::WinApi {
            function: function.to_string(),
            code,
            message: format_win32_error(code),
        }
    }

    /// Volume-open failure for `volume` with the given Win32 error code.
    pub fn volume_open(volume: char, code: u32) -> Self {
        NtfsError::VolumeOpen {
            volume,
            code,
            message: format_win32_error(code),
        }
    }

    /// Mid-stream enumeration failure on `volume`.
    pub fn enumeration(volume: char, code: u32) -> Self {
        NtfsError::Enumeration {
            volume,
            code,
            message: format_win32_error(code),
        }
    }

    /// Whether this error indicates access was denied.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, NtfsError::AccessDenied { .. })
            || matches!(
                self,
                NtfsError::WinApi { code: 5, .. }
                    | NtfsError::VolumeOpen { code: 5, .. }
                    | NtfsError::Enumeration { code: 5, .. }
            )
    }
}

/// Format a Win32 error code to a human-readable message.
#[cfg(windows)]
fn format_win32_error(code: u32) -> String {
    use windows::core::PWSTR;
    use windows::Win32::System::Diagnostics::Debug::{
        FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
    };

    let mut buffer = [0u16; 512];
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            code,
            0,
            PWSTR(buffer.as_mut_ptr()),
            buffer.len() as u32,
            None,
        )
    };

    if len == 0 {
        return format!("Unknown error ({})", code);
    }

    String::from_utf16_lossy(&buffer[..len as usize])
        .trim()
        .to_string()
}

#[cfg(not(windows))]
fn format_win32_error(code: u32) -> String {
    format!("Windows error {}", code)
}
