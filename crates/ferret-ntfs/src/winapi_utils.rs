//! Low-level Windows API utilities.
//!
//! All unsafe code for raw handle management and process-token queries is
//! concentrated here, wrapped in safe helpers.

use crate::error::NtfsError;
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{
    CloseHandle, GetLastError, GENERIC_READ, HANDLE, INVALID_HANDLE_VALUE,
};
use windows::Win32::Security::{GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

/// RAII wrapper for a Windows HANDLE.
///
/// Closes the handle exactly once, when dropped, on every exit path.
pub struct SafeHandle(HANDLE);

impl SafeHandle {
    /// Wrap a freshly created handle, rejecting invalid ones.
    pub fn new(handle: HANDLE) -> Result<Self, NtfsError> {
        if handle == INVALID_HANDLE_VALUE || handle.0 == ptr::null_mut() {
            Err(NtfsError::from_win32("CreateFileW"))
        } else {
            Ok(SafeHandle(handle))
        }
    }

    /// Get the raw handle value.
    pub fn as_raw(&self) -> HANDLE {
        self.0
    }

    /// Check if the handle is valid.
    pub fn is_valid(&self) -> bool {
        self.0 != INVALID_HANDLE_VALUE && self.0 .0 != ptr::null_mut()
    }
}

impl Drop for SafeHandle {
    fn drop(&mut self) {
        if self.is_valid() {
            unsafe {
                let _ = CloseHandle(self.0);
            }
        }
    }
}

/// Convert a Rust string to a null-terminated wide string (UTF-16).
pub fn to_wide_string(s: &str) -> Vec<u16> {
    OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Device path for a drive letter, e.g. `\\.\C:`.
pub fn device_path(letter: char) -> String {
    format!(r"\\.\{}:", letter.to_ascii_uppercase())
}

/// Open a raw volume for MFT enumeration.
///
/// Read access with read+write sharing, existing volumes only. Requires
/// elevation; failure carries the drive letter and the Win32 error.
pub fn open_volume(letter: char) -> Result<SafeHandle, NtfsError> {
    let wide_path = to_wide_string(&device_path(letter));

    // SAFETY: well-formed null-terminated path; the resulting handle is
    // wrapped in SafeHandle for guaranteed cleanup.
    let handle = unsafe {
        CreateFileW(
            PCWSTR(wide_path.as_ptr()),
            GENERIC_READ.0,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            None,
            OPEN_EXISTING,
            FILE_FLAGS_AND_ATTRIBUTES(0),
            None,
        )
    };

    match handle {
        Ok(h) => SafeHandle::new(h)
            .map_err(|_| NtfsError::volume_open(letter, unsafe { GetLastError().0 })),
        Err(_) => Err(NtfsError::volume_open(letter, unsafe { GetLastError().0 })),
    }
}

/// Check whether the process token is elevated (running as administrator).
///
/// Returns false when any of the token queries fail.
pub fn is_elevated() -> bool {
    unsafe {
        let mut token_handle: HANDLE = HANDLE::default();

        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token_handle).is_err() {
            return false;
        }

        let mut elevation = TOKEN_ELEVATION::default();
        let mut size = std::mem::size_of::<TOKEN_ELEVATION>() as u32;

        let result = GetTokenInformation(
            token_handle,
            TokenElevation,
            Some(&mut elevation as *mut _ as *mut _),
            size,
            &mut size,
        );

        let _ = CloseHandle(token_handle);

        result.is_ok() && elevation.TokenIsElevated != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wide_string() {
        let wide = to_wide_string("Hello");
        assert_eq!(wide, vec![72, 101, 108, 108, 111, 0]);
    }

    #[test]
    fn test_device_path() {
        assert_eq!(device_path('c'), r"\\.\C:");
        assert_eq!(device_path('D'), r"\\.\D:");
    }
}
