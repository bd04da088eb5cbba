//! Full-path reconstruction from file reference numbers.
//!
//! A USN record carries only its own name and its parent's FRN, so the full
//! path of a match is rebuilt by looking up one record per ancestor and
//! walking the parent chain to the volume root. The walk is an explicit
//! loop: a visited set defends against cyclic parent pointers on corrupt
//! volumes and a hop cap bounds the worst case (realistic trees are ~32
//! levels deep).
//!
//! Each ancestor lookup reissues the enumeration control with the ancestor's
//! FRN as the start position and a buffer sized for a single record: a small
//! stack buffer first, then one 4 KiB heap retry for names that don't fit.

use crate::error::NtfsError;
use crate::record::{self, MftEnumData, UsnRecord, PAGE_HEADER_LEN, ROOT_FRN};
use crate::winapi_utils::SafeHandle;
use std::collections::HashSet;
use std::ffi::c_void;
use std::mem;
use windows::Win32::Foundation::{
    GetLastError, ERROR_HANDLE_EOF, ERROR_INSUFFICIENT_BUFFER, ERROR_MORE_DATA,
};
use windows::Win32::System::Ioctl::FSCTL_ENUM_USN_DATA;
use windows::Win32::System::IO::DeviceIoControl;

/// Hop cap on the parent-chain walk.
pub const MAX_RESOLVE_DEPTH: usize = 256;

/// Stack buffer for the common case: one record with a name of up to
/// roughly 200 UTF-16 units.
const SMALL_LOOKUP_BUF: usize = 512;

/// Heap fallback for longer names.
const LARGE_LOOKUP_BUF: usize = 4096;

/// Resolves file reference numbers to full paths on one volume.
pub struct PathResolver<'a> {
    handle: &'a SafeHandle,
    volume: char,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver over an open volume handle.
    pub fn new(handle: &'a SafeHandle, volume: char) -> Self {
        PathResolver { handle, volume }
    }

    /// Reconstruct the full path of `frn`, e.g. `C:\Users\doc\report.log`.
    ///
    /// When an ancestor lookup returns a different FRN than requested the
    /// entry was deleted or recycled mid-scan; its decoded name becomes the
    /// topmost segment and the walk stops there, without a drive prefix.
    pub fn resolve(&self, frn: u64) -> Result<String, NtfsError> {
        let mut parts: Vec<String> = Vec::new();
        let mut visited: HashSet<u64> = HashSet::new();
        let mut current = frn;

        let prefix = loop {
            if current == ROOT_FRN {
                break format!("{}:", self.volume);
            }
            if !visited.insert(current) {
                return Err(NtfsError::ResolutionCycle { frn });
            }
            if visited.len() > MAX_RESOLVE_DEPTH {
                return Err(NtfsError::ResolutionTooDeep { frn });
            }

            let rec = self.lookup(current)?;
            if rec.frn != current {
                break rec.name;
            }

            current = rec.parent_frn;
            parts.push(rec.name);
        };

        if parts.is_empty() {
            return Ok(prefix);
        }

        parts.push(prefix);
        parts.reverse();
        Ok(parts.join("\\"))
    }

    /// Look up the single record at (or after) `frn`.
    fn lookup(&self, frn: u64) -> Result<UsnRecord, NtfsError> {
        let mut small = [0u8; SMALL_LOOKUP_BUF];
        if let Some(rec) = self.lookup_into(frn, &mut small)? {
            return Ok(rec);
        }

        let mut large = vec![0u8; LARGE_LOOKUP_BUF];
        self.lookup_into(frn, &mut large)?
            .ok_or(NtfsError::NameTooLong { frn })
    }

    /// One control call into `buf`. `Ok(None)` means the record did not fit.
    fn lookup_into(&self, frn: u64, buf: &mut [u8]) -> Result<Option<UsnRecord>, NtfsError> {
        let request = MftEnumData::from_start(frn);
        let mut bytes_returned = 0u32;

        let result = unsafe {
            DeviceIoControl(
                self.handle.as_raw(),
                FSCTL_ENUM_USN_DATA,
                Some(&request as *const MftEnumData as *const c_void),
                mem::size_of::<MftEnumData>() as u32,
                Some(buf.as_mut_ptr() as *mut c_void),
                buf.len() as u32,
                Some(&mut bytes_returned),
                None,
            )
        };

        if result.is_err() {
            let code = unsafe { GetLastError() };
            if code == ERROR_INSUFFICIENT_BUFFER || code == ERROR_MORE_DATA {
                return Ok(None);
            }
            return Err(NtfsError::enumeration(self.volume, code.0));
        }

        let n = bytes_returned as usize;
        if n <= PAGE_HEADER_LEN {
            // The MFT has no record at or after this FRN: the entry (and
            // everything past it) vanished mid-scan.
            return Err(NtfsError::enumeration(self.volume, ERROR_HANDLE_EOF.0));
        }

        Ok(record::records(&buf[..n]).next())
    }
}
