//! Volume discovery for Windows NTFS.
//!
//! Walks the logical-drive bitmask and keeps the letters that are ready
//! fixed NTFS volumes. A volume that is present but not ready (e.g. an
//! empty card reader) fails the filesystem query and is silently excluded.

use crate::winapi_utils::to_wide_string;
use tracing::debug;
use windows::core::PCWSTR;
use windows::Win32::Foundation::MAX_PATH;
use windows::Win32::Storage::FileSystem::{
    GetDriveTypeW, GetLogicalDrives, GetVolumeInformationW,
};

// DRIVE_FIXED constant value (3)
const DRIVE_FIXED: u32 = 3;

/// Drive letters of all ready, fixed NTFS volumes.
pub fn ready_ntfs_letters() -> Vec<char> {
    let mask = unsafe { GetLogicalDrives() };
    let mut letters = Vec::new();

    for i in 0..26u8 {
        if mask & (1 << i) == 0 {
            continue;
        }
        let letter = (b'A' + i) as char;
        if is_ready_ntfs(letter) {
            debug!(volume = %letter, "found ready NTFS volume");
            letters.push(letter);
        }
    }

    letters
}

/// Whether `letter` names a ready, fixed NTFS volume.
pub fn is_ready_ntfs(letter: char) -> bool {
    let root = format!("{}:\\", letter.to_ascii_uppercase());
    is_fixed_drive(&root)
        && filesystem_name(&root).map_or(false, |fs| fs == "NTFS")
}

/// Check if a root path is on a fixed drive.
fn is_fixed_drive(root: &str) -> bool {
    let wide_root = to_wide_string(root);
    let drive_type = unsafe { GetDriveTypeW(PCWSTR(wide_root.as_ptr())) };
    drive_type == DRIVE_FIXED
}

/// Filesystem name of the volume mounted at `root`, if it is ready.
fn filesystem_name(root: &str) -> Option<String> {
    let wide_root = to_wide_string(root);
    let mut fs_name = [0u16; MAX_PATH as usize];

    let result = unsafe {
        GetVolumeInformationW(
            PCWSTR(wide_root.as_ptr()),
            None,
            None,
            None,
            None,
            Some(&mut fs_name),
        )
    };

    if result.is_err() {
        return None;
    }

    let len = fs_name.iter().position(|&c| c == 0).unwrap_or(0);
    Some(String::from_utf16_lossy(&fs_name[..len]))
}
