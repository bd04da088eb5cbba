//! # Ferret NTFS Backend
//!
//! Windows/NTFS implementation of the `VolumeSearch` trait. Instead of
//! walking directories, it streams every in-use MFT entry out of the volume
//! through the bulk USN enumeration control and rebuilds the full path of
//! each match by chasing parent file references to the volume root.
//!
//! ## Architecture
//!
//! All Windows API calls and unsafe code are isolated here:
//!
//! - `record.rs`: USN record / enumeration wire formats (platform-neutral)
//! - `winapi_utils.rs`: raw handles, volume opening, elevation check
//! - `volume.rs`: discovery of ready NTFS drive letters
//! - `mft.rs`: the streaming MFT enumerator
//! - `resolver.rs`: parent-chain path reconstruction
//! - `backend.rs`: the per-volume search driver
//!
//! ## Permissions
//!
//! Opening a raw volume requires elevation (or the "Perform Volume
//! Maintenance Tasks" privilege). Check [`is_elevated`] before searching to
//! fail early with a useful message.

pub mod record;

#[cfg(windows)]
mod backend;
#[cfg(windows)]
mod mft;
#[cfg(windows)]
mod resolver;
#[cfg(windows)]
mod volume;
#[cfg(windows)]
mod winapi_utils;

#[cfg(windows)]
pub use backend::NtfsSearch;
#[cfg(windows)]
pub use mft::{MftEnumerator, PAGE_BUFFER_SIZE};
#[cfg(windows)]
pub use resolver::{PathResolver, MAX_RESOLVE_DEPTH};
#[cfg(windows)]
pub use volume::{is_ready_ntfs, ready_ntfs_letters};
#[cfg(windows)]
pub use winapi_utils::{is_elevated, open_volume, SafeHandle};

#[cfg(not(windows))]
mod stub;

#[cfg(not(windows))]
pub use stub::{is_elevated, NtfsSearch};

/// Error types specific to the NTFS backend
pub mod error;
pub use error::NtfsError;
