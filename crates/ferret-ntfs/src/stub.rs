//! Stub implementation for non-Windows platforms.
//!
//! Lets the workspace compile anywhere (the core and the wire-format
//! decoder are platform-neutral); every volume operation fails with an
//! appropriate error.

use crate::error::NtfsError;
use ferret_core::{CancelFlag, MatchSink, SearchSpec, VolumeSearch};

/// Stub NTFS backend for non-Windows platforms.
pub struct NtfsSearch;

impl NtfsSearch {
    /// Create a new stub backend.
    pub fn new() -> Self {
        NtfsSearch
    }
}

impl Default for NtfsSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeSearch for NtfsSearch {
    fn ready_volumes(&self) -> anyhow::Result<Vec<char>> {
        Err(NtfsError::Unsupported.into())
    }

    fn search_volume(
        &self,
        _volume: char,
        _spec: &SearchSpec,
        _sink: &MatchSink,
        _cancel: &CancelFlag,
    ) -> anyhow::Result<()> {
        Err(NtfsError::Unsupported.into())
    }
}

/// Elevation never applies off-Windows.
pub fn is_elevated() -> bool {
    false
}
