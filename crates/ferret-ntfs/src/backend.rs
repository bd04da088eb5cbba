//! NTFS search driver.
//!
//! Implements the core `VolumeSearch` trait for Windows NTFS volumes: one
//! call scans one volume's MFT end to end, filtering records against the
//! search spec and publishing reconstructed paths into the shared sink.

use crate::mft::MftEnumerator;
use crate::resolver::PathResolver;
use crate::volume::ready_ntfs_letters;
use crate::winapi_utils::open_volume;
use ferret_core::{CancelFlag, MatchSink, SearchMatch, SearchSpec, VolumeSearch};
use tracing::{debug, info, warn};

/// NTFS volume-search backend for Windows.
///
/// Requires an elevated process: the raw volume open fails with access
/// denied otherwise. Callers are expected to check `is_elevated` up front
/// for a friendlier failure.
pub struct NtfsSearch;

impl NtfsSearch {
    /// Create a new NTFS backend.
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
        Ok(ready_ntfs_letters())
    }

    fn search_volume(
        &self,
        volume: char,
        spec: &SearchSpec,
        sink: &MatchSink,
        cancel: &CancelFlag,
    ) -> anyhow::Result<()> {
        let handle = open_volume(volume)?;
        let resolver = PathResolver::new(&handle, volume);
        let mut enumerator = MftEnumerator::new(&handle, volume, cancel.clone());

        info!(volume = %volume, "scanning MFT");

        loop {
            let rec = match enumerator.next_record() {
                Ok(Some(rec)) => rec,
                Ok(None) => break,
                Err(e) => {
                    // Mid-stream failure ends this volume's scan; records
                    // already published stay valid.
                    warn!(volume = %volume, error = %e, "enumeration ended early");
                    break;
                }
            };

            sink.record_searched();

            if !spec.admits(&rec.name, rec.is_directory()) {
                continue;
            }

            match resolver.resolve(rec.frn) {
                Ok(path) => {
                    if !sink.publish(SearchMatch { volume, path }) {
                        break;
                    }
                }
                Err(e) => {
                    debug!(
                        volume = %volume,
                        frn = rec.frn,
                        error = %e,
                        "record dropped, path resolution failed"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use ferret_core::NamePredicate;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    // These tests scan the live C: volume and require admin privileges.

    fn unique_name(tag: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        format!("ferret-{}-{}-{}", tag, std::process::id(), nanos)
    }

    fn search_c(spec: &SearchSpec) -> Vec<SearchMatch> {
        let backend = NtfsSearch::new();
        let (tx, rx) = bounded(1024);
        let sink = MatchSink::new(tx);
        backend
            .search_volume('C', spec, &sink, &CancelFlag::new())
            .unwrap();
        drop(sink);
        rx.iter().collect()
    }

    #[test]
    #[ignore] // Requires admin privileges
    fn test_finds_freshly_created_file() {
        let name = unique_name("exact");
        let path = std::env::temp_dir().join(&name);
        fs::write(&path, b"x").unwrap();

        let spec = SearchSpec::new(NamePredicate::glob(&name).unwrap(), false);
        let matches = search_c(&spec);

        fs::remove_file(&path).unwrap();

        assert_eq!(matches.len(), 1);
        assert!(matches[0].path.ends_with(&name));
        assert!(matches[0].path.starts_with("C:"));
    }

    #[test]
    #[ignore] // Requires admin privileges
    fn test_glob_matches_extension_exactly() {
        let stem = unique_name("glob");
        let log = std::env::temp_dir().join(format!("{stem}_42.log"));
        let txt = std::env::temp_dir().join(format!("{stem}_42.txt"));
        fs::write(&log, b"x").unwrap();
        fs::write(&txt, b"x").unwrap();

        let pattern = format!("{stem}_*.log");
        let spec = SearchSpec::new(NamePredicate::glob(&pattern).unwrap(), false);
        let matches = search_c(&spec);

        fs::remove_file(&log).unwrap();
        fs::remove_file(&txt).unwrap();

        assert_eq!(matches.len(), 1);
        assert!(matches[0].path.ends_with(".log"));
    }

    #[test]
    #[ignore] // Requires admin privileges
    fn test_folders_flag_selects_directories() {
        let name = unique_name("dir");
        let path = std::env::temp_dir().join(&name);
        fs::create_dir(&path).unwrap();

        let folders = SearchSpec::new(NamePredicate::glob(&name).unwrap(), true);
        let files = SearchSpec::new(NamePredicate::glob(&name).unwrap(), false);
        let folder_matches = search_c(&folders);
        let file_matches = search_c(&files);

        fs::remove_dir(&path).unwrap();

        assert_eq!(folder_matches.len(), 1);
        assert!(file_matches.is_empty());
    }
}
