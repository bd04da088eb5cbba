//! Parallel per-volume search coordinator.
//!
//! Spawns one OS thread per selected volume and lets each scan independently;
//! the inner work is kernel-bound I/O plus name matching, so plain threads
//! are the right scheduling model and no async runtime is involved. Workers
//! share only the match sink (channel + counters) and the cancellation flag.
//!
//! Match ordering across volumes is arrival order into the sink; within one
//! volume it is the kernel's enumeration order. Callers wanting determinism
//! sort the collected results themselves.

use crate::backend::{CancelFlag, MatchSink, SearchMatch, SearchSpec, VolumeSearch};
use crossbeam_channel::Sender;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Aggregate counters for one coordinator run.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Records examined across all volumes
    pub searched_records: u64,

    /// Matches published across all volumes
    pub found: u64,

    /// Number of volume workers spawned
    pub volumes: u32,

    /// Wall time from just before spawning to just after joining
    pub elapsed: Duration,
}

/// Search `volumes` in parallel, publishing matches into `tx`.
///
/// Blocks until every worker has finished (or failed, or observed
/// cancellation) and returns the aggregated counters. A volume that fails to
/// open is logged and skipped; the remaining workers are unaffected.
pub fn run(
    backend: &dyn VolumeSearch,
    volumes: &[char],
    spec: &SearchSpec,
    tx: Sender<SearchMatch>,
    cancel: &CancelFlag,
) -> SearchStats {
    let sink = MatchSink::new(tx);
    let started = Instant::now();

    std::thread::scope(|scope| {
        for &volume in volumes {
            let sink = &sink;
            scope.spawn(move || {
                debug!(volume = %volume, "volume worker starting");
                if let Err(e) = backend.search_volume(volume, spec, sink, cancel) {
                    warn!(volume = %volume, error = %e, "volume search failed, skipping");
                }
            });
        }
    });

    SearchStats {
        searched_records: sink.searched_records(),
        found: sink.found(),
        volumes: volumes.len() as u32,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::NamePredicate;
    use crossbeam_channel::bounded;
    use std::collections::BTreeMap;

    struct FakeEntry {
        name: &'static str,
        is_dir: bool,
    }

    fn entry(name: &'static str, is_dir: bool) -> FakeEntry {
        FakeEntry { name, is_dir }
    }

    /// In-memory backend: each volume is a flat list of entries and paths
    /// resolve to `X:\name`.
    struct FakeBackend {
        volumes: BTreeMap<char, Vec<FakeEntry>>,
        failing: Option<char>,
    }

    impl VolumeSearch for FakeBackend {
        fn ready_volumes(&self) -> anyhow::Result<Vec<char>> {
            Ok(self.volumes.keys().copied().collect())
        }

        fn search_volume(
            &self,
            volume: char,
            spec: &SearchSpec,
            sink: &MatchSink,
            cancel: &CancelFlag,
        ) -> anyhow::Result<()> {
            if self.failing == Some(volume) {
                anyhow::bail!("failed to open volume {volume}");
            }
            for e in &self.volumes[&volume] {
                if cancel.is_cancelled() {
                    break;
                }
                sink.record_searched();
                if spec.admits(e.name, e.is_dir) {
                    let published = sink.publish(SearchMatch {
                        volume,
                        path: format!("{}:\\{}", volume, e.name),
                    });
                    if !published {
                        break;
                    }
                }
            }
            Ok(())
        }
    }

    fn spec(pattern: &str, folders: bool) -> SearchSpec {
        SearchSpec::new(NamePredicate::glob(pattern).unwrap(), folders)
    }

    #[test]
    fn test_merges_matches_across_volumes() {
        let backend = FakeBackend {
            volumes: BTreeMap::from([
                ('C', vec![entry("report_1.log", false), entry("other.txt", false)]),
                ('D', vec![entry("report_2.log", false)]),
            ]),
            failing: None,
        };

        let (tx, rx) = bounded(64);
        let stats = run(
            &backend,
            &['C', 'D'],
            &spec("report_*.log", false),
            tx,
            &CancelFlag::new(),
        );

        let mut paths: Vec<String> = rx.iter().map(|m| m.path).collect();
        paths.sort();
        assert_eq!(paths, vec!["C:\\report_1.log", "D:\\report_2.log"]);
        assert_eq!(stats.volumes, 2);
        assert_eq!(stats.searched_records, 3);
        assert_eq!(stats.found, 2);
    }

    #[test]
    fn test_counter_includes_filtered_records() {
        // Directories are examined (and counted) even when searching files
        let backend = FakeBackend {
            volumes: BTreeMap::from([(
                'C',
                vec![
                    entry("match.txt", false),
                    entry("match.txt", true),
                    entry("unrelated", true),
                ],
            )]),
            failing: None,
        };

        let (tx, rx) = bounded(64);
        let stats = run(
            &backend,
            &['C'],
            &spec("match.txt", false),
            tx,
            &CancelFlag::new(),
        );

        assert_eq!(stats.searched_records, 3);
        assert_eq!(stats.found, 1);
        assert_eq!(rx.iter().count(), 1);
    }

    #[test]
    fn test_folders_flag_is_exclusive() {
        let backend = FakeBackend {
            volumes: BTreeMap::from([(
                'C',
                vec![entry("proj", true), entry("proj", false)],
            )]),
            failing: None,
        };

        let (tx, rx) = bounded(64);
        run(&backend, &['C'], &spec("proj", true), tx, &CancelFlag::new());

        let matches: Vec<SearchMatch> = rx.iter().collect();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_failed_volume_does_not_abort_others() {
        let backend = FakeBackend {
            volumes: BTreeMap::from([
                ('C', vec![entry("found.txt", false)]),
                ('D', vec![entry("found.txt", false)]),
            ]),
            failing: Some('C'),
        };

        let (tx, rx) = bounded(64);
        let stats = run(
            &backend,
            &['C', 'D'],
            &spec("found.txt", false),
            tx,
            &CancelFlag::new(),
        );

        let paths: Vec<String> = rx.iter().map(|m| m.path).collect();
        assert_eq!(paths, vec!["D:\\found.txt"]);
        assert_eq!(stats.found, 1);
        assert_eq!(stats.volumes, 2);
    }

    #[test]
    fn test_cancellation_stops_workers() {
        let backend = FakeBackend {
            volumes: BTreeMap::from([('C', vec![entry("found.txt", false)])]),
            failing: None,
        };

        let cancel = CancelFlag::new();
        cancel.cancel();

        let (tx, rx) = bounded(64);
        let stats = run(&backend, &['C'], &spec("found.txt", false), tx, &cancel);

        assert_eq!(stats.searched_records, 0);
        assert_eq!(stats.found, 0);
        assert_eq!(rx.iter().count(), 0);
    }
}
