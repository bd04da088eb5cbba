//! Search backend trait and the shared worker plumbing.
//!
//! This module defines the abstract interface that volume-scanning backends
//! implement. The coordinator interacts with a volume only through
//! [`VolumeSearch`], which keeps the platform-specific (and unsafe) code in
//! its own crate and lets the coordinator be tested against an in-memory
//! fake.
//!
//! It also defines the two pieces of state the workers share: the
//! [`MatchSink`] (a bounded channel into the single output writer, plus the
//! cross-volume counters) and the [`CancelFlag`] observed at page
//! boundaries.

use crate::predicate::NamePredicate;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// What to search for, fixed for the duration of a run.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    /// Compiled name predicate
    pub predicate: NamePredicate,

    /// Match directories (true) or files (false)
    pub folders: bool,
}

impl SearchSpec {
    /// Create a search spec for files or folders matching `predicate`.
    pub fn new(predicate: NamePredicate, folders: bool) -> Self {
        SearchSpec { predicate, folders }
    }

    /// Whether a record with this name and kind should be yielded.
    ///
    /// The directory filter applies first; the predicate only sees names of
    /// the requested kind.
    pub fn admits(&self, name: &str, is_dir: bool) -> bool {
        is_dir == self.folders && self.predicate.matches(name)
    }
}

/// A single search hit: the reconstructed full path on one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// Drive letter the match was found on
    pub volume: char,

    /// Full path, e.g. `C:\Users\doc\report_42.log`
    pub path: String,
}

/// Cooperative cancellation flag shared by all workers.
///
/// Workers check the flag before fetching the next enumeration page; on
/// cancellation they drain the page they already hold and exit, so partial
/// results remain valid.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Thread-safe sink that workers publish matches into.
///
/// Wraps the channel to the output writer and carries the run counters.
/// Counter updates are relaxed atomics; no lock is held across I/O.
pub struct MatchSink {
    tx: Sender<SearchMatch>,
    searched: AtomicU64,
    found: AtomicU64,
}

impl MatchSink {
    /// Create a sink publishing into `tx`.
    pub fn new(tx: Sender<SearchMatch>) -> Self {
        MatchSink {
            tx,
            searched: AtomicU64::new(0),
            found: AtomicU64::new(0),
        }
    }

    /// Count one examined record. Called for every record a worker streams,
    /// including records the directory filter skips.
    pub fn record_searched(&self) {
        self.searched.fetch_add(1, Ordering::Relaxed);
    }

    /// Publish a match. Returns false when the receiving side is gone and
    /// the worker should stop.
    pub fn publish(&self, m: SearchMatch) -> bool {
        if self.tx.send(m).is_ok() {
            self.found.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Total records examined so far, across all workers.
    pub fn searched_records(&self) -> u64 {
        self.searched.load(Ordering::Relaxed)
    }

    /// Total matches published so far, across all workers.
    pub fn found(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }
}

/// Interface implemented by volume-scanning backends.
///
/// One `search_volume` call scans one volume from start to finish, publishing
/// matches into the sink as they are found. Implementations own their volume
/// handle for the duration of the call and release it on every exit path.
pub trait VolumeSearch: Send + Sync {
    /// Drive letters of volumes this backend can scan right now.
    fn ready_volumes(&self) -> anyhow::Result<Vec<char>>;

    /// Scan one volume, publishing matches into `sink`.
    ///
    /// Per-record failures are handled internally (the record is dropped);
    /// an `Err` means the volume could not be scanned at all and the
    /// coordinator will skip it.
    fn search_volume(
        &self,
        volume: char,
        spec: &SearchSpec,
        sink: &MatchSink,
        cancel: &CancelFlag,
    ) -> anyhow::Result<()>;
}
