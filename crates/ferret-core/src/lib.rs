//! # Ferret Core Library
//!
//! Platform-agnostic core of the ferret file-name finder: compiled name
//! predicates, the volume-search backend trait, and the parallel coordinator
//! that fans a search out across volumes and aggregates counters.
//!
//! Volume access itself (raw handles, MFT enumeration, path reconstruction)
//! lives in the platform backend crate; this crate only ever sees it through
//! the [`backend::VolumeSearch`] trait.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ferret_core::{coordinator, CancelFlag, NamePredicate, SearchSpec};
//!
//! let spec = SearchSpec::new(NamePredicate::glob("*.rs")?, false);
//! let (tx, rx) = crossbeam_channel::bounded(1024);
//! let stats = coordinator::run(&backend, &volumes, &spec, tx, &CancelFlag::new());
//! for m in rx {
//!     println!("{}", m.path);
//! }
//! ```

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod predicate;

// Re-export commonly used types
pub use backend::{CancelFlag, MatchSink, SearchMatch, SearchSpec, VolumeSearch};
pub use coordinator::SearchStats;
pub use error::{FerretError, Result};
pub use predicate::NamePredicate;
