//! Parallel search: per-thread workers and the coordinator that owns them.
//!
//! This module provides:
//! - `SearchWorker`: the generate/derive/match loop run on each thread
//! - `Coordinator`: session lifecycle, progress aggregation, first-result wins
//! - The event types exchanged between the two and surfaced to callers

mod coordinator;
mod event;
mod search;

pub use coordinator::{Coordinator, CoordinatorOptions};
pub use event::{MinerEvent, MiningResult, ProgressReport, SessionId, WorkerEvent, WorkerMessage};
pub use search::{SearchWorker, WorkerState};
