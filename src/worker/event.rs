//! Messages exchanged between workers, the coordinator and its caller.

use crate::error::MiningError;

/// Identifies one search session. Messages carry it so the coordinator can
/// drop anything sent by workers of a torn-down session.
pub type SessionId = u64;

/// Attempts completed by one worker since its previous report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    pub attempts: u64,
}

/// Result of a successful vanity address search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningResult {
    /// The address, `0x` prefixed, in the encoding it was matched against
    pub address: String,
    /// The private key (hex encoded, no 0x prefix)
    pub private_key: String,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

/// What a worker reports.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress(ProgressReport),
    Found(MiningResult),
    Failed(MiningError),
}

/// A worker event tagged with its origin.
#[derive(Debug)]
pub struct WorkerMessage {
    pub session: SessionId,
    pub worker_id: usize,
    pub event: WorkerEvent,
}

/// What the coordinator surfaces to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinerEvent {
    /// Running totals across all workers of the session.
    Progress { total_attempts: u64, throughput: u64 },
    /// Terminal: a worker found a match.
    Result(MiningResult),
    /// Terminal: a worker failed and the session was torn down.
    Error { message: String },
}

impl MinerEvent {
    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MinerEvent::Progress { .. })
    }
}
