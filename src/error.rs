//! Error types shared across the miner.

/// Fatal failure of a running search.
///
/// Any of these ends the whole session: one worker failing is treated as an
/// environment problem the remaining workers would hit as well.
#[derive(Debug, thiserror::Error)]
pub enum MiningError {
    #[error("Secure randomness unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Rejected start request. Returned before any worker is spawned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid worker count {0}: at least one worker is required")]
    InvalidWorkerCount(usize),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid report interval: must be at least 1 ms")]
    InvalidReportInterval,

    #[error("Parallel execution unavailable: {0}")]
    ParallelismUnavailable(String),
}
