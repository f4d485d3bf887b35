//! Search requests and CLI configuration.

use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::matcher::Pattern;

/// Returns the default worker count: the host's reported concurrency.
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1)
}

/// Parameters of one search. Immutable once the search has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningRequest {
    /// Wanted address prefix; may be empty and may carry a `0x` marker
    pub prefix: String,
    /// Wanted address suffix; may be empty
    pub suffix: String,
    /// Compare against the checksum encoding, byte for byte
    pub case_sensitive: bool,
    /// Number of parallel search workers
    pub worker_count: usize,
}

impl MiningRequest {
    /// Creates a case-insensitive request using one worker per core.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            case_sensitive: false,
            worker_count: default_worker_count(),
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Compiles the request's pattern.
    pub fn pattern(&self) -> Pattern {
        Pattern::new(self.prefix.as_str(), self.suffix.as_str(), self.case_sensitive)
    }

    /// Validates the request.
    ///
    /// A worker count of zero is rejected rather than clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.worker_count));
        }
        self.pattern().validate()
    }
}

/// Vanity Address Miner
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address prefix to search for (hex characters only, optional 0x)
    #[arg(short, long, default_value = "")]
    pub prefix: String,

    /// Address suffix to search for (hex characters only)
    #[arg(short, long, default_value = "")]
    pub suffix: String,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Case sensitive matching against the EIP-55 checksum form
    #[arg(short = 'c', long, default_value = "false")]
    pub case_sensitive: bool,

    /// Progress report interval in milliseconds
    #[arg(short = 'r', long, default_value = "1000")]
    pub report_interval: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval)
    }

    /// Builds the library request this invocation describes.
    pub fn to_request(&self) -> MiningRequest {
        MiningRequest::new(self.prefix.as_str(), self.suffix.as_str())
            .with_case_sensitive(self.case_sensitive)
            .with_workers(self.worker_count())
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }

        let request = self.to_request();
        let pattern = request.pattern();
        if pattern.prefix().is_empty() && pattern.suffix().is_empty() {
            return Err(ConfigError::InvalidPattern(
                "At least one of --prefix or --suffix is required".into(),
            ));
        }
        request.validate()
    }
}
