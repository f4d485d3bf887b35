//! Search session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::MiningRequest;
use crate::crypto::{EntropySource, OsEntropy};
use crate::error::ConfigError;
use crate::matcher::Pattern;

use super::event::{MinerEvent, ProgressReport, SessionId, WorkerEvent, WorkerMessage};
use super::search::{SearchWorker, WorkerState};

/// Tuning knobs for a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// How often each worker reports its attempt count
    pub report_interval: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_secs(1),
        }
    }
}

struct WorkerHandle {
    id: usize,
    thread: JoinHandle<WorkerState>,
}

/// Live state of the running search.
struct SearchSession {
    id: SessionId,
    request: MiningRequest,
    workers: Vec<WorkerHandle>,
    cancel: Arc<AtomicBool>,
    total_attempts: u64,
    start_time: Instant,
}

impl SearchSession {
    fn record(&mut self, report: ProgressReport) {
        self.total_attempts = self.total_attempts.saturating_add(report.attempts);
    }

    /// Attempts per second since the session started; 0 before the first
    /// millisecond has elapsed.
    fn throughput(&self) -> u64 {
        let elapsed_ms = self.start_time.elapsed().as_millis() as u64;
        if elapsed_ms == 0 {
            0
        } else {
            self.total_attempts.saturating_mul(1000) / elapsed_ms
        }
    }

    /// Cancels every worker and waits for them to leave their loop, which
    /// takes at most one iteration each.
    fn shutdown(self) {
        self.cancel.store(true, Ordering::Relaxed);
        join_workers(self.id, self.workers);
    }
}

fn join_workers(session: SessionId, workers: Vec<WorkerHandle>) {
    for worker in workers {
        match worker.thread.join() {
            Ok(state) => debug!(session, worker = worker.id, ?state, "worker joined"),
            Err(_) => warn!(session, worker = worker.id, "worker panicked"),
        }
    }
}

/// Owns the search session lifecycle.
///
/// All session state is mutated from the thread that owns the coordinator.
/// Workers talk to it only through a single inbox, so no locking is needed.
pub struct Coordinator<E: EntropySource = OsEntropy> {
    entropy: Arc<E>,
    options: CoordinatorOptions,
    inbox_tx: Sender<WorkerMessage>,
    inbox_rx: Receiver<WorkerMessage>,
    next_session: SessionId,
    session: Option<SearchSession>,
}

impl Coordinator<OsEntropy> {
    /// Creates a coordinator drawing keys from OS entropy.
    pub fn new() -> Self {
        Self::with_entropy(OsEntropy, CoordinatorOptions::default())
    }
}

impl Default for Coordinator<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntropySource> Coordinator<E> {
    /// Creates a coordinator with a custom entropy source.
    pub fn with_entropy(entropy: E, options: CoordinatorOptions) -> Self {
        let (inbox_tx, inbox_rx) = unbounded();
        Self {
            entropy: Arc::new(entropy),
            options,
            inbox_tx,
            inbox_rx,
            next_session: 1,
            session: None,
        }
    }

    /// Starts a new search, tearing down the active one first.
    ///
    /// Fails before any worker runs if the request is invalid or worker
    /// threads cannot be spawned.
    pub fn start(&mut self, request: MiningRequest) -> Result<SessionId, ConfigError> {
        self.stop();
        request.validate()?;

        let id = self.next_session;
        self.next_session += 1;

        let pattern = request.pattern();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(request.worker_count);

        for worker_id in 0..request.worker_count {
            match self.spawn_worker(id, worker_id, pattern.clone(), cancel.clone()) {
                Ok(thread) => workers.push(WorkerHandle {
                    id: worker_id,
                    thread,
                }),
                Err(e) => {
                    cancel.store(true, Ordering::Relaxed);
                    join_workers(id, workers);
                    return Err(ConfigError::ParallelismUnavailable(e.to_string()));
                }
            }
        }

        info!(
            session = id,
            prefix = %request.prefix,
            suffix = %request.suffix,
            case_sensitive = request.case_sensitive,
            workers = request.worker_count,
            "search started"
        );

        self.session = Some(SearchSession {
            id,
            request,
            workers,
            cancel,
            total_attempts: 0,
            start_time: Instant::now(),
        });

        Ok(id)
    }

    fn spawn_worker(
        &self,
        session: SessionId,
        worker_id: usize,
        pattern: Pattern,
        cancel: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<WorkerState>> {
        let entropy = self.entropy.clone();
        let events = self.inbox_tx.clone();
        let report_interval = self.options.report_interval;

        thread::Builder::new()
            .name(format!("vanity-worker-{}", worker_id))
            .spawn(move || match entropy.rng_for(worker_id) {
                Ok(rng) => SearchWorker::new(
                    worker_id,
                    session,
                    pattern,
                    rng,
                    events,
                    cancel,
                    report_interval,
                )
                .run(),
                Err(e) => {
                    let _ = events.send(WorkerMessage {
                        session,
                        worker_id,
                        event: WorkerEvent::Failed(e),
                    });
                    WorkerState::Failed
                }
            })
    }

    /// Cancels the active search, if any, and resets statistics.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            let id = session.id;
            session.shutdown();
            info!(session = id, "search stopped");
        }
    }

    /// Waits up to `timeout` for the next event of the active session.
    ///
    /// Returns `None` on timeout or when no session is active. Messages from
    /// torn-down sessions are discarded. After a terminal event the session
    /// is gone, so nothing else is returned until the next `start`.
    /// A timeout too large to represent as a deadline waits indefinitely.
    pub fn next_event(&mut self, timeout: Duration) -> Option<MinerEvent> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            self.session.as_ref()?;
            let message = match deadline {
                Some(deadline) => self.inbox_rx.recv_deadline(deadline).ok()?,
                None => self.inbox_rx.recv().ok()?,
            };
            if let Some(event) = self.deliver(message) {
                return Some(event);
            }
        }
    }

    /// Applies one worker message to the session.
    fn deliver(&mut self, message: WorkerMessage) -> Option<MinerEvent> {
        let session = self.session.as_mut()?;
        if message.session != session.id {
            debug!(
                session = message.session,
                worker = message.worker_id,
                "dropping stale worker message"
            );
            return None;
        }

        match message.event {
            WorkerEvent::Progress(report) => {
                session.record(report);
                Some(MinerEvent::Progress {
                    total_attempts: session.total_attempts,
                    throughput: session.throughput(),
                })
            }
            WorkerEvent::Found(result) => {
                info!(
                    session = session.id,
                    worker = result.worker_id,
                    address = %result.address,
                    attempts = session.total_attempts,
                    "match found"
                );
                self.stop();
                Some(MinerEvent::Result(result))
            }
            WorkerEvent::Failed(error) => {
                warn!(
                    session = session.id,
                    worker = message.worker_id,
                    %error,
                    "worker failed, ending search"
                );
                self.stop();
                Some(MinerEvent::Error {
                    message: error.to_string(),
                })
            }
        }
    }

    /// Returns true while a search is running.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the request of the running search.
    pub fn request(&self) -> Option<&MiningRequest> {
        self.session.as_ref().map(|s| &s.request)
    }

    /// Returns the number of workers in the running search.
    pub fn num_workers(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.workers.len())
    }

    /// Returns the attempts reported so far in the running search.
    pub fn total_attempts(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.total_attempts)
    }

    /// Returns the current attempt rate (attempts per second).
    pub fn throughput(&self) -> u64 {
        self.session.as_ref().map_or(0, SearchSession::throughput)
    }

    /// Returns the elapsed time of the running search.
    pub fn elapsed(&self) -> Duration {
        self.session
            .as_ref()
            .map_or(Duration::ZERO, |s| s.start_time.elapsed())
    }
}

impl<E: EntropySource> Drop for Coordinator<E> {
    fn drop(&mut self) {
        self.stop();
    }
}
