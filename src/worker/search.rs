//! The per-thread search loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use rand::RngCore;
use tracing::debug;

use crate::crypto::{AddressDeriver, Candidate, KeyGenerator, ENCODED_LEN};
use crate::matcher::Pattern;

use super::event::{MiningResult, ProgressReport, SessionId, WorkerEvent, WorkerMessage};

/// Lifecycle of a search worker.
///
/// `Running -> Stopped` is the only externally triggered transition; the
/// other terminal states are reached by the worker itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Stopped,
    Matched,
    Failed,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkerState::Stopped | WorkerState::Matched | WorkerState::Failed
        )
    }
}

/// A worker that generates keys and tests their addresses.
pub struct SearchWorker<R> {
    /// Worker ID
    id: usize,
    /// Session this worker belongs to
    session: SessionId,
    /// The pattern to match against
    pattern: Pattern,
    /// This worker's own key stream
    keys: KeyGenerator<R>,
    deriver: AddressDeriver,
    /// Coordinator inbox
    events: Sender<WorkerMessage>,
    /// Session-wide cancellation flag
    cancel: Arc<AtomicBool>,
    report_interval: Duration,
    state: WorkerState,
}

impl<R: RngCore> SearchWorker<R> {
    /// Creates a new worker in the `Idle` state.
    pub fn new(
        id: usize,
        session: SessionId,
        pattern: Pattern,
        rng: R,
        events: Sender<WorkerMessage>,
        cancel: Arc<AtomicBool>,
        report_interval: Duration,
    ) -> Self {
        Self {
            id,
            session,
            pattern,
            keys: KeyGenerator::new(rng),
            deriver: AddressDeriver::new(),
            events,
            cancel,
            report_interval,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs the worker loop and returns the terminal state.
    ///
    /// Consumes the worker: a finished worker cannot be restarted.
    ///
    /// Loops until:
    /// - A match is found (final progress, then the result, is sent)
    /// - Key generation fails (the error is sent)
    /// - The cancel flag is set or the inbox is gone
    pub fn run(mut self) -> WorkerState {
        self.state = WorkerState::Running;

        let encoding = self.pattern.encoding();
        let mut rendered = [0u8; ENCODED_LEN];
        let mut attempts: u64 = 0;
        let mut last_report = Instant::now();

        while self.state == WorkerState::Running {
            if self.cancel.load(Ordering::Relaxed) {
                self.state = WorkerState::Stopped;
                break;
            }

            let candidate = match Candidate::generate(&mut self.keys, &self.deriver) {
                Ok(candidate) => candidate,
                Err(e) => {
                    self.emit(WorkerEvent::Failed(e));
                    self.state = WorkerState::Failed;
                    break;
                }
            };
            attempts += 1;

            let address = candidate.address().encode_into(encoding, &mut rendered);
            if self.pattern.matches_bytes(address) {
                let result = MiningResult {
                    address: candidate.address().encode(encoding),
                    private_key: candidate.private_key_hex(),
                    worker_id: self.id,
                };
                self.emit(WorkerEvent::Progress(ProgressReport { attempts }));
                self.emit(WorkerEvent::Found(result));
                self.state = WorkerState::Matched;
                break;
            }

            if last_report.elapsed() >= self.report_interval {
                if !self.emit(WorkerEvent::Progress(ProgressReport { attempts })) {
                    self.state = WorkerState::Stopped;
                    break;
                }
                attempts = 0;
                last_report = Instant::now();
            }
        }

        debug!(worker = self.id, session = self.session, state = ?self.state, "worker finished");
        self.state
    }

    /// Sends an event to the coordinator. Returns false if nobody listens.
    fn emit(&self, event: WorkerEvent) -> bool {
        self.events
            .send(WorkerMessage {
                session: self.session,
                worker_id: self.id,
                event,
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing::FailingRng;
    use crate::crypto::{derive_address_from_hex, Address, EntropySource, SeededEntropy};
    use crate::error::MiningError;
    use crossbeam_channel::unbounded;

    fn seeded(worker_id: usize) -> rand::rngs::StdRng {
        SeededEntropy::new(99).rng_for(worker_id).unwrap()
    }

    #[test]
    fn test_empty_pattern_matches_first_key() {
        let (tx, rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = SearchWorker::new(
            4,
            1,
            Pattern::new("", "", false),
            seeded(4),
            tx,
            cancel,
            Duration::from_secs(1),
        );
        assert_eq!(worker.state(), WorkerState::Idle);
        assert_eq!(worker.run(), WorkerState::Matched);

        let messages: Vec<_> = rx.try_iter().collect();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.session == 1 && m.worker_id == 4));
        assert!(matches!(
            messages[0].event,
            WorkerEvent::Progress(ProgressReport { attempts: 1 })
        ));
        match &messages[1].event {
            WorkerEvent::Found(result) => {
                assert_eq!(result.worker_id, 4);
                assert_eq!(
                    derive_address_from_hex(&result.private_key).unwrap(),
                    result.address
                );
            }
            other => panic!("expected a result, got {:?}", other),
        }
    }

    #[test]
    fn test_checksum_mode_reports_checksum_address() {
        let (tx, rx) = unbounded();
        let worker = SearchWorker::new(
            0,
            1,
            Pattern::new("", "", true),
            seeded(0),
            tx,
            Arc::new(AtomicBool::new(false)),
            Duration::from_secs(1),
        );
        assert_eq!(worker.run(), WorkerState::Matched);

        let found = rx.try_iter().find_map(|m| match m.event {
            WorkerEvent::Found(result) => Some(result),
            _ => None,
        });
        let result = found.expect("worker should report its match");
        let lowercase = derive_address_from_hex(&result.private_key).unwrap();
        let bytes: [u8; 20] = hex::decode(&lowercase[2..]).unwrap().try_into().unwrap();
        assert_eq!(result.address, Address::from_bytes(bytes).to_checksum());
    }

    #[test]
    fn test_cancelled_worker_stops_without_events() {
        let (tx, rx) = unbounded();
        let worker = SearchWorker::new(
            0,
            1,
            Pattern::new("", "", false),
            seeded(0),
            tx,
            Arc::new(AtomicBool::new(true)),
            Duration::from_secs(1),
        );
        assert_eq!(worker.run(), WorkerState::Stopped);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_entropy_failure_is_terminal() {
        let (tx, rx) = unbounded();
        let worker = SearchWorker::new(
            2,
            7,
            Pattern::new("dead", "", false),
            FailingRng,
            tx,
            Arc::new(AtomicBool::new(false)),
            Duration::from_secs(1),
        );
        assert_eq!(worker.run(), WorkerState::Failed);

        let message = rx.try_recv().unwrap();
        assert_eq!(message.session, 7);
        assert!(matches!(
            message.event,
            WorkerEvent::Failed(MiningError::EntropyUnavailable(_))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_progress_is_reported_as_deltas() {
        let (tx, rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = SearchWorker::new(
            0,
            1,
            Pattern::new("ffffffffffffffff", "", false),
            seeded(0),
            tx,
            cancel.clone(),
            Duration::from_millis(10),
        );
        let handle = std::thread::spawn(move || worker.run());

        let mut reports = 0;
        while reports < 3 {
            let message = rx.recv_timeout(Duration::from_secs(30)).unwrap();
            match message.event {
                WorkerEvent::Progress(report) => {
                    assert!(report.attempts > 0);
                    reports += 1;
                }
                other => panic!("unexpected event {:?}", other),
            }
        }

        cancel.store(true, Ordering::Relaxed);
        assert_eq!(handle.join().unwrap(), WorkerState::Stopped);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!WorkerState::Idle.is_terminal());
        assert!(!WorkerState::Running.is_terminal());
        assert!(WorkerState::Stopped.is_terminal());
        assert!(WorkerState::Matched.is_terminal());
        assert!(WorkerState::Failed.is_terminal());
    }
}
