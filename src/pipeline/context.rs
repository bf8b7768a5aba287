//! Per-run shared state and the channels that connect producer, workers and coordinator.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::Candidate;
use crate::utils::config::RunDefaults;

/// The password a worker claimed. Written once, before any extraction starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundPassword {
    pub password: Candidate,
    pub worker_id: usize,
}

/// What the winner's extraction came to. Absent while it is still running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// No destination was requested.
    Skipped,
    Done(PathBuf),
    Failed(String),
}

/// State shared by the producer and workers for one run. Created fresh by the coordinator for every run.
#[derive(Debug)]
pub struct RunState {
    cancelled: AtomicBool,
    attempts: AtomicU64,
    winner: OnceLock<FoundPassword>,
    extraction: OnceLock<Extraction>,
    first_error: Mutex<Option<String>>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            winner: OnceLock::new(),
            extraction: OnceLock::new(),
            first_error: Mutex::new(None),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_found(&self) -> bool {
        self.winner.get().is_some()
    }

    /// True once the run is cancelled or a password was found. Polled by every loop.
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.is_found()
    }

    /// Count one executed trial.
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Write the result slot if it is still empty. Exactly one caller per run gets `true`;
    /// the found flag is set from then on.
    pub fn claim(&self, found: FoundPassword) -> bool {
        self.winner.set(found).is_ok()
    }

    pub fn winner(&self) -> Option<&FoundPassword> {
        self.winner.get()
    }

    /// Record the winner's extraction. Only the worker whose [`claim`](Self::claim) succeeded calls this.
    pub fn post_extraction(&self, outcome: Extraction) {
        if self.extraction.set(outcome).is_err() {
            log::warn!("extraction already recorded; ignoring second outcome");
        }
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        self.extraction.get()
    }

    /// Keep the first error only.
    pub fn record_error(&self, msg: String) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.get_or_insert(msg);
    }

    pub fn first_error(&self) -> Option<String> {
        self.first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Sent by workers to the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerEvent {
    /// This worker won the run and finished its extraction.
    Found { worker_id: usize },
    /// This worker left its loop; `panicked` when it unwound.
    Exited { worker_id: usize, panicked: bool },
}

/// Tuning for one run, derived from [`CrackOpts`](crate::CrackOpts).
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub num_threads: usize,
    pub batch_size: usize,
    /// Candidate queue capacity.
    pub channel_cap: usize,
    pub poll_interval: Duration,
}

impl PipelineTuning {
    pub fn new(num_threads: usize, batch_size: usize, poll_interval: Duration) -> Self {
        Self {
            num_threads,
            batch_size,
            channel_cap: batch_size.saturating_mul(RunDefaults::CHANNEL_CAP_FACTOR),
            poll_interval,
        }
    }
}

/// Channels and shared state for one run. Producer gets `candidate_tx`; workers get `candidate_rx` and `event_tx`.
pub struct PipelineChannels {
    pub candidate_tx: Sender<Candidate>,
    pub candidate_rx: Receiver<Candidate>,
    pub event_tx: Sender<WorkerEvent>,
    pub event_rx: Receiver<WorkerEvent>,
    pub state: Arc<RunState>,
}

pub fn create_pipeline_channels(tuning: &PipelineTuning) -> PipelineChannels {
    let (candidate_tx, candidate_rx) = bounded::<Candidate>(tuning.channel_cap);
    let (event_tx, event_rx) = unbounded::<WorkerEvent>();
    PipelineChannels {
        candidate_tx,
        candidate_rx,
        event_tx,
        event_rx,
        state: Arc::new(RunState::new()),
    }
}

/// Everything one worker needs besides its archive handle.
#[derive(Clone)]
pub struct WorkerContext {
    pub candidate_rx: Receiver<Candidate>,
    pub event_tx: Sender<WorkerEvent>,
    pub state: Arc<RunState>,
    pub extract_to: Option<PathBuf>,
    pub poll_interval: Duration,
}

/// Handles returned by [`launch_pipeline`](super::launch_pipeline): wait on `event_rx`, then join.
pub struct PipelineHandles {
    pub event_rx: Receiver<WorkerEvent>,
    pub producer_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub state: Arc<RunState>,
}
