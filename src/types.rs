//! Public types for the zipcrack API: attack plans, run options, trial outcomes and results.

use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::config::{RunDefaults, WorkerThreadLimits};

/// One password to try. Non-empty; duplicates are allowed.
pub type Candidate = String;

/// What to try: lines of a wordlist file, or every string over a charset up to a length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttackPlan {
    Wordlist(PathBuf),
    Bruteforce { max_length: usize, charset: String },
}

/// Result of testing one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    WrongPassword,
    Success(Candidate),
    Error(String),
}

/// Terminal state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Exhausted,
    TimedOut,
    Cancelled,
    Failed,
}

impl RunStatus {
    /// Process exit status: 0 success, 130 user interruption, 1 anything else.
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Succeeded => 0,
            RunStatus::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Outcome of one run. Produced exactly once by the coordinator.
#[derive(Clone, Debug, Serialize)]
pub struct CrackResult {
    pub status: RunStatus,
    pub success: bool,
    pub password: Option<String>,
    /// Trials actually executed, summed over all workers.
    pub attempts: u64,
    #[serde(rename = "elapsed_secs", serialize_with = "duration_as_secs")]
    pub elapsed: Duration,
    /// Worker that found the password.
    pub worker_id: Option<usize>,
    pub error: Option<String>,
    /// Directory the archive was extracted into after success.
    pub extracted_to: Option<PathBuf>,
}

fn duration_as_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl CrackResult {
    /// Failed before any thread started: zero attempts.
    pub fn failed(error: impl ToString, elapsed: Duration) -> Self {
        Self {
            status: RunStatus::Failed,
            success: false,
            password: None,
            attempts: 0,
            elapsed,
            worker_id: None,
            error: Some(error.to_string()),
            extracted_to: None,
        }
    }

    pub fn rate_per_second(&self) -> f64 {
        rate(self.attempts, self.elapsed)
    }
}

/// Periodic progress snapshot handed to the observer.
#[derive(Clone, Copy, Debug)]
pub struct ProgressSnapshot {
    pub attempts: u64,
    pub elapsed: Duration,
    pub rate_per_second: f64,
}

impl ProgressSnapshot {
    pub fn new(attempts: u64, elapsed: Duration) -> Self {
        Self {
            attempts,
            elapsed,
            rate_per_second: rate(attempts, elapsed),
        }
    }
}

fn rate(attempts: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        attempts as f64 / secs
    } else {
        0.0
    }
}

/// Run options for [`Cracker`](crate::pipeline::Cracker).
#[derive(Clone, Debug)]
pub struct CrackOpts {
    /// Worker count. When None, uses all available threads.
    pub threads: Option<usize>,
    /// Producer batch size; the candidate queue holds twice this many.
    pub buffer_size: usize,
    /// Ceiling on the whole run.
    pub timeout: Duration,
    /// How long to wait for threads to exit after the run ends.
    pub grace_period: Duration,
    /// Queue wait before re-checking the stop flags.
    pub poll_interval: Duration,
    /// Minimum time between progress snapshots.
    pub progress_interval: Duration,
}

impl Default for CrackOpts {
    fn default() -> Self {
        Self {
            threads: None,
            buffer_size: RunDefaults::BUFFER_SIZE,
            timeout: RunDefaults::TIMEOUT,
            grace_period: RunDefaults::GRACE_PERIOD,
            poll_interval: RunDefaults::POLL_INTERVAL,
            progress_interval: RunDefaults::PROGRESS_INTERVAL,
        }
    }
}

impl CrackOpts {
    /// Effective worker count (at least 1).
    pub fn worker_count(&self) -> usize {
        self.threads
            .unwrap_or_else(|| WorkerThreadLimits::current().all_threads)
            .max(1)
    }

    /// Effective producer batch size (at least 1).
    pub fn batch_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}
