use log::warn;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::RunStatus;

use super::context::{Extraction, RunState};

/// How often to check whether threads finished while waiting out the grace period.
const JOIN_POLL: Duration = Duration::from_millis(5);

/// What joining the producer and workers turned up.
#[derive(Debug, Default)]
pub struct JoinReport {
    /// Candidates the producer queued, when it was joined.
    pub produced: Option<usize>,
    /// Names of threads that panicked.
    pub panicked: Vec<String>,
    /// Threads still running after the grace period (left detached).
    pub detached: usize,
}

/// Best-effort join: wait up to `grace` for every thread to finish, join those that did, detach the rest.
pub fn join_with_grace(
    producer: JoinHandle<usize>,
    workers: Vec<JoinHandle<()>>,
    grace: Duration,
) -> JoinReport {
    let deadline = Instant::now() + grace;
    while Instant::now() < deadline
        && !(producer.is_finished() && workers.iter().all(JoinHandle::is_finished))
    {
        thread::sleep(JOIN_POLL);
    }

    let mut report = JoinReport::default();
    if producer.is_finished() {
        match producer.join() {
            Ok(n) => report.produced = Some(n),
            Err(_) => report.panicked.push("producer".to_string()),
        }
    } else {
        report.detached += 1;
    }
    for h in workers {
        if !h.is_finished() {
            report.detached += 1;
            continue;
        }
        let name = h.thread().name().unwrap_or("worker").to_string();
        if h.join().is_err() {
            report.panicked.push(name);
        }
    }
    if report.detached > 0 {
        warn!(
            "{} thread(s) still running after the {:?} grace period; leaving them detached",
            report.detached, grace
        );
    }
    report
}

/// Final status and error message for a run, after threads were joined.
/// A claimed password always wins, whether or not its extraction finished; otherwise panics and
/// producer errors turn the run into `Failed`.
pub fn resolve_terminal(
    status: RunStatus,
    state: &RunState,
    report: &JoinReport,
    timeout: Duration,
) -> (RunStatus, Option<String>) {
    if state.winner().is_some() {
        let error = match state.extraction() {
            Some(Extraction::Failed(msg)) => Some(msg.clone()),
            Some(Extraction::Skipped | Extraction::Done(_)) => None,
            None => Some(format!(
                "extraction still running when the run ended ({status:?})"
            )),
        };
        return (RunStatus::Succeeded, error);
    }
    if !report.panicked.is_empty() {
        return (
            RunStatus::Failed,
            Some(format!("thread panicked: {}", report.panicked.join(", "))),
        );
    }
    match status {
        RunStatus::Cancelled => (status, Some("cancelled by user".to_string())),
        RunStatus::TimedOut => (status, Some(format!("timed out after {:?}", timeout))),
        RunStatus::Exhausted => match state.first_error() {
            Some(msg) => (RunStatus::Failed, Some(msg)),
            None => (status, None),
        },
        RunStatus::Failed => (
            status,
            Some(
                state
                    .first_error()
                    .unwrap_or_else(|| "run failed".to_string()),
            ),
        ),
        // Unreachable in practice: a success event always follows a written slot.
        RunStatus::Succeeded => (
            RunStatus::Failed,
            Some("success reported without a password".to_string()),
        ),
    }
}
