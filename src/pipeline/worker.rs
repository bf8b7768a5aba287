//! Trial workers: pull candidates, check them against the worker's own archive handle, count every trial.

use crossbeam_channel::{RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use std::thread::{self, JoinHandle};

use crate::engine::archive::{CheckOutcome, PasswordCheck};
use crate::utils::config::TRIAL_ERROR_WARN_LIMIT;
use crate::{Candidate, TrialOutcome};

use super::context::{Extraction, FoundPassword, WorkerContext, WorkerEvent};

/// Map the archive's answer for `candidate` to a [`TrialOutcome`].
pub fn classify(candidate: &str, outcome: CheckOutcome) -> TrialOutcome {
    match outcome {
        CheckOutcome::Opened => TrialOutcome::Success(candidate.to_string()),
        CheckOutcome::WrongPassword => TrialOutcome::WrongPassword,
        CheckOutcome::OtherError(reason) => TrialOutcome::Error(reason),
    }
}

/// Announces the worker's exit when dropped, including during a panic unwind.
struct ExitGuard {
    worker_id: usize,
    event_tx: Sender<WorkerEvent>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let _ = self.event_tx.send(WorkerEvent::Exited {
            worker_id: self.worker_id,
            panicked: thread::panicking(),
        });
    }
}

/// Single trial worker. Leaves the loop when the run stops, or when the queue is drained and the producer is gone.
fn trial_worker_loop<H: PasswordCheck>(worker_id: usize, mut handle: H, ctx: WorkerContext) {
    let _guard = ExitGuard {
        worker_id,
        event_tx: ctx.event_tx.clone(),
    };
    let mut trial_errors = 0_usize;
    while !ctx.state.should_stop() {
        let candidate: Candidate = match ctx.candidate_rx.recv_timeout(ctx.poll_interval) {
            Ok(c) => c,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let outcome = classify(&candidate, handle.try_password(&candidate));
        ctx.state.record_attempt();
        match outcome {
            TrialOutcome::WrongPassword => {}
            TrialOutcome::Error(reason) => {
                trial_errors += 1;
                if trial_errors <= TRIAL_ERROR_WARN_LIMIT {
                    warn!("worker {}: check failed for a candidate: {}", worker_id, reason);
                } else {
                    debug!("worker {}: check failed for a candidate: {}", worker_id, reason);
                }
            }
            TrialOutcome::Success(password) => {
                let found = FoundPassword {
                    password: password.clone(),
                    worker_id,
                };
                if ctx.state.claim(found) {
                    info!("worker {} found the password", worker_id);
                    let outcome = extract_found(&mut handle, &password, &ctx);
                    ctx.state.post_extraction(outcome);
                    let _ = ctx.event_tx.send(WorkerEvent::Found { worker_id });
                }
                break;
            }
        }
    }
    debug!("worker {} exiting", worker_id);
}

/// Extract the archive (if requested) with the confirmed password.
fn extract_found<H: PasswordCheck>(
    handle: &mut H,
    password: &str,
    ctx: &WorkerContext,
) -> Extraction {
    let Some(dest) = ctx.extract_to.as_deref() else {
        return Extraction::Skipped;
    };
    match handle.extract(password, dest) {
        Ok(path) => Extraction::Done(path),
        Err(e) => {
            error!("extraction to {} failed: {}", dest.display(), e);
            Extraction::Failed(format!("extraction failed: {e}"))
        }
    }
}

/// Spawn one trial worker per handle. Worker ids start at 1.
/// On a spawn failure, returns the workers already started together with the error.
pub fn spawn_trial_workers<H: PasswordCheck>(
    handles: Vec<H>,
    ctx: &WorkerContext,
) -> (Vec<JoinHandle<()>>, Option<std::io::Error>) {
    let mut spawned = Vec::with_capacity(handles.len());
    for (i, handle) in handles.into_iter().enumerate() {
        let worker_id = i + 1;
        let ctx = ctx.clone();
        match thread::Builder::new()
            .name(format!("worker-{worker_id}"))
            .spawn(move || trial_worker_loop(worker_id, handle, ctx))
        {
            Ok(h) => spawned.push(h),
            Err(e) => return (spawned, Some(e)),
        }
    }
    (spawned, None)
}
