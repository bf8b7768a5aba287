//! Producer loop: drains a candidate source into the bounded queue in batches, stopping on cancel/found.

use crossbeam_channel::{SendTimeoutError, Sender};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::Candidate;
use crate::error::CrackError;

use super::context::RunState;

/// Start the producer on its own named thread over any `Send` candidate stream.
pub fn spawn_producer_thread<I>(
    source: I,
    candidate_tx: Sender<Candidate>,
    state: Arc<RunState>,
    batch_size: usize,
    poll_interval: Duration,
) -> std::io::Result<JoinHandle<usize>>
where
    I: Iterator<Item = Result<Candidate, CrackError>> + Send + 'static,
{
    thread::Builder::new()
        .name("producer".to_string())
        .spawn(move || run_producer_loop(source, candidate_tx, &state, batch_size, poll_interval))
}

/// Run the producer loop: pull up to `batch_size` candidates from `iter`, then push them to `candidate_tx`.
/// Flags are checked at each batch boundary and while blocked on a full queue.
/// A source error is recorded in `state` and ends production. Drops `candidate_tx` when done, which
/// disconnects the queue once workers drain it. Returns the number of candidates queued.
pub fn run_producer_loop<I>(
    iter: I,
    candidate_tx: Sender<Candidate>,
    state: &RunState,
    batch_size: usize,
    poll_interval: Duration,
) -> usize
where
    I: IntoIterator<Item = Result<Candidate, CrackError>>,
{
    let batch_size = batch_size.max(1);
    let mut iter = iter.into_iter();
    let mut batch: Vec<Candidate> = Vec::with_capacity(batch_size);
    let mut count = 0_usize;
    let mut exhausted = false;

    'batches: while !exhausted && !state.should_stop() {
        while batch.len() < batch_size {
            match iter.next() {
                Some(Ok(candidate)) => batch.push(candidate),
                Some(Err(e)) => {
                    state.record_error(e.to_string());
                    exhausted = true;
                    break;
                }
                None => {
                    exhausted = true;
                    break;
                }
            }
        }
        for candidate in batch.drain(..) {
            if !send_until_stopped(&candidate_tx, candidate, state, poll_interval) {
                break 'batches;
            }
            count += 1;
        }
    }
    debug!(
        "producer: queued {} candidates (exhausted: {}, stopped: {})",
        count,
        exhausted,
        state.should_stop()
    );
    drop(candidate_tx);
    count
}

/// Push one candidate, waiting on a full queue in `poll_interval` steps. False when the run
/// stopped or every worker is gone.
fn send_until_stopped(
    tx: &Sender<Candidate>,
    mut candidate: Candidate,
    state: &RunState,
    poll_interval: Duration,
) -> bool {
    loop {
        if state.should_stop() {
            return false;
        }
        match tx.send_timeout(candidate, poll_interval) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(back)) => candidate = back,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
