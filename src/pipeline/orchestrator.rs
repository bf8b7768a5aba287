use crossbeam_channel::RecvTimeoutError;
use log::{debug, error, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::engine::archive::{ArchiveOpener, PasswordCheck};
use crate::error::{CrackError, ErrorKind};
use crate::{AttackPlan, Candidate, CrackOpts, CrackResult, ProgressSnapshot, RunStatus};

use super::context::{
    Extraction, PipelineChannels, PipelineHandles, PipelineTuning, RunState, WorkerContext,
    WorkerEvent, create_pipeline_channels,
};
use super::error_handler::{join_with_grace, resolve_terminal};
use super::producer::spawn_producer_thread;
use super::source::CandidateSource;
use super::worker::spawn_trial_workers;

/// Receives periodic progress snapshots on the thread that called [`Cracker::crack`].
pub type ProgressObserver = Box<dyn FnMut(&ProgressSnapshot) + Send>;

/// Cooperative cancellation for a [`Cracker`]. Cheap to clone; safe to call from any thread (e.g. a Ctrl+C handler).
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request the in-flight run (or the next one, if none is running) to stop. Idempotent.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs attacks against one archive: opens a handle per worker, streams candidates through the
/// pipeline and returns a single [`CrackResult`] per run.
pub struct Cracker<A: ArchiveOpener> {
    opener: A,
    opts: CrackOpts,
    extract_to: Option<PathBuf>,
    stop: StopHandle,
    observer: Option<ProgressObserver>,
}

impl<A: ArchiveOpener> Cracker<A> {
    pub fn new(opener: A, opts: CrackOpts) -> Self {
        Self {
            opener,
            opts,
            extract_to: None,
            stop: StopHandle::default(),
            observer: None,
        }
    }

    /// Extract the archive into `dest` once the password is found.
    pub fn extract_to(mut self, dest: impl Into<PathBuf>) -> Self {
        self.extract_to = Some(dest.into());
        self
    }

    /// Install a progress observer, called at most once per `opts.progress_interval`.
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(&ProgressSnapshot) + Send + 'static,
    {
        self.observer = Some(Box::new(f));
        self
    }

    pub fn opts(&self) -> &CrackOpts {
        &self.opts
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Run `plan` to completion, cancellation or timeout.
    pub fn crack(&mut self, plan: &AttackPlan) -> CrackResult {
        let started = Instant::now();
        let result = match CandidateSource::from_plan(plan) {
            Ok(source) => self.run(source, started),
            Err(e) => failed_before_start(e, started),
        };
        self.stop.reset();
        result
    }

    /// Run an already-opened candidate source, or any other stream of candidates.
    /// An `Err` item ends production and fails the run unless a password was found.
    pub fn crack_source<I>(&mut self, source: I) -> CrackResult
    where
        I: IntoIterator<Item = Result<Candidate, CrackError>>,
        I::IntoIter: Send + 'static,
    {
        let result = self.run(source.into_iter(), Instant::now());
        self.stop.reset();
        result
    }

    fn run<I>(&mut self, source: I, started: Instant) -> CrackResult
    where
        I: Iterator<Item = Result<Candidate, CrackError>> + Send + 'static,
    {
        let tuning = PipelineTuning::new(
            self.opts.worker_count(),
            self.opts.batch_size(),
            self.opts.poll_interval,
        );
        debug!("{} RUN: {:?}", env!("CARGO_PKG_NAME").to_uppercase(), tuning);

        let handles = match open_handles(&self.opener, tuning.num_threads) {
            Ok(h) => h,
            Err(e) => return failed_before_start(e, started),
        };
        let pipeline = match launch_pipeline(source, handles, &tuning, self.extract_to.clone()) {
            Ok(p) => p,
            Err(e) => return failed_before_start(e, started),
        };
        let PipelineHandles {
            event_rx,
            producer_handle,
            worker_handles,
            state,
        } = pipeline;

        let worker_count = worker_handles.len();
        let status = self.wait_for_terminal(&event_rx, &state, worker_count, started);
        debug!("terminal condition: {:?}", status);
        state.cancel();
        let report = join_with_grace(producer_handle, worker_handles, self.opts.grace_period);
        if let Some(n) = report.produced {
            debug!("producer queued {} candidates", n);
        }

        let elapsed = started.elapsed();
        self.emit_progress(&state, elapsed);
        let (status, error) = resolve_terminal(status, &state, &report, self.opts.timeout);
        let winner = state.winner();
        let extracted_to = match state.extraction() {
            Some(Extraction::Done(path)) => Some(path.clone()),
            _ => None,
        };
        CrackResult {
            status,
            success: status == RunStatus::Succeeded,
            password: winner.map(|w| w.password.clone()),
            attempts: state.attempts(),
            elapsed,
            worker_id: winner.map(|w| w.worker_id),
            error,
            extracted_to,
        }
    }

    /// Block until a worker posts a success, every worker exits, the timeout passes or a stop is requested.
    /// A password claimed before stop or timeout is kept even if its extraction has not finished.
    fn wait_for_terminal(
        &mut self,
        event_rx: &crossbeam_channel::Receiver<WorkerEvent>,
        state: &RunState,
        worker_count: usize,
        started: Instant,
    ) -> RunStatus {
        let mut exited = 0_usize;
        let mut last_progress = Instant::now();
        loop {
            match event_rx.recv_timeout(self.opts.poll_interval) {
                Ok(WorkerEvent::Found { worker_id }) => {
                    debug!("worker {} posted the result", worker_id);
                    return RunStatus::Succeeded;
                }
                Ok(WorkerEvent::Exited {
                    worker_id,
                    panicked,
                }) => {
                    if panicked {
                        state.record_error(format!("worker {worker_id} panicked"));
                        return RunStatus::Failed;
                    }
                    exited += 1;
                    if exited >= worker_count {
                        return exhausted_status(state);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return exhausted_status(state),
            }
            if self.stop.is_stop_requested() {
                return RunStatus::Cancelled;
            }
            if started.elapsed() >= self.opts.timeout {
                return RunStatus::TimedOut;
            }
            if last_progress.elapsed() >= self.opts.progress_interval {
                self.emit_progress(state, started.elapsed());
                last_progress = Instant::now();
            }
        }
    }

    fn emit_progress(&mut self, state: &RunState, elapsed: std::time::Duration) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&ProgressSnapshot::new(state.attempts(), elapsed));
        }
    }
}

/// Input errors are the caller's to fix; runtime errors point at the machine.
fn failed_before_start(e: CrackError, started: Instant) -> CrackResult {
    match e.kind() {
        ErrorKind::Input => warn!("cannot start run: {}", e),
        ErrorKind::Runtime => error!("run aborted: {}", e),
    }
    CrackResult::failed(e, started.elapsed())
}

/// All workers are gone: success if the slot was written, failed on a producer error, else exhausted.
fn exhausted_status(state: &RunState) -> RunStatus {
    if state.winner().is_some() {
        RunStatus::Succeeded
    } else if state.first_error().is_some() {
        RunStatus::Failed
    } else {
        RunStatus::Exhausted
    }
}

/// Open one independent archive handle per worker, before any thread starts.
pub fn open_handles<A: ArchiveOpener>(
    opener: &A,
    count: usize,
) -> Result<Vec<A::Handle>, CrackError> {
    (0..count).map(|_| opener.open()).collect()
}

/// Start the producer and one worker per handle. Returns handles; caller waits on `event_rx`
/// and must join `producer_handle` and `worker_handles` when done.
pub fn launch_pipeline<I, H>(
    source: I,
    handles: Vec<H>,
    tuning: &PipelineTuning,
    extract_to: Option<PathBuf>,
) -> Result<PipelineHandles, CrackError>
where
    I: Iterator<Item = Result<Candidate, CrackError>> + Send + 'static,
    H: PasswordCheck,
{
    let PipelineChannels {
        candidate_tx,
        candidate_rx,
        event_tx,
        event_rx,
        state,
    } = create_pipeline_channels(tuning);

    let producer_handle = spawn_producer_thread(
        source,
        candidate_tx,
        Arc::clone(&state),
        tuning.batch_size,
        tuning.poll_interval,
    )
    .map_err(|e| CrackError::Runtime(format!("spawn producer thread: {e}")))?;

    let ctx = WorkerContext {
        candidate_rx,
        event_tx,
        state: Arc::clone(&state),
        extract_to,
        poll_interval: tuning.poll_interval,
    };
    let (worker_handles, spawn_error) = spawn_trial_workers(handles, &ctx);
    // Dropping our copies so the channels disconnect once the threads are gone.
    drop(ctx);

    if let Some(e) = spawn_error {
        // Threads already started see the flag within one poll interval and exit on their own.
        state.cancel();
        drop(worker_handles);
        drop(producer_handle);
        return Err(CrackError::Runtime(format!("spawn worker thread: {e}")));
    }

    Ok(PipelineHandles {
        event_rx,
        producer_handle,
        worker_handles,
        state,
    })
}
