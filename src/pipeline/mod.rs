//! Pipeline components: candidate sources, producer, trial workers, coordinator.

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod producer;
pub mod source;
pub mod worker;

pub use context::{
    Extraction, FoundPassword, PipelineChannels, PipelineHandles, PipelineTuning, RunState,
    WorkerContext, WorkerEvent, create_pipeline_channels,
};
pub use error_handler::{JoinReport, join_with_grace, resolve_terminal};
pub use orchestrator::{
    Cracker, ProgressObserver, StopHandle, launch_pipeline, open_handles,
};
pub use producer::{run_producer_loop, spawn_producer_thread};
pub use source::{BruteforceGenerator, CandidateSource, WordlistReader, decode_line};
pub use worker::{classify, spawn_trial_workers};
