//! Pipeline components: cancellation, context, walk, worker pool, persister, orchestration.

pub mod cancel;
pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod persist;
pub mod walk;
pub mod workers;

pub use cancel::CancelToken;
pub use context::{
    PersistContext, PipelineChannels, PipelineHandles, WalkContext, WorkerContext,
    create_pipeline_channels,
};
pub use error_handler::{ErrorSlot, check_for_pipeline_error, fail_pipeline};
pub use orchestrator::{run_pipeline, shutdown_pipeline_handles, spawn_pipeline};
pub use persist::{persist_all, persist_one};
pub use walk::{
    WalkOutcome, check_source, run_walk_loop, send_path, spawn_walk_thread, to_outcome_walkdir,
};
pub use workers::{make_thumbnail, spawn_thumbnail_workers};
