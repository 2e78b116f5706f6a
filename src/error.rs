//! Error taxonomy for the pipeline engine.
//!
//! Every fallible operation in this crate returns a `Result<T, E>` whose
//! error carries a human-readable `Display` message, mirroring the
//! nullable-string error convention of the engine this crate reimplements.

use thiserror::Error;

/// Failures internal to the [`Monitor`](crate::sync::Monitor) primitive.
///
/// In practice this is only ever raised when the underlying mutex has been
/// poisoned by a panicking thread while holding the lock.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("monitor primitive failure: {0}")]
    Primitive(String),
}

/// Failures from [`BoundedQueue`](crate::sync::BoundedQueue) operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("invalid queue capacity: must be positive")]
    InvalidCapacity,
    #[error("queue has been marked finished; put rejected")]
    Finished,
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Failures from the [`StageRuntime`](crate::stage::StageRuntime) interface.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage already initialized")]
    AlreadyInitialized,
    #[error("stage not initialized")]
    NotInitialized,
    #[error("stage already finalized")]
    AlreadyFinalized,
    #[error("invalid stage configuration: {0}")]
    InvalidArgument(String),
    #[error("thread spawn failed: {0}")]
    ThreadSpawn(String),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Failures from [`Pipeline`](crate::pipeline::Pipeline) construction and execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown stage name: {0}")]
    UnknownStage(String),
    #[error("no stages configured")]
    EmptyChain,
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
