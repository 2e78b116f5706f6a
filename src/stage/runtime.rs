use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::StageError;
use crate::sentinel;
use crate::sync::BoundedQueue;

/// A stage's transformation capability: a pure-ish `string -> string` map
/// that signals failure with `None`. Shared across the worker thread via
/// `Arc`, since ordinary closures aren't `Clone`.
pub type Transform = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// The downstream hand-off a stage calls to submit its output to the next
/// stage. Returns an error if the next stage rejects the item (e.g. it has
/// already finalized).
pub type Downstream = Arc<dyn Fn(&str) -> Result<(), StageError> + Send + Sync>;

struct Running {
    queue: Arc<BoundedQueue<String>>,
    downstream: Arc<Mutex<Option<Downstream>>>,
    worker: JoinHandle<()>,
}

enum State {
    Uninitialized,
    Running(Running),
    Finalized,
}

/// The per-stage worker context: input queue, transform, downstream
/// hand-off, worker thread, and lifecycle flags — the five-operation Stage
/// Interface of the engine this crate reimplements.
///
/// Lifecycle: `Uninitialised -> (init) -> Running -> (submit "<END>") ->
/// Draining -> (sentinel forwarded, finished latched) -> Finished ->
/// (finalize) -> Disposed`, with a fresh `init` allowed again after
/// `finalize`.
pub struct StageRuntime {
    name: String,
    state: Mutex<State>,
}

impl StageRuntime {
    /// Allocates an uninitialised stage context under `name`. Call
    /// [`init`](Self::init) before submitting anything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::Uninitialized),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the input queue with `capacity` and spawns the single worker
    /// thread. Fails if already running, or if `capacity` is non-positive.
    pub fn init(&self, capacity: usize, transform: Transform) -> Result<(), StageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StageError::ThreadSpawn("stage state mutex poisoned".into()))?;

        if matches!(*state, State::Running(_)) {
            return Err(StageError::AlreadyInitialized);
        }
        if capacity == 0 {
            return Err(StageError::InvalidArgument(
                "capacity must be positive".into(),
            ));
        }

        let queue = Arc::new(BoundedQueue::new(capacity)?);
        let downstream: Arc<Mutex<Option<Downstream>>> = Arc::new(Mutex::new(None));

        let worker = {
            let queue = queue.clone();
            let downstream = downstream.clone();
            let name = self.name.clone();
            thread::Builder::new()
                .name(format!("stage-{name}"))
                .spawn(move || worker_loop(name, queue, transform, downstream))
                .map_err(|err| StageError::ThreadSpawn(err.to_string()))?
        };

        *state = State::Running(Running {
            queue,
            downstream,
            worker,
        });
        Ok(())
    }

    /// Enqueues `item`. Blocks while the input queue is full.
    pub fn submit(&self, item: String) -> Result<(), StageError> {
        match &*self.lock_state()? {
            State::Running(running) => running.queue.put(item).map_err(Into::into),
            State::Uninitialized => Err(StageError::NotInitialized),
            State::Finalized => Err(StageError::AlreadyFinalized),
        }
    }

    /// Records the downstream hand-off. `None` makes the stage terminal.
    /// May be called multiple times before the first item is submitted; the
    /// last call wins, and the worker observes the latest value on every
    /// loop iteration (so a late call before the first item still applies).
    pub fn attach_next(&self, downstream: Option<Downstream>) -> Result<(), StageError> {
        match &*self.lock_state()? {
            State::Running(running) => {
                let mut slot = running
                    .downstream
                    .lock()
                    .map_err(|_| StageError::ThreadSpawn("downstream mutex poisoned".into()))?;
                *slot = downstream;
                Ok(())
            }
            State::Uninitialized => Err(StageError::NotInitialized),
            State::Finalized => Err(StageError::AlreadyFinalized),
        }
    }

    /// Blocks until the worker has drained its queue through the sentinel.
    /// Idempotent: calling this again after the stage finalized returns
    /// immediately.
    pub fn wait_finished(&self) -> Result<(), StageError> {
        match &*self.lock_state()? {
            State::Running(running) => running.queue.wait_finished().map_err(Into::into),
            State::Uninitialized => Err(StageError::NotInitialized),
            State::Finalized => Ok(()),
        }
    }

    /// Sends the sentinel, waits for the worker to drain, joins it, and
    /// frees the queue and context. After a successful finalize, every
    /// Stage Interface call except a fresh `init` fails.
    pub fn finalize(&self) -> Result<(), StageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StageError::ThreadSpawn("stage state mutex poisoned".into()))?;

        let running = match std::mem::replace(&mut *state, State::Finalized) {
            State::Running(running) => running,
            State::Uninitialized => {
                *state = State::Uninitialized;
                return Err(StageError::NotInitialized);
            }
            State::Finalized => {
                *state = State::Finalized;
                return Err(StageError::AlreadyFinalized);
            }
        };
        drop(state);

        // First sentinel wins: the queue may already be finished if a prior
        // finalize call raced us (or a caller submitted <END> directly) —
        // that is not an error here.
        let _ = running.queue.put(sentinel::END.to_string());
        running.queue.wait_finished()?;
        running
            .worker
            .join()
            .map_err(|_| StageError::ThreadSpawn("worker thread panicked".into()))?;
        Ok(())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, State>, StageError> {
        self.state
            .lock()
            .map_err(|_| StageError::ThreadSpawn("stage state mutex poisoned".into()))
    }
}

/// The worker loop run by each stage's dedicated thread: pull, transform,
/// hand off — one item at a time, strictly in submission order, until the
/// sentinel arrives.
fn worker_loop(
    name: String,
    queue: Arc<BoundedQueue<String>>,
    transform: Transform,
    downstream: Arc<Mutex<Option<Downstream>>>,
) {
    loop {
        let item = match queue.get() {
            Ok(item) => item,
            Err(err) => {
                tracing::error!("[ERROR][{name}] - {err}");
                return;
            }
        };

        if sentinel::is_sentinel(&item) {
            if let Some(next) = current_downstream(&downstream, &name) {
                if let Err(err) = next(sentinel::END) {
                    tracing::error!("[ERROR][{name}] - failed forwarding sentinel: {err}");
                }
            }
            queue.signal_finished();
            tracing::info!("[INFO][{name}] - drained, shutting down");
            return;
        }

        let out = transform(&item);
        let Some(out) = out else {
            tracing::error!("[ERROR][{name}] - transform failed, dropping item");
            continue;
        };

        if let Some(next) = current_downstream(&downstream, &name) {
            if let Err(err) = next(&out) {
                tracing::error!("[ERROR][{name}] - downstream rejected item: {err}");
            }
            // `out` is freed here (end of scope): the downstream's own
            // `submit` copied it into its queue already.
        }
        // If terminal (no downstream), `out` is simply dropped here: the
        // stage owns it and frees it itself.
    }
}

fn current_downstream(downstream: &Mutex<Option<Downstream>>, name: &str) -> Option<Downstream> {
    match downstream.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => {
            tracing::error!("[ERROR][{name}] - downstream mutex poisoned, treating as terminal");
            poisoned.into_inner().clone()
        }
    }
}
