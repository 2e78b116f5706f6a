use std::io::BufRead;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::plugins;
use crate::sentinel;
use crate::stage::{Downstream, StageRuntime};

/// Composes `n >= 1` stages into a chain by wiring each stage's downstream
/// hand-off to the next stage's `submit`, feeds external input into the
/// first stage, and joins stages in order on shutdown.
pub struct Pipeline {
    stages: Vec<Arc<StageRuntime>>,
}

impl Pipeline {
    /// Builds and initialises every stage named in `stage_names`, sharing
    /// `capacity` across all of their input queues, and wires
    /// `stages[i].downstream = stages[i+1].submit` for every `i` but the
    /// last (the terminal stage keeps `downstream = None`).
    pub fn build(capacity: usize, stage_names: &[String]) -> Result<Self, PipelineError> {
        if stage_names.is_empty() {
            return Err(PipelineError::EmptyChain);
        }

        let mut stages = Vec::with_capacity(stage_names.len());
        for name in stage_names {
            let transform = plugins::resolve(name)
                .ok_or_else(|| PipelineError::UnknownStage(name.clone()))?;
            let stage = Arc::new(StageRuntime::new(name.clone()));
            stage.init(capacity, transform)?;
            stages.push(stage);
        }

        for i in 0..stages.len().saturating_sub(1) {
            let next = stages[i + 1].clone();
            let downstream: Downstream = Arc::new(move |item: &str| next.submit(item.to_string()));
            stages[i].attach_next(Some(downstream))?;
        }

        Ok(Self { stages })
    }

    /// Feeds lines read from `input` into the first stage until the literal
    /// line `<END>` or end-of-input, then joins every stage in chain order:
    /// an earlier stage must finish draining before a later stage can see
    /// its own sentinel.
    pub fn run(self, mut input: impl BufRead) -> Result<(), PipelineError> {
        let first = &self.stages[0];
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = input.read_line(&mut line)?;
            if bytes_read == 0 {
                // End of input without an explicit sentinel: still shut
                // down gracefully.
                first.submit(sentinel::END.to_string())?;
                break;
            }

            let trimmed = line.trim_end_matches(['\n', '\r']);
            if sentinel::is_sentinel(trimmed) {
                first.submit(sentinel::END.to_string())?;
                break;
            }

            first.submit(trimmed.to_string())?;
        }

        for stage in &self.stages {
            stage.wait_finished()?;
            stage.finalize()?;
        }

        Ok(())
    }

    /// Stage names in chain order, for diagnostics.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}
