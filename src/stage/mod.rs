//! The per-stage worker context and its five-operation Stage Interface.

mod runtime;

pub use runtime::{Downstream, StageRuntime, Transform};
