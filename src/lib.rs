//! A multi-stage, in-process string transformation pipeline.
//!
//! Each stage is an independent worker that pulls strings from a bounded
//! input buffer, applies a transformation, and hands the result to the
//! next stage's input buffer. The pipeline shuts down cleanly once the
//! `<END>` sentinel has propagated through every stage.
//!
//! The core of this crate is the concurrent pipeline engine: [`sync`]
//! (the Monitor primitive and the bounded queue built from it), [`stage`]
//! (the per-stage worker lifecycle), [`pipeline`] (the driver that wires
//! stages into a chain), and [`sentinel`] (the end-of-stream contract).
//! [`plugins`] and [`cli`] are the host-side collaborators around that
//! core.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod plugins;
pub mod sentinel;
pub mod stage;
pub mod sync;
