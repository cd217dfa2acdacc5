//! Core domain models for wikisynth.
//!
//! Messages sent to the model and the per-run context that collects stage
//! results. These are pure data types with no I/O dependencies.

pub mod context;
pub mod message;

pub use context::{PipelineContext, PipelineState, Stage, StageOutput};
pub use message::{Message, Role};
