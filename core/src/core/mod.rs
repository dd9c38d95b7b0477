// chainflow/src/core/mod.rs

//! Building blocks shared across the crate: call arguments, control signals,
//! the step scope, and the internal execution state.

pub mod args;
pub mod control;
pub mod scope;
pub(crate) mod state;

// Re-export key types for easier access from other chainflow modules.
pub use args::CallArgs;
pub use control::{ChainPhase, StepControl};
pub use scope::StepScope;
