// chainflow/src/core/scope.rs

//! Branch control handed to each step's body.

use crate::chain::handle::ChainHandle;
use crate::error::ChainError;
use tracing::{event, Level};

/// Scoped capability a step receives when the executor invokes it.
///
/// A fresh scope is created per step invocation. Its only power is
/// [`branch`]: opening a nested sub-sequence right after the executor's
/// current position and handing back the chain handle so the step body — or
/// an asynchronous task it moves the handle into — can keep chaining into
/// that branch. The branch is traversed to completion before the parent
/// sequence resumes.
///
/// A step that hands the returned handle to another task should return
/// [`StepControl::HoldOpen`] so the executor grants that task one scheduling
/// turn to attach.
///
/// [`branch`]: StepScope::branch
/// [`StepControl::HoldOpen`]: crate::StepControl::HoldOpen
pub struct StepScope<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  handle: ChainHandle<TOut, Err>,
}

impl<TOut, Err> StepScope<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  pub(crate) fn new(handle: ChainHandle<TOut, Err>) -> Self {
    Self { handle }
  }

  /// Opens a nested branch after the current queue position and returns the
  /// handle for chaining into it.
  pub fn branch(&self) -> ChainHandle<TOut, Err> {
    event!(Level::TRACE, "branch opened by step scope");
    self.handle.shared().open_branch();
    self.handle.clone()
  }
}
