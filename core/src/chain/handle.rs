// chainflow/src/chain/handle.rs

//! The externally visible chain handle: one fluent `step` surface for
//! attaching named steps, an optional function-call surface, and the
//! awaitable completion.

use crate::chain::descriptor::ChainDescriptor;
use crate::chain::executor;
use crate::core::args::CallArgs;
use crate::core::control::ChainPhase;
use crate::core::state::ChainShared;
use crate::error::ChainError;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{event, Level};

/// Handle to one chain invocation.
///
/// Returned synchronously by the factory and immediately chainable: every
/// [`step`] call enqueues a deferred action and returns the handle, so
/// chains can be extended without bound — including from inside step bodies
/// via [`StepScope::branch`]. The handle is also the chain's awaitable
/// identity: awaiting it (or calling [`run`]) drives the executor on a later
/// scheduling turn and yields the completion outcome. Cloning is cheap (two
/// `Arc`s) and every clone refers to the same invocation.
///
/// [`step`]: ChainHandle::step
/// [`run`]: ChainHandle::run
/// [`StepScope::branch`]: crate::StepScope::branch
pub struct ChainHandle<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  pub(crate) shared: Arc<ChainShared<TOut, Err>>,
  pub(crate) descriptor: Arc<ChainDescriptor<TOut, Err>>,
}

impl<TOut, Err> ChainHandle<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  pub(crate) fn new(shared: Arc<ChainShared<TOut, Err>>, descriptor: Arc<ChainDescriptor<TOut, Err>>) -> Self {
    Self { shared, descriptor }
  }

  pub(crate) fn shared(&self) -> &ChainShared<TOut, Err> {
    &self.shared
  }

  /// Attaches the named step with the given arguments and returns the
  /// handle for further chaining.
  ///
  /// The step is appended to the branch the executor is currently
  /// positioned at (the root sequence before the run starts), or into the
  /// open nested branch while a branch-open request is pending. A name the
  /// descriptor does not know is still enqueued and fails deterministically,
  /// in traversal order, with [`ChainError::StepNotFound`].
  pub fn step(self, name: impl Into<String>, args: CallArgs) -> Self {
    let name = name.into();
    event!(Level::TRACE, step_name = %name, num_args = args.len(), "step attached");
    self.shared.append_step(name, args);
    self
  }

  /// The function-call surface: stores arguments for the `entry` hook,
  /// which the executor runs before `init`. Fails at execution time with
  /// [`ChainError::EntryNotDeclared`] if the descriptor declares no entry
  /// hook. A later `call` replaces the arguments of an earlier one.
  pub fn call(self, args: CallArgs) -> Self {
    event!(Level::TRACE, num_args = args.len(), "entry arguments stored");
    self.shared.set_entry_args(args);
    self
  }

  /// Current phase of this invocation.
  pub fn phase(&self) -> ChainPhase {
    self.shared.phase()
  }

  /// Drives the chain to completion: drains the step queue depth-first,
  /// honoring lifecycle hooks and premature settlement, and returns the
  /// completion outcome. Awaiting the handle delegates here.
  pub async fn run(self) -> Result<TOut, Err> {
    executor::execute(self).await
  }
}

impl<TOut, Err> Clone for ChainHandle<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
      descriptor: Arc::clone(&self.descriptor),
    }
  }
}

impl<TOut, Err> IntoFuture for ChainHandle<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  type Output = Result<TOut, Err>;
  type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

  fn into_future(self) -> Self::IntoFuture {
    Box::pin(self.run())
  }
}

impl<TOut, Err> std::fmt::Debug for ChainHandle<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ChainHandle")
      .field("phase", &self.phase())
      .field("descriptor", &self.descriptor)
      .finish()
  }
}
