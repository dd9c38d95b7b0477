// chainflow/src/builder.rs

//! The `async_builder` factory and the settlement controls handed to the
//! user handler.

use crate::chain::descriptor::ChainDescriptor;
use crate::chain::handle::ChainHandle;
use crate::core::state::ChainShared;
use crate::error::ChainError;
use std::sync::Arc;
use tracing::{event, Level};

/// Settlement controls for one chain invocation.
///
/// Handed to the user handler before the descriptor is built, so step and
/// hook closures can capture a clone and settle the chain from anywhere
/// inside their own code. Settlement is first-wins: the first of premature
/// resolve, premature reject, build result, or uncaught error settles the
/// outcome; every later attempt is a no-op.
pub struct ChainControls<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  shared: Arc<ChainShared<TOut, Err>>,
}

impl<TOut, Err> ChainControls<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  pub(crate) fn new(shared: Arc<ChainShared<TOut, Err>>) -> Self {
    Self { shared }
  }

  /// Prematurely resolves the chain with `value`.
  ///
  /// No further steps, branches, or the build hook run; the executor
  /// proceeds directly to the finally hook. The intended way to resolve is
  /// returning a value from the build hook — use this with caution.
  pub fn resolve(&self, value: TOut) {
    if !self.shared.settle_and_finalize(Ok(value)) {
      event!(Level::DEBUG, "resolve ignored; outcome already settled");
    }
  }

  /// Prematurely rejects the chain with `error`.
  ///
  /// Short-circuits exactly like [`resolve`], bypassing the catch hook: the
  /// rejection is the chain's settled outcome, not an error to recover from.
  ///
  /// [`resolve`]: ChainControls::resolve
  pub fn reject(&self, error: Err) {
    if !self.shared.settle_and_finalize(Err(error)) {
      event!(Level::DEBUG, "reject ignored; outcome already settled");
    }
  }
}

impl<TOut, Err> Clone for ChainControls<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

/// Builds a reusable chain factory from a descriptor-producing handler.
///
/// The handler receives the invocation's [`ChainControls`] plus the factory
/// call arguments, and returns the [`ChainDescriptor`] — the step-name
/// dispatch table and lifecycle hooks for that invocation. The handler is
/// invoked synchronously, once, each time the factory is called; the
/// returned [`ChainHandle`] immediately accepts fluent step calls, and
/// traversal starts only when the handle is awaited.
///
/// Invocations share nothing: each factory call allocates fresh state.
///
/// ```
/// use chainflow::{async_builder, CallArgs, ChainDescriptor, ChainError, StepControl};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), ChainError> {
/// let pizza = async_builder(|_controls, (): ()| {
///   ChainDescriptor::<String, ChainError>::new(|| async { Ok::<_, ChainError>("baked".to_string()) })
///     .step("topping", |_scope, _args| async { Ok::<_, ChainError>(StepControl::Continue) })
/// });
///
/// let result = pizza(())
///   .step("topping", CallArgs::new().with("cheese"))
///   .step("topping", CallArgs::new().with("basil"))
///   .await?;
/// assert_eq!(result, "baked");
/// # Ok(())
/// # }
/// ```
pub fn async_builder<TOut, Err, Args, H>(handler: H) -> impl Fn(Args) -> ChainHandle<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
  H: Fn(ChainControls<TOut, Err>, Args) -> ChainDescriptor<TOut, Err>,
{
  move |args: Args| {
    let shared = Arc::new(ChainShared::new());
    let controls = ChainControls::new(Arc::clone(&shared));
    let descriptor = Arc::new(handler(controls, args));
    event!(Level::DEBUG, descriptor = ?descriptor, "chain invocation created");
    ChainHandle::new(shared, descriptor)
  }
}
