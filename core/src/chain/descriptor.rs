// chainflow/src/chain/descriptor.rs

//! The `ChainDescriptor<TOut, Err>`: an explicit mapping from step name to
//! step function, plus the lifecycle hooks the executor fires around the
//! queue. Built once per chain invocation by the user handler and immutable
//! afterward.

use crate::core::args::CallArgs;
use crate::core::control::StepControl;
use crate::core::scope::StepScope;
use crate::error::ChainError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{event, Level};

/// Type alias for a registered step function.
///
/// A step receives a fresh [`StepScope`] (its branch control) and the
/// [`CallArgs`] captured when the chain method was called, and resolves to a
/// [`StepControl`] telling the executor how to advance.
pub type StepFn<TOut, Err> = Box<
  dyn Fn(StepScope<TOut, Err>, CallArgs) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// The build hook: produces the chain's final value once the root sequence
/// is exhausted without finalization.
pub type BuildFn<TOut, Err> =
  Box<dyn Fn() -> Pin<Box<dyn Future<Output = Result<TOut, Err>> + Send>> + Send + Sync>;

/// Zero-argument fallible hook (`init`, `validator`).
pub type HookFn<Err> = Box<dyn Fn() -> Pin<Box<dyn Future<Output = Result<(), Err>> + Send>> + Send + Sync>;

/// The catch hook: receives the aborting error. Infallible by signature —
/// recovery is expressed by settling the chain through the captured
/// [`ChainControls`], not by returning another error.
///
/// [`ChainControls`]: crate::ChainControls
pub type CatchFn<Err> = Box<dyn Fn(Err) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The finally hook: guaranteed cleanup, runs exactly once on every exit path.
pub type CleanupFn = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The entry hook backing the optional function-call surface; receives the
/// arguments stored by [`ChainHandle::call`] and runs before `init`.
///
/// [`ChainHandle::call`]: crate::ChainHandle::call
pub type EntryFn<Err> =
  Box<dyn Fn(CallArgs) -> Pin<Box<dyn Future<Output = Result<(), Err>> + Send>> + Send + Sync>;

/// Descriptor of one chain invocation: named step functions plus lifecycle
/// hooks.
///
/// The build hook is required and therefore taken by [`new`]; all other
/// hooks are optional. The step-name dispatch table is fixed once the handle
/// is created — the step *queue* may still grow during execution, the set of
/// step names may not.
///
/// Registration accepts any error type convertible into the chain's `Err`,
/// the same way the rest of the crate maps user errors.
///
/// [`new`]: ChainDescriptor::new
pub struct ChainDescriptor<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  pub(crate) steps: HashMap<String, StepFn<TOut, Err>>,
  pub(crate) build: BuildFn<TOut, Err>,
  pub(crate) init: Option<HookFn<Err>>,
  pub(crate) validator: Option<HookFn<Err>>,
  pub(crate) catch: Option<CatchFn<Err>>,
  pub(crate) finally: Option<CleanupFn>,
  pub(crate) entry: Option<EntryFn<Err>>,
}

impl<TOut, Err> ChainDescriptor<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  /// Creates a descriptor from its one required hook: `build`, invoked as
  /// the final procedure of a chain that was not settled prematurely. Its
  /// value resolves the completion outcome.
  pub fn new<F, Fut, E>(build_fn: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TOut, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    Self {
      steps: HashMap::new(),
      build: Box::new(move || {
        let fut = build_fn();
        Box::pin(async move { fut.await.map_err(Into::into) })
      }),
      init: None,
      validator: None,
      catch: None,
      finally: None,
      entry: None,
    }
  }

  /// Registers a step function under `name`. The chain handle will accept
  /// fluent calls for this name and enqueue them into the step queue.
  ///
  /// Re-registering a name replaces the previous function; the last one
  /// wins, matching plain map insertion.
  pub fn step<F, Fut, E>(mut self, name: impl Into<String>, step_fn: F) -> Self
  where
    F: Fn(StepScope<TOut, Err>, CallArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    let name = name.into();
    let final_step: StepFn<TOut, Err> = Box::new(move |scope, args| {
      let fut = step_fn(scope, args);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    if self.steps.insert(name.clone(), final_step).is_some() {
      event!(Level::WARN, step_name = %name, "step function replaced by re-registration");
    }
    self
  }

  /// Registers the `init` hook, awaited first after entering `Running`
  /// (after the entry hook, if the chain was called as a function). Used to
  /// initialize values that require asynchronous operations.
  pub fn init<F, Fut, E>(mut self, hook_fn: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.init = Some(Box::new(move || {
      let fut = hook_fn();
      Box::pin(async move { fut.await.map_err(Into::into) })
    }));
    self
  }

  /// Registers the `validator` hook, awaited after each root-level queue
  /// position: once after every top-level step and once after every fully
  /// traversed branch, never mid-branch.
  pub fn validator<F, Fut, E>(mut self, hook_fn: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.validator = Some(Box::new(move || {
      let fut = hook_fn();
      Box::pin(async move { fut.await.map_err(Into::into) })
    }));
    self
  }

  /// Registers the `catch` hook. Once declared it fully owns recovery: any
  /// error from `entry`, `init`, a step, `build`, or `validator` is
  /// delivered here instead of rejecting the outcome, and the hook settles
  /// the chain (or deliberately leaves it unsettled) through the controls it
  /// captured. A declared catch hook that never settles makes the run finish
  /// with [`ChainError::SettlementMissing`].
  pub fn catch<F, Fut>(mut self, hook_fn: F) -> Self
  where
    F: Fn(Err) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    self.catch = Some(Box::new(move |error| Box::pin(hook_fn(error))));
    self
  }

  /// Registers the `finally` hook: runs exactly once, unconditionally, as
  /// the very last action on every exit path — normal completion, premature
  /// settlement, or error.
  pub fn finally<F, Fut>(mut self, hook_fn: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    self.finally = Some(Box::new(move || Box::pin(hook_fn())));
    self
  }

  /// Registers the `entry` hook, enabling the function-call surface on the
  /// handle: arguments stored by [`ChainHandle::call`] are forwarded here
  /// before `init` runs.
  ///
  /// [`ChainHandle::call`]: crate::ChainHandle::call
  pub fn entry<F, Fut, E>(mut self, hook_fn: F) -> Self
  where
    F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.entry = Some(Box::new(move |args| {
      let fut = hook_fn(args);
      Box::pin(async move { fut.await.map_err(Into::into) })
    }));
    self
  }

  /// Whether a step function is registered under `name`.
  pub fn has_step(&self, name: &str) -> bool {
    self.steps.contains_key(name)
  }

  /// Names of all registered steps, in no particular order.
  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.keys().map(String::as_str)
  }
}

// StepFn and friends carry no Debug, so only the shape is shown.
impl<TOut, Err> std::fmt::Debug for ChainDescriptor<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ChainDescriptor")
      .field("steps", &self.steps.keys().collect::<Vec<_>>())
      .field("init", &self.init.is_some())
      .field("validator", &self.validator.is_some())
      .field("catch", &self.catch.is_some())
      .field("finally", &self.finally.is_some())
      .field("entry", &self.entry.is_some())
      .finish()
  }
}
