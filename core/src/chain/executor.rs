// chainflow/src/chain/executor.rs

//! The scheduler: a depth-first, left-to-right traversal of the step-queue
//! tree, with lifecycle hooks at fixed points and immediate halt on
//! premature settlement.

use crate::chain::descriptor::ChainDescriptor;
use crate::chain::handle::ChainHandle;
use crate::core::control::StepControl;
use crate::core::scope::StepScope;
use crate::core::state::{ChainShared, Fetched, ROOT_BRANCH};
use crate::error::ChainError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};

/// Drives one chain invocation to its completion outcome.
///
/// Exit paths all converge here: normal completion (build result), premature
/// settlement, and errors (routed to `catch` when declared, otherwise
/// rejecting the outcome). The `finally` hook runs exactly once, last, on
/// every path.
#[instrument(
    name = "ChainHandle::run",
    skip_all,
    fields(
        chain_output_type = %std::any::type_name::<TOut>(),
        chain_error_type = %std::any::type_name::<Err>(),
    ),
    err(Display)
)]
pub(crate) async fn execute<TOut, Err>(handle: ChainHandle<TOut, Err>) -> Result<TOut, Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  let shared = Arc::clone(&handle.shared);
  let descriptor = Arc::clone(&handle.descriptor);

  if let Err(refused) = shared.begin_run() {
    event!(Level::ERROR, "chain handle driven twice");
    return Err(Err::from(refused));
  }
  event!(Level::DEBUG, "chain execution starting");

  match drive(&shared, &descriptor, &handle).await {
    Ok(()) => {}
    Err(error) => {
      if let Some(catch_fn) = &descriptor.catch {
        event!(Level::DEBUG, error = %error, "error delivered to catch hook");
        catch_fn(error).await;
      } else {
        event!(Level::ERROR, error = %error, "uncaught error rejects the chain");
        shared.settle(Err(error));
      }
    }
  }

  if let Some(finally_fn) = &descriptor.finally {
    event!(Level::TRACE, "running finally hook");
    finally_fn().await;
  }
  shared.mark_finalized();

  match shared.take_outcome() {
    Some(outcome) => outcome,
    None => Err(Err::from(ChainError::SettlementMissing)),
  }
}

/// The fallible run body: entry and init hooks, the root drain, and the
/// build hook. Any error aborts traversal and is routed by `execute`.
async fn drive<TOut, Err>(
  shared: &Arc<ChainShared<TOut, Err>>,
  descriptor: &Arc<ChainDescriptor<TOut, Err>>,
  handle: &ChainHandle<TOut, Err>,
) -> Result<(), Err>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  // Settled during the attachment phase: nothing at any level may run.
  if shared.is_finalized() {
    event!(Level::INFO, "chain finalized before traversal started");
    return Ok(());
  }

  if let Some(args) = shared.take_entry_args() {
    match &descriptor.entry {
      Some(entry_fn) => {
        event!(Level::DEBUG, num_args = args.len(), "running entry hook");
        entry_fn(args).await?;
      }
      None => return Err(Err::from(ChainError::EntryNotDeclared)),
    }
    if shared.is_finalized() {
      event!(Level::INFO, "chain finalized by entry hook");
      return Ok(());
    }
  }

  if let Some(init_fn) = &descriptor.init {
    event!(Level::DEBUG, "running init hook");
    init_fn().await?;
    if shared.is_finalized() {
      event!(Level::INFO, "chain finalized by init hook");
      return Ok(());
    }
  }

  drain(shared, descriptor, handle, ROOT_BRANCH).await?;
  if shared.is_finalized() {
    return Ok(());
  }

  event!(Level::DEBUG, "root sequence exhausted; running build hook");
  let value = (descriptor.build)().await?;
  if !shared.settle(Ok(value)) {
    event!(Level::DEBUG, "build result ignored; outcome already settled");
  }
  Ok(())
}

/// Traverses one branch of the queue to completion.
///
/// Boxed for recursion: entering a nested branch suspends this cursor until
/// the branch is exhausted or the chain finalizes. The validator hook fires
/// only at the root level, after each fully finished position.
fn drain<'a, TOut, Err>(
  shared: &'a Arc<ChainShared<TOut, Err>>,
  descriptor: &'a Arc<ChainDescriptor<TOut, Err>>,
  handle: &'a ChainHandle<TOut, Err>,
  branch_id: usize,
) -> Pin<Box<dyn Future<Output = Result<(), Err>> + Send + 'a>>
where
  TOut: Send + 'static,
  Err: std::error::Error + From<ChainError> + Send + Sync + 'static,
{
  Box::pin(async move {
    let is_root = branch_id == ROOT_BRANCH;
    let mut index = 0;
    loop {
      match shared.fetch(branch_id, index) {
        Fetched::End => break,
        Fetched::Consumed => {
          index += 1;
          continue;
        }
        Fetched::Step(step) => {
          // The span is attached to the step future rather than entered
          // here: an entered guard must not live across an await point.
          let step_span = span!(
            Level::INFO,
            "chain_step",
            step_name = %step.name,
            branch = branch_id,
            position = index,
          );

          let step_fn = match descriptor.steps.get(&step.name) {
            Some(step_fn) => step_fn,
            None => {
              event!(Level::ERROR, step_name = %step.name, "no step function registered under this name");
              return Err(Err::from(ChainError::StepNotFound { step_name: step.name }));
            }
          };

          let scope = StepScope::new(handle.clone());
          let control = step_fn(scope, step.args).instrument(step_span).await?;

          if shared.is_finalized() {
            event!(Level::INFO, "chain finalized by step; halting traversal at every level");
            return Ok(());
          }
          if control == StepControl::HoldOpen {
            // One scheduling turn for tasks still attaching into the
            // branch this step opened.
            event!(Level::DEBUG, "step requested an attachment turn");
            tokio::task::yield_now().await;
          }
          shared.clear_open_branch();
        }
        Fetched::Branch(sub_branch) => {
          event!(Level::DEBUG, branch = branch_id, sub_branch, position = index, "entering nested branch");
          drain(shared, descriptor, handle, sub_branch).await?;
          if shared.is_finalized() {
            return Ok(());
          }
          shared.reposition(branch_id, index);
        }
      }

      if is_root {
        if let Some(validator_fn) = &descriptor.validator {
          event!(Level::TRACE, position = index, "running validator hook");
          validator_fn().await?;
          if shared.is_finalized() {
            event!(Level::INFO, "chain finalized by validator hook");
            return Ok(());
          }
        }
      }
      index += 1;
    }
    Ok(())
  })
}
