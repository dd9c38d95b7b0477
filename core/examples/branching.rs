// chainflow/examples/branching.rs

use chainflow::{async_builder, CallArgs, ChainDescriptor, ChainError, ChainHandle, StepControl};
use tracing::info;

type Handle = ChainHandle<&'static str, ChainError>;
type Callback = Box<dyn FnOnce(Handle) + Send>;

// A step can open a nested branch and hand the chain handle to a callback;
// everything attached there runs before the parent sequence resumes.
#[tokio::main]
async fn main() -> Result<(), ChainError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Branching Example ---");

  let flow = async_builder(|_controls, (): ()| {
    ChainDescriptor::<&'static str, ChainError>::new(|| async { Ok::<_, ChainError>("done") })
      .step("say", |_scope, args: CallArgs| async move {
        info!("say: {}", args.get::<&str>(0).copied().unwrap_or("?"));
        Ok::<_, ChainError>(StepControl::Continue)
      })
      .step("detour", |scope, mut args: CallArgs| {
        if let Some(cb) = args.take::<Callback>(0) {
          cb(scope.branch());
        }
        async move { Ok::<_, ChainError>(StepControl::Continue) }
      })
  });

  let detour: Callback = Box::new(|chain| {
    let _ = chain
      .step("say", CallArgs::new().with("inside the branch"))
      .step("say", CallArgs::new().with("still inside"));
  });
  let result = flow(())
    .step("say", CallArgs::new().with("before the branch"))
    .step("detour", CallArgs::new().with(detour))
    .step("say", CallArgs::new().with("after the branch"))
    .await?;

  info!("chain resolved: {result}");
  Ok(())
}
