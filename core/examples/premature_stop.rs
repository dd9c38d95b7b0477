// chainflow/examples/premature_stop.rs

use chainflow::{async_builder, CallArgs, ChainDescriptor, ChainError, StepControl};
use tracing::{info, warn};

// The controls captured from the handler settle the chain early; remaining
// steps and the build hook are skipped, the finally hook still runs.
#[tokio::main]
async fn main() -> Result<(), ChainError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Premature Stop Example ---");

  let guarded = async_builder(|controls, limit: u32| {
    ChainDescriptor::<&'static str, ChainError>::new(|| async { Ok::<_, ChainError>("all steps ran") })
      .step("charge", move |_scope, args: CallArgs| {
        let controls = controls.clone();
        async move {
          let amount = args.get::<u32>(0).copied().unwrap_or(0);
          if amount > limit {
            warn!("charge of {amount} exceeds limit {limit}; stopping early");
            controls.resolve("stopped at the limit");
          } else {
            info!("charged {amount}");
          }
          Ok::<_, ChainError>(StepControl::Continue)
        }
      })
      .finally(|| async { info!("ledger closed") })
  });

  let result = guarded(100)
    .step("charge", CallArgs::new().with(30_u32))
    .step("charge", CallArgs::new().with(250_u32))
    .step("charge", CallArgs::new().with(10_u32))
    .await?;

  info!("outcome: {result}");
  Ok(())
}
