// chainflow/examples/basic_chain.rs

use chainflow::{async_builder, CallArgs, ChainDescriptor, ChainError, StepControl};
use std::sync::{Arc, Mutex};
use tracing::info;

// A pizza order assembled fluently: every `topping` call queues a step, and
// awaiting the handle bakes the result.
#[tokio::main]
async fn main() -> Result<(), ChainError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Chain Example ---");

  let pizza = async_builder(|_controls, (): ()| {
    let toppings: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let baked = toppings.clone();
    ChainDescriptor::<String, ChainError>::new(move || {
      let toppings = baked.clone();
      async move { Ok::<_, ChainError>(format!("pizza with {}", toppings.lock().unwrap().join(", "))) }
    })
    .step("topping", move |_scope, args: CallArgs| {
      let toppings = toppings.clone();
      async move {
        if let Some(name) = args.get::<&str>(0) {
          info!("adding topping: {name}");
          toppings.lock().unwrap().push((*name).to_string());
        }
        Ok::<_, ChainError>(StepControl::Continue)
      }
    })
  });

  let result = pizza(())
    .step("topping", CallArgs::new().with("cheese"))
    .step("topping", CallArgs::new().with("pepperoni"))
    .step("topping", CallArgs::new().with("basil"))
    .await?;

  info!("baked: {result}");
  Ok(())
}
