// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use chainflow::{CallArgs, ChainError, ChainHandle, StepControl};
use std::sync::{Arc, Mutex};
use tracing::Level;

/// Shared execution log the step closures append to.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, entry: impl Into<String>) {
    self.0.lock().unwrap().push(entry.into());
  }

  pub fn snapshot(&self) -> Vec<String> {
    self.0.lock().unwrap().clone()
  }
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)] // Clone, PartialEq, Eq for assertions
pub enum TestError {
  #[error("Chainflow framework error: {0}")] // Stored as String for Eq comparison
  Chain(String),

  #[error("Test step failed: {0}")]
  Step(String),

  #[error("Test hook failed: {0}")]
  Hook(String),
}

impl From<ChainError> for TestError {
  fn from(ce: ChainError) -> Self {
    // Debug formatting keeps the variant name visible for assertions.
    TestError::Chain(format!("{:?}", ce))
  }
}

/// Handle type most tests use: chains resolving to a static str.
pub type TestHandle = ChainHandle<&'static str, TestError>;

/// A chaining callback carried through `CallArgs` into a `logger`-style step,
/// mirroring fluent sub-chaining from user code.
pub type ChainCallback = Box<dyn FnOnce(TestHandle) + Send>;

/// Reads the i32 argument conventionally carried at position 0.
pub fn arg0_i32(args: &CallArgs) -> i32 {
  args.get::<i32>(0).copied().unwrap_or(i32::MIN)
}

pub fn continue_step() -> Result<StepControl, TestError> {
  Ok(StepControl::Continue)
}

/// The canonical two-step factory most chain tests drive: `test` records its
/// i32 argument, `logger` hands a [`ChainCallback`] the branch-control
/// handle, and `build` records itself and resolves to `"here"`.
pub fn pizza_factory() -> impl Fn(Recorder) -> TestHandle {
  chainflow::async_builder(|_controls, rec: Recorder| {
    let build_rec = rec.clone();
    let test_rec = rec.clone();
    chainflow::ChainDescriptor::<&'static str, TestError>::new(move || {
      let rec = build_rec.clone();
      async move {
        rec.push("build");
        Ok::<_, TestError>("here")
      }
    })
    .step("test", move |_scope, args: CallArgs| {
      let rec = test_rec.clone();
      async move {
        rec.push(arg0_i32(&args).to_string());
        continue_step()
      }
    })
    .step("logger", |scope, mut args: CallArgs| async move {
      if let Some(cb) = args.take::<ChainCallback>(0) {
        cb(scope.branch());
      }
      continue_step()
    })
  })
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
