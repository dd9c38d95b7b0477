// tests/chain_execution_tests.rs
mod common; // Reference the common module

use chainflow::{async_builder, CallArgs, ChainDescriptor, ChainPhase, StepControl};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_steps_run_in_attachment_order_and_build_resolves() {
  setup_tracing();
  let rec = Recorder::new();
  let factory = pizza_factory();

  let result = factory(rec.clone())
    .step("test", CallArgs::new().with(1_i32))
    .step("test", CallArgs::new().with(2_i32))
    .step("test", CallArgs::new().with(3_i32))
    .await;

  assert_eq!(result, Ok("here"));
  assert_eq!(rec.snapshot(), vec!["1", "2", "3", "build"]);
}

#[tokio::test]
#[serial]
async fn test_scenario_branch_chaining_records_in_order() {
  setup_tracing();
  let rec = Recorder::new();
  let factory = pizza_factory();

  // .test(1).logger(a => a.test(2)).test(3) must record [1, 2, 3].
  let cb: ChainCallback = Box::new(|chain: TestHandle| {
    let _ = chain.step("test", CallArgs::new().with(2_i32));
  });
  let result = factory(rec.clone())
    .step("test", CallArgs::new().with(1_i32))
    .step("logger", CallArgs::new().with(cb))
    .step("test", CallArgs::new().with(3_i32))
    .await;

  assert_eq!(result, Ok("here"));
  assert_eq!(rec.snapshot(), vec!["1", "2", "3", "build"]);
}

#[tokio::test]
#[serial]
async fn test_premature_resolve_skips_remaining_steps_and_build() {
  setup_tracing();
  let rec = Recorder::new();
  let factory = async_builder(|controls, rec: Recorder| {
    let build_rec = rec.clone();
    let step_rec = rec.clone();
    let fin_rec = rec.clone();
    ChainDescriptor::<&'static str, TestError>::new(move || {
      let rec = build_rec.clone();
      async move {
        rec.push("build");
        Ok::<_, TestError>("here")
      }
    })
    .step("record", move |_scope, args: CallArgs| {
      let rec = step_rec.clone();
      async move {
        rec.push(arg0_i32(&args).to_string());
        continue_step()
      }
    })
    .step("settle", move |_scope, _args| {
      let controls = controls.clone();
      async move {
        controls.resolve("early");
        continue_step()
      }
    })
    .finally(move || {
      let rec = fin_rec.clone();
      async move { rec.push("finally") }
    })
  });

  let result = factory(rec.clone())
    .step("record", CallArgs::new().with(1_i32))
    .step("settle", CallArgs::new())
    .step("record", CallArgs::new().with(2_i32))
    .await;

  assert_eq!(result, Ok("early"));
  // Step 2 and build never ran; finally still did.
  assert_eq!(rec.snapshot(), vec!["1", "finally"]);
}

#[tokio::test]
#[serial]
async fn test_premature_reject_skips_remaining_steps_and_build() {
  setup_tracing();
  let rec = Recorder::new();
  let factory = async_builder(|controls, rec: Recorder| {
    let build_rec = rec.clone();
    let step_rec = rec.clone();
    let fin_rec = rec.clone();
    ChainDescriptor::<&'static str, TestError>::new(move || {
      let rec = build_rec.clone();
      async move {
        rec.push("build");
        Ok::<_, TestError>("here")
      }
    })
    .step("record", move |_scope, args: CallArgs| {
      let rec = step_rec.clone();
      async move {
        rec.push(arg0_i32(&args).to_string());
        continue_step()
      }
    })
    .step("settle", move |_scope, _args| {
      let controls = controls.clone();
      async move {
        controls.reject(TestError::Step("halted".into()));
        continue_step()
      }
    })
    .finally(move || {
      let rec = fin_rec.clone();
      async move { rec.push("finally") }
    })
  });

  let result = factory(rec.clone())
    .step("record", CallArgs::new().with(1_i32))
    .step("settle", CallArgs::new())
    .step("record", CallArgs::new().with(2_i32))
    .await;

  assert_eq!(result, Err(TestError::Step("halted".into())));
  assert_eq!(rec.snapshot(), vec!["1", "finally"]);
}

#[tokio::test]
#[serial]
async fn test_settlement_during_attachment_phase_skips_everything() {
  setup_tracing();
  let rec = Recorder::new();
  // The handler itself settles before any step can be attached.
  let factory = async_builder(|controls, rec: Recorder| {
    controls.resolve("immediate");
    let init_rec = rec.clone();
    let fin_rec = rec.clone();
    ChainDescriptor::<&'static str, TestError>::new(|| async { Ok::<_, TestError>("here") })
      .init(move || {
        let rec = init_rec.clone();
        async move {
          rec.push("init");
          Ok::<_, TestError>(())
        }
      })
      .step("record", move |_scope, _args| {
        let rec = rec.clone();
        async move {
          rec.push("step");
          continue_step()
        }
      })
      .finally(move || {
        let rec = fin_rec.clone();
        async move { rec.push("finally") }
      })
  });

  let result = factory(rec.clone()).step("record", CallArgs::new()).await;

  assert_eq!(result, Ok("immediate"));
  assert_eq!(rec.snapshot(), vec!["finally"]);
}

#[tokio::test]
#[serial]
async fn test_factory_invocations_share_nothing() {
  setup_tracing();
  let factory = pizza_factory();

  let rec_a = Recorder::new();
  let rec_b = Recorder::new();
  let first = factory(rec_a.clone()).step("test", CallArgs::new().with(1_i32)).await;
  let second = factory(rec_b.clone()).step("test", CallArgs::new().with(9_i32)).await;

  assert_eq!(first, Ok("here"));
  assert_eq!(second, Ok("here"));
  assert_eq!(rec_a.snapshot(), vec!["1", "build"]);
  assert_eq!(rec_b.snapshot(), vec!["9", "build"]);
}

#[tokio::test]
#[serial]
async fn test_phase_transitions_across_a_run() {
  setup_tracing();
  let rec = Recorder::new();
  let factory = pizza_factory();

  let handle = factory(rec).step("test", CallArgs::new().with(1_i32));
  assert_eq!(handle.phase(), ChainPhase::Pending);

  let probe = handle.clone();
  let result = handle.await;
  assert_eq!(result, Ok("here"));
  assert_eq!(probe.phase(), ChainPhase::Finalized);
}

#[tokio::test]
#[serial]
async fn test_steps_may_return_hold_open_without_branching() {
  setup_tracing();
  let rec = Recorder::new();
  let factory = async_builder(|_controls, rec: Recorder| {
    ChainDescriptor::<&'static str, TestError>::new(|| async { Ok::<_, TestError>("here") }).step(
      "pause",
      move |_scope, _args| {
        let rec = rec.clone();
        async move {
          rec.push("pause");
          Ok::<_, TestError>(StepControl::HoldOpen)
        }
      },
    )
  });

  // HoldOpen with nothing attaching is just one extra scheduling turn.
  let result = factory(rec.clone()).step("pause", CallArgs::new()).await;
  assert_eq!(result, Ok("here"));
  assert_eq!(rec.snapshot(), vec!["pause"]);
}
