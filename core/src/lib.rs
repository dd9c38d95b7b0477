// src/lib.rs

//! Chainflow: a runtime primitive for fluent, asynchronous call chains.
//!
//! A caller attaches a sequence of named steps to a handle; awaiting the
//! handle later drains that sequence, with support for:
//!  - Name-keyed step dispatch from a one-shot descriptor.
//!  - A tree-shaped step queue: steps may open nested branches that are
//!    traversed to completion before the parent sequence resumes.
//!  - Premature settlement (`resolve`/`reject`) that short-circuits every
//!    remaining step at every nesting level.
//!  - Lifecycle hooks: `entry`, `init`, `validator`, `catch`, and a
//!    guaranteed-cleanup `finally` that runs exactly once on every exit path.
//!  - An explicit `HoldOpen` signal letting a step grant asynchronous tasks
//!    one scheduling turn to keep attaching into an opened branch.

pub mod builder;
pub mod chain;
pub mod core;
pub mod error;

// --- Re-exports for the Public API ---

pub use crate::builder::{async_builder, ChainControls};
pub use crate::chain::descriptor::{BuildFn, CatchFn, ChainDescriptor, CleanupFn, EntryFn, HookFn, StepFn};
pub use crate::chain::handle::ChainHandle;
pub use crate::core::args::CallArgs;
pub use crate::core::control::{ChainPhase, StepControl};
pub use crate::core::scope::StepScope;
pub use crate::error::{ChainError, ChainResult};

/*
    Core Workflow:
    1. Call `async_builder(handler)` to obtain a reusable factory.
       `handler(controls, args)` runs synchronously per invocation and
       returns a `ChainDescriptor`: the required `build` hook plus named
       `.step(..)` registrations and optional lifecycle hooks.
    2. Call the factory. You get a `ChainHandle` that is immediately
       chainable: `factory(args).step("a", CallArgs::new()).step("b", ..)`.
    3. Inside a step, `scope.branch()` opens a nested branch and returns the
       handle; chain into it synchronously, or move the handle into a task
       and return `StepControl::HoldOpen` to be granted one more turn.
    4. Settle early at any point with `controls.resolve(..)` /
       `controls.reject(..)` captured from the handler.
    5. Await the handle (or call `.run()`): steps run in attachment order,
       depth-first through branches, then `build` produces the outcome.
*/
