// chainflow/src/core/control.rs

//! Defines the signal a step returns to the executor and the phases of a
//! chain invocation.

/// Signal from a step's body telling the executor how to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Advance to the next queue position immediately.
  Continue,
  /// The step handed branch control to an asynchronous task; the executor
  /// yields exactly one scheduling turn before advancing, so that task can
  /// still attach into the opened branch.
  ///
  /// This is an explicit request, not a timing heuristic: a step that opens
  /// a branch and attaches into it synchronously should return [`Continue`].
  ///
  /// [`Continue`]: StepControl::Continue
  HoldOpen,
}

/// Phase of a single chain invocation.
///
/// A handle starts `Pending`, enters `Running` when it is awaited (never
/// synchronously with chain attachment), and ends `Finalized` once the
/// outcome is produced and the finally hook has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
  Pending,
  Running,
  Finalized,
}
