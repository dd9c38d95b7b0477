// chainflow/src/core/state.rs

//! The shared, per-invocation state behind a chain handle: the tree-shaped
//! step queue, the executor's cursor, and the single-settlement outcome slot.
//!
//! IMPORTANT: the lock guarding this state is blocking and MUST NOT be held
//! across `.await` suspension points; every method here locks, mutates, and
//! returns.

use crate::core::args::CallArgs;
use crate::core::control::ChainPhase;
use crate::error::ChainError;
use parking_lot::Mutex;

/// Index of the root branch in the arena. Every invocation starts with it.
pub(crate) const ROOT_BRANCH: usize = 0;

/// A step as it sits in the queue: the name it was attached under and the
/// arguments captured at call time. The step function itself is looked up on
/// the descriptor when the executor reaches this record.
pub(crate) struct QueuedStep {
  pub(crate) name: String,
  pub(crate) args: CallArgs,
}

/// One position in a branch. Step slots are emptied when consumed but never
/// removed, so cursor indices stay stable while the tree keeps growing.
pub(crate) enum QueueEntry {
  Step(Option<QueuedStep>),
  Branch(usize),
}

/// What the executor found at a queue position.
pub(crate) enum Fetched {
  Step(QueuedStep),
  Branch(usize),
  /// Slot already consumed; skip the position.
  Consumed,
  /// Past the end of the branch.
  End,
}

struct ExecState<TOut, Err> {
  /// Branch arena; entry 0 is the root sequence, nested branches are
  /// appended as they are opened and referenced by index.
  branches: Vec<Vec<QueueEntry>>,
  /// Branch the executor is currently traversing. Appends land at its tail
  /// unless a branch-open request is pending.
  active: usize,
  /// Position within the active branch.
  cursor: usize,
  /// Pending branch-open request: steps are routed into this branch until
  /// the executor advances past the current position.
  open_branch: Option<usize>,
  /// Set by a premature resolve/reject; stops traversal at every level.
  finalized: bool,
  phase: ChainPhase,
  /// Arguments stored by the function-call surface, forwarded to the entry
  /// hook before init.
  entry_args: Option<CallArgs>,
  /// Settles exactly once; the first settlement wins.
  outcome: Option<Result<TOut, Err>>,
}

/// Shared state of one chain invocation, cloned into the handle, the
/// controls, and every step scope. Never shared across invocations.
pub(crate) struct ChainShared<TOut, Err> {
  state: Mutex<ExecState<TOut, Err>>,
}

impl<TOut, Err> ChainShared<TOut, Err>
where
  TOut: Send + 'static,
  Err: Send + 'static,
{
  pub(crate) fn new() -> Self {
    Self {
      state: Mutex::new(ExecState {
        branches: vec![Vec::new()],
        active: ROOT_BRANCH,
        cursor: 0,
        open_branch: None,
        finalized: false,
        phase: ChainPhase::Pending,
        entry_args: None,
        outcome: None,
      }),
    }
  }

  // --- Queue growth (called from the handle and step scopes) ---

  /// Appends a step at the tail of the branch the executor is positioned in,
  /// or into the open nested branch while a branch-open request is pending.
  pub(crate) fn append_step(&self, name: String, args: CallArgs) {
    let mut st = self.state.lock();
    let entry = QueueEntry::Step(Some(QueuedStep { name, args }));
    let target = st.open_branch.unwrap_or(st.active);
    st.branches[target].push(entry);
  }

  /// Opens a nested branch immediately after the executor's current cursor
  /// position and routes subsequent appends into it. If a branch entry
  /// already occupies that slot it is reused; repeated opens within one
  /// position keep the same target.
  pub(crate) fn open_branch(&self) {
    let mut st = self.state.lock();
    if st.open_branch.is_some() {
      return;
    }
    let active = st.active;
    let slot = (st.cursor + 1).min(st.branches[active].len());
    let existing = match st.branches[active].get(slot) {
      Some(QueueEntry::Branch(branch)) => Some(*branch),
      _ => None,
    };
    let target = existing.unwrap_or_else(|| {
      let id = st.branches.len();
      st.branches.push(Vec::new());
      st.branches[active].insert(slot, QueueEntry::Branch(id));
      id
    });
    st.open_branch = Some(target);
  }

  /// Consumes the pending branch-open request when the executor advances
  /// past the position that issued it.
  pub(crate) fn clear_open_branch(&self) {
    self.state.lock().open_branch = None;
  }

  // --- Traversal (called from the executor only) ---

  /// Positions the cursor at `(branch, index)` and takes whatever sits
  /// there. Step slots are consumed exactly once.
  pub(crate) fn fetch(&self, branch: usize, index: usize) -> Fetched {
    let mut st = self.state.lock();
    st.active = branch;
    st.cursor = index;
    match st.branches[branch].get_mut(index) {
      None => Fetched::End,
      Some(QueueEntry::Branch(sub)) => Fetched::Branch(*sub),
      Some(QueueEntry::Step(slot)) => match slot.take() {
        Some(step) => Fetched::Step(step),
        None => Fetched::Consumed,
      },
    }
  }

  /// Restores the cursor after a nested branch has been fully traversed, so
  /// asynchronous appends land in the parent again.
  pub(crate) fn reposition(&self, branch: usize, index: usize) {
    let mut st = self.state.lock();
    st.active = branch;
    st.cursor = index;
  }

  // --- Phase & finalization ---

  pub(crate) fn phase(&self) -> ChainPhase {
    self.state.lock().phase
  }

  /// Transitions `Pending -> Running`; a second drive of the same
  /// invocation is refused.
  pub(crate) fn begin_run(&self) -> Result<(), ChainError> {
    let mut st = self.state.lock();
    if st.phase != ChainPhase::Pending {
      return Err(ChainError::AlreadyExecuted);
    }
    st.phase = ChainPhase::Running;
    Ok(())
  }

  pub(crate) fn mark_finalized(&self) {
    self.state.lock().phase = ChainPhase::Finalized;
  }

  pub(crate) fn is_finalized(&self) -> bool {
    self.state.lock().finalized
  }

  // --- Entry args (function-call surface) ---

  pub(crate) fn set_entry_args(&self, args: CallArgs) {
    self.state.lock().entry_args = Some(args);
  }

  pub(crate) fn take_entry_args(&self) -> Option<CallArgs> {
    self.state.lock().entry_args.take()
  }

  // --- Settlement ---

  /// Settles the outcome if it is still open. Returns whether this call won;
  /// later attempts are no-ops.
  pub(crate) fn settle(&self, result: Result<TOut, Err>) -> bool {
    let mut st = self.state.lock();
    if st.outcome.is_some() {
      return false;
    }
    st.outcome = Some(result);
    true
  }

  /// Premature settlement from inside a step or hook: settles and raises the
  /// finalized flag so traversal halts at every nesting level.
  pub(crate) fn settle_and_finalize(&self, result: Result<TOut, Err>) -> bool {
    let mut st = self.state.lock();
    st.finalized = true;
    if st.outcome.is_some() {
      return false;
    }
    st.outcome = Some(result);
    true
  }

  pub(crate) fn take_outcome(&self) -> Option<Result<TOut, Err>> {
    self.state.lock().outcome.take()
  }
}
