// chainflow/src/error.rs

use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
  #[error("Step not found in descriptor: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Chain was called as a function, but the descriptor declares no entry hook")]
  EntryNotDeclared,

  #[error("Chain invocation was already executed; a handle drives its queue at most once")]
  AlreadyExecuted,

  #[error("Chain finished without a settled outcome; the catch hook owns settlement once declared")]
  SettlementMissing,

  #[error("Error in user-provided step or hook. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal chainflow error: {0}")]
  Internal(String),
}

// The key conversion chainflow provides for external errors: steps and hooks
// written against anyhow can flow into ChainError directly.
impl From<AnyhowError> for ChainError {
  fn from(err: AnyhowError) -> Self {
    ChainError::HandlerError { source: err }
  }
}

pub type ChainResult<T, E = ChainError> = std::result::Result<T, E>;
