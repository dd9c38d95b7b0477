// chainflow/src/chain/mod.rs

//! The chain descriptor, the fluent handle, and the executor that drains the
//! step queue.

pub mod descriptor;
pub(crate) mod executor;
pub mod handle;

pub use descriptor::ChainDescriptor;
pub use handle::ChainHandle;
