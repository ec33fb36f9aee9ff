//! Coordination primitives shared by startup, auth, and persistence code.
//!
//! These are the only pieces of the application with real invariants:
//! a deferred promise whose source arrives after its consumers, a
//! countdown latch for independent startup tasks, and a coalescing
//! writer that serializes writes of one document to the remote store.

mod debounced_writer;
mod settable_promise;
mod task_accumulator;

pub use debounced_writer::{DebouncedWriter, WriteHandle, WriteSink, WriteState};
pub use settable_promise::{SettablePromise, SharedResult};
pub use task_accumulator::TaskAccumulator;
