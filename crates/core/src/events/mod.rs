//! Write lifecycle events and observer sinks.

mod sink;

pub use sink::{MockWriteObserver, NoOpWriteObserver, WriteEvent, WriteObserver, WriteOutcome};
