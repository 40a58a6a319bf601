//! Wait Engine: bounded, predicate-driven polling over a page driver.
//!
//! All waiting in the harness is explicit. Callers name a locator, a
//! readiness condition and a deadline; the engine polls until the condition
//! holds or the deadline passes. There is no implicit wait anywhere below
//! this layer.

pub mod condition;
pub mod probe;
pub mod waiter;

pub use condition::ReadyCondition;
pub use probe::{ProbeChain, ProbeStep};
pub use waiter::{WaitConfig, WaitError, WaitOutcome, Waiter};
