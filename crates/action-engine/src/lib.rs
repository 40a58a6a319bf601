//! Interaction Engine: readiness-gated element actions with fallbacks.
//!
//! Every action follows the same shape: wait for the element to be ready,
//! run the primary strategy, fall back where a fallback exists, and on
//! total failure capture evidence before surfacing the error.

pub mod error;
pub mod interact;

pub use error::{ActionError, ActionKind};
pub use interact::{ClickStrategy, Interactor, CLICK_STRATEGIES};
