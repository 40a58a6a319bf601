//! Error surface of the driver boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// High-level error categories surfaced by a driver implementation.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverErrorKind {
    /// The underlying browser session is gone (quit, crashed, disconnected).
    #[error("session closed")]
    SessionClosed,

    /// A previously resolved element handle no longer refers to a live node.
    #[error("stale element")]
    StaleElement,

    /// The element rejected the dispatched input event (obscured, animating,
    /// disabled at dispatch time).
    #[error("element not interactable")]
    NotInteractable,

    /// Script evaluation failed inside the page.
    #[error("script failure")]
    ScriptFailure,

    /// The driver does not support the requested capability
    /// (e.g. console log retrieval on this browser).
    #[error("capability unsupported")]
    Unsupported,

    /// Transport or protocol failure talking to the browser.
    #[error("driver i/o failure")]
    Io,
}

/// Enriched error passed back to higher layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub hint: Option<String>,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// True when the session itself is gone, as opposed to a single
    /// command failing against a live session.
    pub fn is_session_gone(&self) -> bool {
        self.kind == DriverErrorKind::SessionClosed
    }

    pub fn is_unsupported(&self) -> bool {
        self.kind == DriverErrorKind::Unsupported
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for DriverError {}

pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_appends_hint() {
        let err = DriverError::new(DriverErrorKind::NotInteractable)
            .with_hint("button #submit is covered by an overlay");
        assert_eq!(
            err.to_string(),
            "element not interactable: button #submit is covered by an overlay"
        );
    }

    #[test]
    fn session_gone_detection() {
        assert!(DriverError::new(DriverErrorKind::SessionClosed).is_session_gone());
        assert!(!DriverError::new(DriverErrorKind::Io).is_session_gone());
    }
}
