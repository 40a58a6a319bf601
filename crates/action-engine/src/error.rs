use std::fmt;

use driver_adapter::DriverError;
use thiserror::Error;
use vantage_core_types::Locator;
use wait_engine::WaitError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    TypeText,
    ReadText,
    ReadSelected,
    Scroll,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::TypeText => "type",
            ActionKind::ReadText => "read-text",
            ActionKind::ReadSelected => "read-selected",
            ActionKind::Scroll => "scroll",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    /// The element never reached the readiness gate; nothing was attempted.
    #[error("{action} on {locator} never became ready: {source}")]
    NotReady {
        action: ActionKind,
        locator: Locator,
        #[source]
        source: WaitError,
    },
    /// The element was ready but every strategy raised; `cause` is the
    /// last driver error seen. Evidence was already captured by the time
    /// this surfaces.
    #[error("{action} on {locator} failed: {cause}")]
    Failed {
        action: ActionKind,
        locator: Locator,
        #[source]
        cause: DriverError,
    },
}

impl ActionError {
    pub fn action(&self) -> ActionKind {
        match self {
            ActionError::NotReady { action, .. } | ActionError::Failed { action, .. } => *action,
        }
    }

    pub fn locator(&self) -> &Locator {
        match self {
            ActionError::NotReady { locator, .. } | ActionError::Failed { locator, .. } => locator,
        }
    }

    /// Label used to tag captured evidence, e.g. `click id:submit`.
    pub fn evidence_label(&self) -> String {
        format!("{} {}", self.action(), self.locator())
    }
}
