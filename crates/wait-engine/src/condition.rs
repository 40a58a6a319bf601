use std::fmt;

use driver_adapter::{DriverResult, PageDriver};
use serde::{Deserialize, Serialize};
use vantage_core_types::{ElementHandle, Locator};

/// Readiness predicate evaluated against the live page on every poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyCondition {
    /// The element is rendered: displayed with a non-zero box.
    Visible,
    /// Visible and enabled; the gate every interaction runs behind.
    Interactable,
    /// No matching element is rendered. Matching but hidden also counts.
    Absent,
}

impl ReadyCondition {
    pub fn name(&self) -> &'static str {
        match self {
            ReadyCondition::Visible => "visible",
            ReadyCondition::Interactable => "interactable",
            ReadyCondition::Absent => "absent",
        }
    }

    /// Whether a satisfied wait on this condition yields an element handle.
    pub fn yields_handle(&self) -> bool {
        !matches!(self, ReadyCondition::Absent)
    }
}

impl fmt::Display for ReadyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One poll's verdict. `Holds(None)` is only produced by [`ReadyCondition::Absent`].
pub(crate) enum Verdict {
    Holds(Option<ElementHandle>),
    NotYet,
}

/// Resolve the locator fresh and test the condition against what the page
/// shows right now. Handles are never cached across polls, so a node that
/// was replaced since the last poll is simply re-resolved.
pub(crate) async fn probe(
    driver: &dyn PageDriver,
    locator: &Locator,
    condition: ReadyCondition,
) -> DriverResult<Verdict> {
    let handles = driver.find_elements(locator).await?;

    match condition {
        ReadyCondition::Absent => {
            for handle in &handles {
                if driver.is_displayed(handle).await? {
                    return Ok(Verdict::NotYet);
                }
            }
            Ok(Verdict::Holds(None))
        }
        ReadyCondition::Visible | ReadyCondition::Interactable => {
            for handle in handles {
                if !driver.is_displayed(&handle).await? {
                    continue;
                }
                if !driver.rect(&handle).await?.has_size() {
                    continue;
                }
                if condition == ReadyCondition::Interactable && !driver.is_enabled(&handle).await? {
                    continue;
                }
                return Ok(Verdict::Holds(Some(handle)));
            }
            Ok(Verdict::NotYet)
        }
    }
}
