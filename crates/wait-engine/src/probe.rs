use std::sync::Arc;
use std::time::Duration;

use driver_adapter::PageDriver;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vantage_core_types::Locator;

use crate::condition::ReadyCondition;
use crate::waiter::Waiter;

/// One page-outcome probe: a marker to wait for, or a URL shape to match.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeStep {
    /// Wait (bounded) for a marker element to meet a condition.
    Marker {
        label: String,
        locator: Locator,
        condition: ReadyCondition,
        timeout_ms: u64,
    },
    /// Satisfied when the current URL contains any of the substrings,
    /// case-insensitively. Cheap; useful as a last-resort fallback when a
    /// page carries no stable marker.
    UrlMatch { label: String, substrings: Vec<String> },
}

impl ProbeStep {
    pub fn label(&self) -> &str {
        match self {
            ProbeStep::Marker { label, .. } | ProbeStep::UrlMatch { label, .. } => label,
        }
    }
}

/// An ordered list of outcome probes, evaluated strictly in order with
/// first-satisfied-wins. Chains are plain data: they can be built in code,
/// loaded from config, or serialized into evidence.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProbeChain {
    steps: Vec<ProbeStep>,
}

impl ProbeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(
        mut self,
        label: impl Into<String>,
        locator: Locator,
        condition: ReadyCondition,
        timeout: Duration,
    ) -> Self {
        self.steps.push(ProbeStep::Marker {
            label: label.into(),
            locator,
            condition,
            timeout_ms: timeout.as_millis() as u64,
        });
        self
    }

    pub fn url_match(
        mut self,
        label: impl Into<String>,
        substrings: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.steps.push(ProbeStep::UrlMatch {
            label: label.into(),
            substrings: substrings.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn steps(&self) -> &[ProbeStep] {
        &self.steps
    }

    /// Evaluate the chain against the page, returning the label of the
    /// first satisfied step, or `None` when every step fails. Earlier
    /// steps always shadow later ones, even when several would match.
    pub async fn first_satisfied(
        &self,
        waiter: &Waiter,
        driver: &Arc<dyn PageDriver>,
    ) -> Option<String> {
        for step in &self.steps {
            match step {
                ProbeStep::Marker {
                    label,
                    locator,
                    condition,
                    timeout_ms,
                } => {
                    let outcome = waiter
                        .wait_until(driver, locator, *condition, Duration::from_millis(*timeout_ms))
                        .await;
                    if outcome.is_satisfied() {
                        info!(%label, %locator, "probe marker matched");
                        return Some(label.clone());
                    }
                    debug!(%label, %locator, "probe marker did not match");
                }
                ProbeStep::UrlMatch { label, substrings } => {
                    let Ok(url) = driver.current_url().await else {
                        debug!(%label, "url probe failed to read the current url");
                        continue;
                    };
                    let url = url.to_lowercase();
                    if substrings.iter().any(|s| url.contains(&s.to_lowercase())) {
                        info!(%label, %url, "probe url matched");
                        return Some(label.clone());
                    }
                    debug!(%label, %url, "probe url did not match");
                }
            }
        }
        None
    }
}
