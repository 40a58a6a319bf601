use std::sync::Arc;
use std::time::{Duration, Instant};

use driver_adapter::PageDriver;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};
use vantage_core_types::{ElementHandle, Locator};

use crate::condition::{probe, ReadyCondition, Verdict};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Wait tuning supplied by the external config loader.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Deadline used when the caller does not pass one explicitly.
    pub default_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Terminal result of one bounded wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition held. Carries the matched handle, except for
    /// [`ReadyCondition::Absent`] where there is nothing to hand back.
    Satisfied(Option<ElementHandle>),
    /// The deadline passed with the condition never holding. `elapsed` is
    /// the wall time actually spent, at least the requested timeout.
    TimedOut { elapsed: Duration },
    /// The session died mid-wait; retrying against it is pointless.
    SessionGone,
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied(_))
    }
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timed out after {elapsed:?} waiting for {locator} to be {condition}")]
    Timeout {
        locator: Locator,
        condition: ReadyCondition,
        elapsed: Duration,
    },
    #[error("session went away while waiting for {locator}")]
    SessionGone { locator: Locator },
    /// `require` was asked for a handle from a condition that has none.
    #[error("condition {0} does not yield an element handle")]
    HandleUnavailable(ReadyCondition),
}

/// Polls a readiness condition until it holds or a deadline passes.
///
/// Stateless apart from its tuning; cheap to clone and share.
#[derive(Clone, Debug)]
pub struct Waiter {
    config: WaitConfig,
}

impl Waiter {
    pub fn new(config: WaitConfig) -> Self {
        Self { config }
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.config.default_timeout_ms)
    }

    /// Poll `condition` against `locator` until it holds or `timeout` passes.
    ///
    /// The condition is checked immediately, then once per poll interval;
    /// an already-ready page never pays a full interval. Transient driver
    /// errors (a node replaced mid-probe, a script hiccup) count as
    /// "not yet" and the next poll re-resolves from scratch. Only a dead
    /// session ends the wait early.
    pub async fn wait_until(
        &self,
        driver: &Arc<dyn PageDriver>,
        locator: &Locator,
        condition: ReadyCondition,
        timeout: Duration,
    ) -> WaitOutcome {
        let started = Instant::now();
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            match probe(driver.as_ref(), locator, condition).await {
                Ok(Verdict::Holds(handle)) => {
                    trace!(%locator, %condition, elapsed = ?started.elapsed(), "condition held");
                    return WaitOutcome::Satisfied(handle);
                }
                Ok(Verdict::NotYet) => {}
                Err(err) if err.is_session_gone() => {
                    debug!(%locator, %condition, "session gone mid-wait");
                    return WaitOutcome::SessionGone;
                }
                Err(err) => {
                    debug!(%locator, %condition, error = %err, "probe failed; will re-resolve");
                }
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                debug!(%locator, %condition, ?elapsed, "wait deadline passed");
                return WaitOutcome::TimedOut { elapsed };
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Like [`wait_until`](Self::wait_until) but insists on a handle,
    /// turning the non-satisfied outcomes into errors the caller can
    /// propagate with `?`.
    pub async fn require(
        &self,
        driver: &Arc<dyn PageDriver>,
        locator: &Locator,
        condition: ReadyCondition,
        timeout: Duration,
    ) -> Result<ElementHandle, WaitError> {
        if !condition.yields_handle() {
            return Err(WaitError::HandleUnavailable(condition));
        }
        match self.wait_until(driver, locator, condition, timeout).await {
            WaitOutcome::Satisfied(Some(handle)) => Ok(handle),
            // Unreachable for handle-yielding conditions; keep the error
            // honest rather than panicking.
            WaitOutcome::Satisfied(None) => Err(WaitError::HandleUnavailable(condition)),
            WaitOutcome::TimedOut { elapsed } => Err(WaitError::Timeout {
                locator: locator.clone(),
                condition,
                elapsed,
            }),
            WaitOutcome::SessionGone => Err(WaitError::SessionGone {
                locator: locator.clone(),
            }),
        }
    }
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(WaitConfig::default())
    }
}
