use std::sync::Arc;
use std::time::Duration;

use driver_adapter::{DriverError, DriverErrorKind, PageDriver};
use evidence_capture::Recorder;
use tracing::{debug, info, warn};
use vantage_core_types::{ElementHandle, Locator};
use wait_engine::{ReadyCondition, Waiter};

use crate::error::{ActionError, ActionKind};

/// How a click is delivered. Strategies are data, tried strictly in the
/// order of [`CLICK_STRATEGIES`], stopping at the first that lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickStrategy {
    /// Real pointer click through the driver.
    Native,
    /// Script-driven click on the same resolved handle; lands on elements
    /// a pointer click bounces off (overlays, mid-animation targets).
    Scripted,
}

impl ClickStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ClickStrategy::Native => "native",
            ClickStrategy::Scripted => "scripted",
        }
    }
}

pub const CLICK_STRATEGIES: &[ClickStrategy] = &[ClickStrategy::Native, ClickStrategy::Scripted];

/// Readiness-gated actions against one session's page.
///
/// Holds the session's driver for its own lifetime; the registry stays the
/// owner. With a recorder attached, failures capture evidence and
/// state-changing actions get best-effort before/after screenshots.
pub struct Interactor {
    driver: Arc<dyn PageDriver>,
    waiter: Waiter,
    timeout: Duration,
    recorder: Option<Recorder>,
}

impl Interactor {
    pub fn new(driver: Arc<dyn PageDriver>, waiter: Waiter) -> Self {
        let timeout = waiter.default_timeout();
        Self {
            driver,
            waiter,
            timeout,
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Override the readiness deadline for every action on this interactor.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Click the first interactable match, falling back across
    /// [`CLICK_STRATEGIES`] until one lands.
    pub async fn click(&self, locator: &Locator) -> Result<(), ActionError> {
        let action = ActionKind::Click;
        let handle = self
            .ready(action, locator, ReadyCondition::Interactable)
            .await?;
        self.snapshot("before", action, locator).await;

        let mut cause: Option<DriverError> = None;
        for strategy in CLICK_STRATEGIES {
            let attempt = match strategy {
                ClickStrategy::Native => self.driver.click(&handle).await,
                ClickStrategy::Scripted => self.driver.click_via_script(&handle).await,
            };
            match attempt {
                Ok(()) => {
                    if cause.is_some() {
                        info!(%locator, strategy = strategy.name(), "click landed via fallback");
                    } else {
                        debug!(%locator, strategy = strategy.name(), "click landed");
                    }
                    self.snapshot("after", action, locator).await;
                    return Ok(());
                }
                Err(err) if err.is_session_gone() => {
                    cause = Some(err);
                    break;
                }
                Err(err) => {
                    warn!(%locator, strategy = strategy.name(), error = %err, "click strategy failed");
                    cause = Some(err);
                }
            }
        }

        let cause = cause.unwrap_or_else(|| {
            DriverError::new(DriverErrorKind::Io).with_hint("no click strategy attempted")
        });
        Err(self.boundary(action, locator, cause).await)
    }

    /// Clear the field and type `text` into it.
    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), ActionError> {
        let action = ActionKind::TypeText;
        let handle = self
            .ready(action, locator, ReadyCondition::Interactable)
            .await?;
        self.snapshot("before", action, locator).await;

        if let Err(cause) = self.driver.clear(&handle).await {
            return Err(self.boundary(action, locator, cause).await);
        }
        if let Err(cause) = self.driver.send_keys(&handle, text).await {
            return Err(self.boundary(action, locator, cause).await);
        }
        self.snapshot("after", action, locator).await;
        Ok(())
    }

    /// Visible text of the element, trimmed. Falls back to the
    /// `innerText` and `value` attributes when the native text is empty;
    /// an element with none of them reads as the empty string.
    pub async fn read_text(&self, locator: &Locator) -> Result<String, ActionError> {
        let action = ActionKind::ReadText;
        let handle = self.ready(action, locator, ReadyCondition::Visible).await?;

        let text = match self.driver.text(&handle).await {
            Ok(text) => text,
            Err(cause) => return Err(self.boundary(action, locator, cause).await),
        };
        if !text.trim().is_empty() {
            return Ok(text.trim().to_string());
        }

        for attr in ["innerText", "value"] {
            match self.driver.attribute(&handle, attr).await {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    return Ok(value.trim().to_string())
                }
                Ok(_) => {}
                Err(cause) => return Err(self.boundary(action, locator, cause).await),
            }
        }
        Ok(String::new())
    }

    /// Selection state of a visible checkbox, radio or option.
    pub async fn is_selected(&self, locator: &Locator) -> Result<bool, ActionError> {
        let action = ActionKind::ReadSelected;
        let handle = self.ready(action, locator, ReadyCondition::Visible).await?;
        match self.driver.is_selected(&handle).await {
            Ok(selected) => Ok(selected),
            Err(cause) => Err(self.boundary(action, locator, cause).await),
        }
    }

    /// Scroll the element into the viewport.
    pub async fn scroll_into_view(&self, locator: &Locator) -> Result<(), ActionError> {
        let action = ActionKind::Scroll;
        let handle = self.ready(action, locator, ReadyCondition::Visible).await?;
        match self.driver.scroll_into_view(&handle).await {
            Ok(()) => Ok(()),
            Err(cause) => Err(self.boundary(action, locator, cause).await),
        }
    }

    async fn ready(
        &self,
        action: ActionKind,
        locator: &Locator,
        condition: ReadyCondition,
    ) -> Result<ElementHandle, ActionError> {
        match self
            .waiter
            .require(&self.driver, locator, condition, self.timeout)
            .await
        {
            Ok(handle) => Ok(handle),
            Err(source) => {
                let err = ActionError::NotReady {
                    action,
                    locator: locator.clone(),
                    source,
                };
                warn!(%locator, %action, error = %err, "action aborted before execution");
                self.capture(&err).await;
                Err(err)
            }
        }
    }

    /// Terminal failure of an attempted action: capture evidence, then
    /// hand the error back for propagation.
    async fn boundary(
        &self,
        action: ActionKind,
        locator: &Locator,
        cause: DriverError,
    ) -> ActionError {
        let err = ActionError::Failed {
            action,
            locator: locator.clone(),
            cause,
        };
        warn!(%locator, %action, error = %err, "action failed");
        self.capture(&err).await;
        err
    }

    async fn capture(&self, err: &ActionError) {
        if let Some(recorder) = &self.recorder {
            recorder
                .capture_and_publish(&self.driver, err.evidence_label())
                .await;
        }
    }

    async fn snapshot(&self, phase: &str, action: ActionKind, locator: &Locator) {
        if let Some(recorder) = &self.recorder {
            recorder
                .snapshot(&self.driver, &format!("{phase} {action} {locator}"))
                .await;
        }
    }
}
