//! The [`PageDriver`] capability trait and its supporting value types.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vantage_core_types::{ElementHandle, Locator};

use crate::config::DriverConfig;
use crate::error::DriverResult;

/// Rendered geometry of a located element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    /// An element with no rendered area is treated as not visible.
    pub fn has_size(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// One browser cookie as exported by the driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

/// One console log line as exported by the driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsoleEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

/// Which web storage area to snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    Local,
    Session,
}

impl StorageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StorageKind::Local => "localStorage",
            StorageKind::Session => "sessionStorage",
        }
    }
}

/// Capability interface onto one live browser page.
///
/// All engine components look a session's driver up through the registry
/// and call it through this trait; nothing above this crate depends on a
/// concrete browser protocol.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the page to `url` and wait for the configured load strategy.
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    /// Resolve a locator to zero-or-more element handles, in document order.
    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>>;

    async fn is_displayed(&self, handle: &ElementHandle) -> DriverResult<bool>;

    async fn is_enabled(&self, handle: &ElementHandle) -> DriverResult<bool>;

    async fn is_selected(&self, handle: &ElementHandle) -> DriverResult<bool>;

    async fn rect(&self, handle: &ElementHandle) -> DriverResult<ElementRect>;

    /// Native (hit-tested) click.
    async fn click(&self, handle: &ElementHandle) -> DriverResult<()>;

    /// Script-driven click on the same node; bypasses hit-testing.
    async fn click_via_script(&self, handle: &ElementHandle) -> DriverResult<()>;

    /// Clear the element's current value.
    async fn clear(&self, handle: &ElementHandle) -> DriverResult<()>;

    /// Send key input to the element.
    async fn send_keys(&self, handle: &ElementHandle, text: &str) -> DriverResult<()>;

    /// The element's rendered text.
    async fn text(&self, handle: &ElementHandle) -> DriverResult<String>;

    /// An attribute value, `None` when the attribute is not present.
    async fn attribute(&self, handle: &ElementHandle, name: &str)
        -> DriverResult<Option<String>>;

    /// Evaluate a script in the page, returning its JSON value.
    async fn execute_script(&self, script: &str) -> DriverResult<Value>;

    /// Scroll the element into the viewport.
    async fn scroll_into_view(&self, handle: &ElementHandle) -> DriverResult<()>;

    /// PNG screenshot of the current viewport.
    async fn screenshot(&self) -> DriverResult<Vec<u8>>;

    /// Current page markup.
    async fn page_source(&self) -> DriverResult<String>;

    async fn cookies(&self) -> DriverResult<Vec<Cookie>>;

    /// Key/value snapshot of a web storage area.
    async fn storage_snapshot(&self, kind: StorageKind)
        -> DriverResult<BTreeMap<String, String>>;

    /// Browser console entries accumulated since the last retrieval.
    async fn console_logs(&self) -> DriverResult<Vec<ConsoleEntry>>;

    async fn user_agent(&self) -> DriverResult<String>;

    /// Tear the session down. Idempotent at the driver level: quitting an
    /// already-closed session reports `SessionClosed`, which callers treat
    /// as success.
    async fn quit(&self) -> DriverResult<()>;
}

impl std::fmt::Debug for dyn PageDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn PageDriver")
    }
}

/// Launches a browser and yields a live driver for it.
///
/// Injected into the session registry so that "which browser, how" stays a
/// boundary decision; tests inject a mock launcher.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, config: &DriverConfig) -> DriverResult<Arc<dyn PageDriver>>;
}
