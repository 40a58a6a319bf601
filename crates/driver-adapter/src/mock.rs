//! Scripted in-memory [`PageDriver`] for tests.
//!
//! Lets a test stage a page: which elements exist, when they become
//! visible, how many native clicks they reject, what storage and console
//! content the page carries. No browser process is involved, so timing
//! behavior is deterministic down to the poll interval.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use vantage_core_types::{ElementHandle, Locator};

use crate::config::DriverConfig;
use crate::driver::{
    BrowserLauncher, ConsoleEntry, Cookie, ElementRect, PageDriver, StorageKind,
};
use crate::error::{DriverError, DriverErrorKind, DriverResult};

/// One staged element on the mock page.
#[derive(Clone, Debug)]
pub struct MockElement {
    displayed: bool,
    enabled: bool,
    selected: bool,
    rect: ElementRect,
    text: String,
    value: String,
    attributes: HashMap<String, String>,
    appears_at: Option<Instant>,
    reject_native_clicks: u32,
    reject_script_clicks: u32,
    toggle_on_click: bool,
    native_clicks: u32,
    script_clicks: u32,
}

impl MockElement {
    /// A visible, enabled element with a rendered size.
    pub fn visible() -> Self {
        Self {
            displayed: true,
            enabled: true,
            selected: false,
            rect: ElementRect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 24.0,
            },
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            appears_at: None,
            reject_native_clicks: 0,
            reject_script_clicks: 0,
            toggle_on_click: false,
            native_clicks: 0,
            script_clicks: 0,
        }
    }

    /// Present in the DOM but not displayed.
    pub fn hidden() -> Self {
        let mut element = Self::visible();
        element.displayed = false;
        element.rect = ElementRect::default();
        element
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_rect(mut self, rect: ElementRect) -> Self {
        self.rect = rect;
        self
    }

    /// Not findable until `delay` has elapsed from staging time.
    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_at = Some(Instant::now() + delay);
        self
    }

    /// The first `count` native clicks fail with `NotInteractable`
    /// (simulates an obstructed or animating element); scripted clicks
    /// always land.
    pub fn reject_native_clicks(mut self, count: u32) -> Self {
        self.reject_native_clicks = count;
        self
    }

    /// The first `count` scripted clicks fail with `ScriptFailure`.
    /// Combined with [`reject_native_clicks`](Self::reject_native_clicks)
    /// this stages an element no click strategy can land on.
    pub fn reject_script_clicks(mut self, count: u32) -> Self {
        self.reject_script_clicks = count;
        self
    }

    /// Clicks flip the selection state (checkbox behavior).
    pub fn toggle_on_click(mut self) -> Self {
        self.toggle_on_click = true;
        self
    }

    fn present(&self, now: Instant) -> bool {
        match self.appears_at {
            Some(at) => now >= at,
            None => true,
        }
    }
}

#[derive(Default)]
struct PageState {
    url: String,
    user_agent: String,
    page_source: String,
    elements: BTreeMap<String, MockElement>,
    handles: HashMap<String, String>,
    cookies: Vec<Cookie>,
    local_storage: BTreeMap<String, String>,
    session_storage: BTreeMap<String, String>,
    console: Vec<ConsoleEntry>,
    script_results: Vec<Value>,
    screenshot: Option<Vec<u8>>,
    console_supported: bool,
    closed: bool,
}

/// Scripted in-memory page driver.
pub struct MockDriver {
    state: Mutex<PageState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PageState {
                url: "http://localhost/login.html".to_string(),
                user_agent: "MockBrowser/1.0".to_string(),
                page_source: "<html><body></body></html>".to_string(),
                screenshot: Some(b"\x89PNG mock".to_vec()),
                console_supported: true,
                ..PageState::default()
            }),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // ---- staging ----

    pub fn add_element(&self, locator: &Locator, element: MockElement) {
        self.state
            .lock()
            .elements
            .insert(locator.to_string(), element);
    }

    pub fn remove_element(&self, locator: &Locator) {
        self.state.lock().elements.remove(&locator.to_string());
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.state.lock().url = url.into();
    }

    pub fn set_page_source(&self, markup: impl Into<String>) {
        self.state.lock().page_source = markup.into();
    }

    pub fn put_storage(&self, kind: StorageKind, key: impl Into<String>, value: impl Into<String>) {
        let mut state = self.state.lock();
        let store = match kind {
            StorageKind::Local => &mut state.local_storage,
            StorageKind::Session => &mut state.session_storage,
        };
        store.insert(key.into(), value.into());
    }

    pub fn add_cookie(&self, cookie: Cookie) {
        self.state.lock().cookies.push(cookie);
    }

    pub fn log_console(&self, level: impl Into<String>, message: impl Into<String>) {
        self.state.lock().console.push(ConsoleEntry {
            timestamp: Utc::now(),
            level: level.into(),
            message: message.into(),
        });
    }

    pub fn push_script_result(&self, value: Value) {
        self.state.lock().script_results.push(value);
    }

    /// Make console log retrieval raise `Unsupported`.
    pub fn disable_console_logs(&self) {
        self.state.lock().console_supported = false;
    }

    /// Make screenshots raise `Unsupported`.
    pub fn disable_screenshots(&self) {
        self.state.lock().screenshot = None;
    }

    // ---- assertions ----

    pub fn native_clicks(&self, locator: &Locator) -> u32 {
        self.with_element(locator, |e| e.native_clicks).unwrap_or(0)
    }

    pub fn script_clicks(&self, locator: &Locator) -> u32 {
        self.with_element(locator, |e| e.script_clicks).unwrap_or(0)
    }

    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        self.with_element(locator, |e| e.value.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn with_element<T>(&self, locator: &Locator, f: impl FnOnce(&MockElement) -> T) -> Option<T> {
        self.state
            .lock()
            .elements
            .get(&locator.to_string())
            .map(f)
    }

    fn closed_err() -> DriverError {
        DriverError::new(DriverErrorKind::SessionClosed).with_hint("mock session was quit")
    }

    fn stale_err(handle: &ElementHandle) -> DriverError {
        DriverError::new(DriverErrorKind::StaleElement)
            .with_hint(format!("no live node behind handle {}", handle))
    }
}

macro_rules! guard_open {
    ($state:expr) => {
        if $state.closed {
            return Err(MockDriver::closed_err());
        }
    };
}

impl PageState {
    fn element_for(&mut self, handle: &ElementHandle) -> Option<&mut MockElement> {
        let key = self.handles.get(&handle.0)?.clone();
        self.elements.get_mut(&key)
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        guard_open!(state);
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        let state = self.state.lock();
        guard_open!(state);
        Ok(state.url.clone())
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
        let mut state = self.state.lock();
        guard_open!(state);
        let now = Instant::now();
        let key = locator.to_string();
        let mut found = Vec::new();
        if state
            .elements
            .get(&key)
            .map(|e| e.present(now))
            .unwrap_or(false)
        {
            let handle = ElementHandle::new();
            state.handles.insert(handle.0.clone(), key);
            found.push(handle);
        }
        Ok(found)
    }

    async fn is_displayed(&self, handle: &ElementHandle) -> DriverResult<bool> {
        let mut state = self.state.lock();
        guard_open!(state);
        state
            .element_for(handle)
            .map(|e| e.displayed)
            .ok_or_else(|| Self::stale_err(handle))
    }

    async fn is_enabled(&self, handle: &ElementHandle) -> DriverResult<bool> {
        let mut state = self.state.lock();
        guard_open!(state);
        state
            .element_for(handle)
            .map(|e| e.enabled)
            .ok_or_else(|| Self::stale_err(handle))
    }

    async fn is_selected(&self, handle: &ElementHandle) -> DriverResult<bool> {
        let mut state = self.state.lock();
        guard_open!(state);
        state
            .element_for(handle)
            .map(|e| e.selected)
            .ok_or_else(|| Self::stale_err(handle))
    }

    async fn rect(&self, handle: &ElementHandle) -> DriverResult<ElementRect> {
        let mut state = self.state.lock();
        guard_open!(state);
        state
            .element_for(handle)
            .map(|e| e.rect)
            .ok_or_else(|| Self::stale_err(handle))
    }

    async fn click(&self, handle: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state.lock();
        guard_open!(state);
        let element = state
            .element_for(handle)
            .ok_or_else(|| Self::stale_err(handle))?;
        if !element.enabled {
            return Err(DriverError::new(DriverErrorKind::NotInteractable)
                .with_hint("element is disabled"));
        }
        if element.reject_native_clicks > 0 {
            element.reject_native_clicks -= 1;
            return Err(DriverError::new(DriverErrorKind::NotInteractable)
                .with_hint("element is obstructed"));
        }
        element.native_clicks += 1;
        if element.toggle_on_click {
            element.selected = !element.selected;
        }
        Ok(())
    }

    async fn click_via_script(&self, handle: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state.lock();
        guard_open!(state);
        let element = state
            .element_for(handle)
            .ok_or_else(|| Self::stale_err(handle))?;
        if element.reject_script_clicks > 0 {
            element.reject_script_clicks -= 1;
            return Err(DriverError::new(DriverErrorKind::ScriptFailure)
                .with_hint("scripted click raised in page context"));
        }
        element.script_clicks += 1;
        if element.toggle_on_click {
            element.selected = !element.selected;
        }
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state.lock();
        guard_open!(state);
        let element = state
            .element_for(handle)
            .ok_or_else(|| Self::stale_err(handle))?;
        element.value.clear();
        Ok(())
    }

    async fn send_keys(&self, handle: &ElementHandle, text: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        guard_open!(state);
        let element = state
            .element_for(handle)
            .ok_or_else(|| Self::stale_err(handle))?;
        if !element.enabled {
            return Err(DriverError::new(DriverErrorKind::NotInteractable)
                .with_hint("element is disabled"));
        }
        element.value.push_str(text);
        Ok(())
    }

    async fn text(&self, handle: &ElementHandle) -> DriverResult<String> {
        let mut state = self.state.lock();
        guard_open!(state);
        state
            .element_for(handle)
            .map(|e| e.text.clone())
            .ok_or_else(|| Self::stale_err(handle))
    }

    async fn attribute(
        &self,
        handle: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let mut state = self.state.lock();
        guard_open!(state);
        let element = state
            .element_for(handle)
            .ok_or_else(|| Self::stale_err(handle))?;
        if name == "value" && !element.value.is_empty() {
            return Ok(Some(element.value.clone()));
        }
        Ok(element.attributes.get(name).cloned())
    }

    async fn execute_script(&self, _script: &str) -> DriverResult<Value> {
        let mut state = self.state.lock();
        guard_open!(state);
        Ok(state.script_results.pop().unwrap_or(Value::Null))
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state.lock();
        guard_open!(state);
        state
            .element_for(handle)
            .map(|_| ())
            .ok_or_else(|| Self::stale_err(handle))
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        let state = self.state.lock();
        guard_open!(state);
        state.screenshot.clone().ok_or_else(|| {
            DriverError::new(DriverErrorKind::Unsupported)
                .with_hint("screenshots disabled on this mock")
        })
    }

    async fn page_source(&self) -> DriverResult<String> {
        let state = self.state.lock();
        guard_open!(state);
        Ok(state.page_source.clone())
    }

    async fn cookies(&self) -> DriverResult<Vec<Cookie>> {
        let state = self.state.lock();
        guard_open!(state);
        Ok(state.cookies.clone())
    }

    async fn storage_snapshot(
        &self,
        kind: StorageKind,
    ) -> DriverResult<BTreeMap<String, String>> {
        let state = self.state.lock();
        guard_open!(state);
        Ok(match kind {
            StorageKind::Local => state.local_storage.clone(),
            StorageKind::Session => state.session_storage.clone(),
        })
    }

    async fn console_logs(&self) -> DriverResult<Vec<ConsoleEntry>> {
        let state = self.state.lock();
        guard_open!(state);
        if !state.console_supported {
            return Err(DriverError::new(DriverErrorKind::Unsupported)
                .with_hint("console log retrieval not supported by this browser"));
        }
        Ok(state.console.clone())
    }

    async fn user_agent(&self) -> DriverResult<String> {
        let state = self.state.lock();
        guard_open!(state);
        Ok(state.user_agent.clone())
    }

    async fn quit(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Self::closed_err());
        }
        state.closed = true;
        Ok(())
    }
}

/// Launcher yielding mock drivers; used by registry and integration tests.
///
/// Prepared drivers are handed out in staging order; once the queue is
/// empty every launch yields a fresh blank driver.
#[derive(Default)]
pub struct MockLauncher {
    prepared: Mutex<Vec<Arc<MockDriver>>>,
    launched: Mutex<Vec<Arc<MockDriver>>>,
    fail_with: Mutex<Option<DriverError>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a pre-staged driver for the next launch.
    pub fn prepare(&self, driver: Arc<MockDriver>) {
        self.prepared.lock().insert(0, driver);
    }

    /// Make every launch fail (browser binary missing, unsupported target).
    pub fn fail_with(&self, error: DriverError) {
        *self.fail_with.lock() = Some(error);
    }

    /// Every driver handed out so far, in launch order.
    pub fn launched(&self) -> Vec<Arc<MockDriver>> {
        self.launched.lock().clone()
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self, _config: &DriverConfig) -> DriverResult<Arc<dyn PageDriver>> {
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        let driver = self
            .prepared
            .lock()
            .pop()
            .unwrap_or_else(MockDriver::shared);
        self.launched.lock().push(driver.clone());
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn staged_element_is_found_and_queried() {
        let driver = MockDriver::new();
        let locator = Locator::id("email");
        driver.add_element(&locator, MockElement::visible().with_text("Email"));

        let handles = driver.find_elements(&locator).await.unwrap();
        assert_eq!(handles.len(), 1);
        assert!(driver.is_displayed(&handles[0]).await.unwrap());
        assert!(driver.rect(&handles[0]).await.unwrap().has_size());
        assert_eq!(driver.text(&handles[0]).await.unwrap(), "Email");
    }

    #[tokio::test]
    async fn delayed_element_is_absent_until_deadline() {
        let driver = MockDriver::new();
        let locator = Locator::css("#late");
        driver.add_element(
            &locator,
            MockElement::visible().appears_after(Duration::from_millis(80)),
        );

        assert!(driver.find_elements(&locator).await.unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(driver.find_elements(&locator).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rigged_clicks_fail_natively_then_land_via_script() {
        let driver = MockDriver::new();
        let locator = Locator::css("#submit");
        driver.add_element(&locator, MockElement::visible().reject_native_clicks(1));

        let handle = driver.find_elements(&locator).await.unwrap().remove(0);
        let err = driver.click(&handle).await.unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::NotInteractable);
        driver.click_via_script(&handle).await.unwrap();
        assert_eq!(driver.script_clicks(&locator), 1);
        assert_eq!(driver.native_clicks(&locator), 0);
    }

    #[tokio::test]
    async fn quit_closes_the_session_for_all_commands() {
        let driver = MockDriver::new();
        driver.quit().await.unwrap();
        assert!(driver.is_closed());
        let err = driver.current_url().await.unwrap_err();
        assert!(err.is_session_gone());
        assert!(driver.quit().await.unwrap_err().is_session_gone());
    }

    #[tokio::test]
    async fn launcher_hands_out_prepared_drivers_first() {
        let launcher = MockLauncher::new();
        let staged = MockDriver::shared();
        staged.set_url("http://staged.example/");
        launcher.prepare(staged);

        let config = DriverConfig::default();
        let first = launcher.launch(&config).await.unwrap();
        assert_eq!(first.current_url().await.unwrap(), "http://staged.example/");
        let second = launcher.launch(&config).await.unwrap();
        assert_eq!(
            second.current_url().await.unwrap(),
            "http://localhost/login.html"
        );
        assert_eq!(launcher.launched().len(), 2);
    }

    #[tokio::test]
    async fn failing_launcher_reports_launch_error() {
        let launcher = MockLauncher::new();
        launcher.fail_with(
            DriverError::new(DriverErrorKind::Io).with_hint("chromedriver binary missing"),
        );
        let err = launcher.launch(&DriverConfig::default()).await.unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::Io);
    }
}
