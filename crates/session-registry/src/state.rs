use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use driver_adapter::BrowserLauncher;
use tracing::{debug, info, warn};
use vantage_core_types::ContextKey;

use crate::errors::RegistryError;
use crate::model::{RegistryConfig, Session, SessionTimeouts};

/// Context-keyed session map.
///
/// Invariant: at most one session exists per context key. Contexts are
/// single-owner (one worker drives one key), so `acquire`/`release` for a
/// given key are never called concurrently; the map itself is still safe
/// to share across contexts.
pub struct SessionRegistry {
    sessions: DashMap<ContextKey, Arc<Session>>,
    launcher: Arc<dyn BrowserLauncher>,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, mut config: RegistryConfig) -> Self {
        config.driver = config.driver.clone().normalized();
        Self {
            sessions: DashMap::new(),
            launcher,
            config,
        }
    }

    /// Return the context's session, launching a browser on first demand.
    ///
    /// A second `acquire` without an intervening `release` returns the same
    /// session; it never recreates.
    pub async fn acquire(&self, key: &ContextKey) -> Result<Arc<Session>, RegistryError> {
        if let Some(existing) = self.sessions.get(key) {
            debug!(context = %key, "reusing existing session");
            return Ok(Arc::clone(existing.value()));
        }

        info!(context = %key, browser = %self.config.driver.browser, "launching browser session");
        let driver =
            self.launcher
                .launch(&self.config.driver)
                .await
                .map_err(|source| RegistryError::Launch {
                    browser: self.config.driver.browser,
                    source,
                })?;

        let session = Arc::new(Session::new(
            key.clone(),
            driver,
            SessionTimeouts::from_config(&self.config.driver),
        ));
        let entry = self
            .sessions
            .entry(key.clone())
            .or_insert_with(|| Arc::clone(&session));
        Ok(Arc::clone(entry.value()))
    }

    /// Look a session up without ever creating one.
    pub fn lookup(&self, key: &ContextKey) -> Option<Arc<Session>> {
        self.sessions.get(key).map(|e| Arc::clone(e.value()))
    }

    /// Close and forget the context's session.
    ///
    /// Idempotent: releasing twice, or releasing a context that never
    /// acquired, is a no-op. Close errors are swallowed and logged; an
    /// already-closed session is not an error.
    pub async fn release(&self, key: &ContextKey) {
        let Some((_, session)) = self.sessions.remove(key) else {
            debug!(context = %key, "release without live session; nothing to do");
            return;
        };

        if self.config.teardown_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.teardown_delay_ms)).await;
        }

        match session.driver().quit().await {
            Ok(()) => info!(context = %key, "session closed"),
            Err(err) if err.is_session_gone() => {
                debug!(context = %key, "session was already gone at release")
            }
            Err(err) => warn!(context = %key, error = %err, "session close failed; forgetting it anyway"),
        }
    }

    /// Tear down every live session (end-of-run cleanup).
    pub async fn release_all(&self) {
        let keys: Vec<ContextKey> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            self.release(&key).await;
        }
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }
}
