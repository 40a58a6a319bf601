use std::sync::Arc;
use std::time::{Duration, Instant};

use driver_adapter::{DriverConfig, PageDriver};
use serde::{Deserialize, Serialize};
use vantage_core_types::ContextKey;

/// Driver-level timeouts a session was created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Always zero; explicit waiting belongs to the wait engine.
    pub implicit_wait: Duration,
    pub page_load: Duration,
    pub script: Duration,
}

impl SessionTimeouts {
    pub fn from_config(config: &DriverConfig) -> Self {
        Self {
            implicit_wait: Duration::from_millis(config.implicit_wait_ms),
            page_load: Duration::from_millis(config.page_load_timeout_ms),
            script: Duration::from_millis(config.script_timeout_ms),
        }
    }
}

/// One live browser session, owned by the registry.
///
/// Looked up (never copied) by the wait, interaction and evidence layers;
/// they hold the `Arc` only for the duration of one operation.
pub struct Session {
    key: ContextKey,
    driver: Arc<dyn PageDriver>,
    created_at: Instant,
    timeouts: SessionTimeouts,
}

impl Session {
    pub fn new(key: ContextKey, driver: Arc<dyn PageDriver>, timeouts: SessionTimeouts) -> Self {
        Self {
            key,
            driver,
            created_at: Instant::now(),
            timeouts,
        }
    }

    pub fn key(&self) -> &ContextKey {
        &self.key
    }

    pub fn driver(&self) -> Arc<dyn PageDriver> {
        Arc::clone(&self.driver)
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        self.timeouts
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("created_at", &self.created_at)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

/// Registry tuning supplied by the external config loader.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub driver: DriverConfig,

    /// Pause before quitting a released session, so a human watching a
    /// headed run can see the final page state.
    pub teardown_delay_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            teardown_delay_ms: 0,
        }
    }
}
