//! Launch configuration for browser sessions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Supported browser targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
    Safari,
}

impl BrowserKind {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Safari => "safari",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            "safari" | "webkit" => Ok(BrowserKind::Safari),
            other => Err(format!("unsupported browser target: {}", other)),
        }
    }
}

/// How long the driver blocks a navigation before handing control back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLoadStrategy {
    /// Wait for the full load event.
    #[default]
    Normal,
    /// Wait for DOMContentLoaded only.
    Eager,
    /// Do not block on load at all.
    None,
}

/// Browser window geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Configuration for launching and tuning a browser session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub browser: BrowserKind,
    pub headless: bool,
    pub window: WindowSize,
    pub page_load_strategy: PageLoadStrategy,

    /// Driver-level implicit wait. Explicit waiting is the wait engine's
    /// job, so this is forced to zero by [`DriverConfig::normalized`].
    pub implicit_wait_ms: u64,
    pub page_load_timeout_ms: u64,
    pub script_timeout_ms: u64,

    /// Disable the browser's native password manager / credential prompts,
    /// which otherwise steal focus during login flows.
    pub disable_credential_prompts: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chrome,
            headless: false,
            window: WindowSize::default(),
            page_load_strategy: PageLoadStrategy::Normal,
            implicit_wait_ms: 0,
            page_load_timeout_ms: 60_000,
            script_timeout_ms: 30_000,
            disable_credential_prompts: true,
        }
    }
}

impl DriverConfig {
    /// Layered load: built-in defaults, then an optional config file, then
    /// `VANTAGE_*` environment overrides (e.g. `VANTAGE_BROWSER=firefox`,
    /// `VANTAGE_HEADLESS=true`).
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let loaded: DriverConfig = builder
            .add_source(config::Environment::with_prefix("VANTAGE"))
            .build()?
            .try_deserialize()?;
        Ok(loaded.normalized())
    }

    /// Enforce invariants a caller-supplied config may violate.
    pub fn normalized(mut self) -> Self {
        if self.implicit_wait_ms != 0 {
            warn!(
                implicit_wait_ms = self.implicit_wait_ms,
                "implicit wait is delegated to the wait engine; forcing to 0"
            );
            self.implicit_wait_ms = 0;
        }
        self
    }

    /// Command-line switches for chromium-family launches.
    pub fn browser_args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-notifications".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
            args.push(format!(
                "--window-size={},{}",
                self.window.width, self.window.height
            ));
        } else {
            args.push("--start-maximized".to_string());
        }
        args
    }

    /// Chromium profile preferences.
    pub fn browser_prefs(&self) -> serde_json::Value {
        serde_json::json!({
            "credentials_enable_service": !self.disable_credential_prompts,
            "profile": {
                "password_manager_enabled": !self.disable_credential_prompts,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_harness_expectations() {
        let config = DriverConfig::default();
        assert_eq!(config.browser, BrowserKind::Chrome);
        assert_eq!(config.implicit_wait_ms, 0);
        assert_eq!(config.page_load_strategy, PageLoadStrategy::Normal);
        assert!(config.disable_credential_prompts);
    }

    #[test]
    fn normalized_forces_implicit_wait_to_zero() {
        let config = DriverConfig {
            implicit_wait_ms: 5_000,
            ..DriverConfig::default()
        };
        assert_eq!(config.normalized().implicit_wait_ms, 0);
    }

    #[test]
    fn browser_kind_parses_aliases() {
        assert_eq!("CHROME".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("webkit".parse::<BrowserKind>().unwrap(), BrowserKind::Safari);
        assert!("opera".parse::<BrowserKind>().is_err());
    }

    #[test]
    fn headless_args_pin_window_geometry() {
        let config = DriverConfig {
            headless: true,
            ..DriverConfig::default()
        };
        let args = config.browser_args();
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(!args.contains(&"--start-maximized".to_string()));
    }

    #[test]
    fn headed_args_maximize() {
        let args = DriverConfig::default().browser_args();
        assert!(args.contains(&"--start-maximized".to_string()));
    }

    #[test]
    fn prefs_disable_password_manager() {
        let prefs = DriverConfig::default().browser_prefs();
        assert_eq!(prefs["credentials_enable_service"], false);
        assert_eq!(prefs["profile"]["password_manager_enabled"], false);
    }
}
