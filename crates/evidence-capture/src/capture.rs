use std::sync::Arc;

use chrono::Utc;
use driver_adapter::{PageDriver, StorageKind};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::bundle::EvidenceBundle;
use crate::redact::{redacted_cookies, redacted_map};

/// Capture a diagnostics bundle from a session that just failed an
/// operation.
///
/// Artifacts are fetched one at a time; a driver error on any of them is
/// logged and that artifact is omitted, never aborting the rest. The
/// function itself is infallible so it can sit inside error paths without
/// complicating them.
pub async fn capture_failure(
    driver: &Arc<dyn PageDriver>,
    label: impl Into<String>,
) -> EvidenceBundle {
    let label = label.into();
    let captured_at = Utc::now();

    let screenshot = match driver.screenshot().await {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            warn!(%label, error = %err, "screenshot unavailable; omitting");
            None
        }
    };

    let markup = match driver.page_source().await {
        Ok(source) => Some(source),
        Err(err) => {
            warn!(%label, error = %err, "page source unavailable; omitting");
            None
        }
    };

    let storage = capture_storage(driver, &label).await;

    let cookies = match driver.cookies().await {
        Ok(jar) => Some(redacted_cookies(&jar)),
        Err(err) => {
            warn!(%label, error = %err, "cookies unavailable; omitting");
            None
        }
    };

    let console = match driver.console_logs().await {
        Ok(entries) => Some(
            entries
                .iter()
                .map(|e| format!("{} {} {}", e.timestamp.to_rfc3339(), e.level, e.message))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Err(err) => {
            warn!(%label, error = %err, "console logs unavailable; omitting");
            None
        }
    };

    let url = driver.current_url().await.ok();
    let user_agent = driver.user_agent().await.ok();
    let metadata = json!({
        "url": url,
        "userAgent": user_agent,
        "timestamp": captured_at.to_rfc3339(),
    });

    let bundle = EvidenceBundle {
        label,
        captured_at,
        screenshot,
        markup,
        storage,
        cookies,
        console,
        metadata,
    };
    info!(
        label = %bundle.label,
        artifacts = bundle.artifact_count(),
        "captured failure evidence"
    );
    bundle
}

/// Both storage areas as one artifact; whichever area fails is dropped
/// from the snapshot, and the artifact is omitted only when both do.
async fn capture_storage(driver: &Arc<dyn PageDriver>, label: &str) -> Option<Value> {
    let mut areas = serde_json::Map::new();
    for kind in [StorageKind::Local, StorageKind::Session] {
        match driver.storage_snapshot(kind).await {
            Ok(entries) => {
                areas.insert(kind.name().to_string(), redacted_map(&entries));
            }
            Err(err) => {
                warn!(%label, area = kind.name(), error = %err, "storage unavailable; omitting");
            }
        }
    }
    if areas.is_empty() {
        None
    } else {
        Some(Value::Object(areas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_adapter::mock::MockDriver;
    use driver_adapter::Cookie;

    fn staged_driver() -> Arc<MockDriver> {
        let mock = MockDriver::shared();
        mock.set_url("https://app.example/login");
        mock.set_page_source("<html><body><form id='login'/></body></html>");
        mock.put_storage(StorageKind::Local, "authToken", "eyJhbGci.secret");
        mock.put_storage(StorageKind::Local, "theme", "dark");
        mock.put_storage(StorageKind::Session, "csrf_secret", "abc123");
        mock.add_cookie(Cookie {
            name: "sid".to_string(),
            value: "opaque-session-blob".to_string(),
            domain: Some("app.example".to_string()),
            path: Some("/".to_string()),
            secure: true,
            http_only: true,
        });
        mock.log_console("SEVERE", "Failed to load resource: 401");
        mock
    }

    #[tokio::test]
    async fn full_capture_collects_every_artifact() {
        let mock = staged_driver();
        let driver: Arc<dyn PageDriver> = mock;

        let bundle = capture_failure(&driver, "click id:submit").await;

        assert_eq!(bundle.label, "click id:submit");
        assert_eq!(bundle.artifact_count(), 5);
        assert_eq!(bundle.metadata["url"], "https://app.example/login");
        assert_eq!(bundle.metadata["userAgent"], "MockBrowser/1.0");
        assert!(bundle.console.unwrap().contains("SEVERE"));
    }

    #[tokio::test]
    async fn secrets_never_reach_the_bundle() {
        let mock = staged_driver();
        let driver: Arc<dyn PageDriver> = mock;

        let bundle = capture_failure(&driver, "type id:password").await;

        let storage = bundle.storage.unwrap();
        assert_eq!(storage["localStorage"]["authToken"], crate::REDACTED);
        assert_eq!(storage["localStorage"]["theme"], "dark");
        assert_eq!(storage["sessionStorage"]["csrf_secret"], crate::REDACTED);
        let rendered = storage.to_string();
        assert!(!rendered.contains("eyJhbGci"));
        assert!(!rendered.contains("abc123"));

        let cookies = bundle.cookies.unwrap();
        assert_eq!(cookies[0]["value"], crate::REDACTED);
        assert!(!cookies.to_string().contains("opaque-session-blob"));
    }

    #[tokio::test]
    async fn unavailable_artifacts_are_omitted_not_fatal() {
        let mock = staged_driver();
        mock.disable_console_logs();
        mock.disable_screenshots();
        let driver: Arc<dyn PageDriver> = mock;

        let bundle = capture_failure(&driver, "click id:submit").await;

        assert!(bundle.console.is_none());
        assert!(bundle.screenshot.is_none());
        // The rest of the bundle is intact.
        assert!(bundle.markup.is_some());
        assert!(bundle.storage.is_some());
        assert!(bundle.cookies.is_some());
        assert_eq!(bundle.metadata["url"], "https://app.example/login");
    }

    #[tokio::test]
    async fn dead_session_still_yields_a_labeled_bundle() {
        let mock = staged_driver();
        mock.quit().await.unwrap();
        let driver: Arc<dyn PageDriver> = mock;

        let bundle = capture_failure(&driver, "click id:submit").await;

        assert_eq!(bundle.artifact_count(), 0);
        assert_eq!(bundle.label, "click id:submit");
        assert_eq!(bundle.metadata["url"], Value::Null);
    }
}
