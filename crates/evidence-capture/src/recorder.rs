use std::sync::Arc;

use driver_adapter::PageDriver;
use tracing::{debug, warn};

use crate::bundle::EvidenceBundle;
use crate::capture::capture_failure;
use crate::sink::EvidenceSink;

/// Pairs the capture routine with a sink. Publishing is best-effort
/// throughout: a sink that cannot take an attachment is logged, and the
/// bundle is still returned to the caller.
#[derive(Clone)]
pub struct Recorder {
    sink: Arc<dyn EvidenceSink>,
}

impl Recorder {
    pub fn new(sink: Arc<dyn EvidenceSink>) -> Self {
        Self { sink }
    }

    /// Capture a failure bundle and push its artifacts to the sink.
    pub async fn capture_and_publish(
        &self,
        driver: &Arc<dyn PageDriver>,
        label: impl Into<String>,
    ) -> EvidenceBundle {
        let bundle = capture_failure(driver, label).await;
        self.publish(&bundle);
        bundle
    }

    /// Push one bundle's artifacts to the sink, one attachment each.
    pub fn publish(&self, bundle: &EvidenceBundle) {
        let prefix = bundle.label.as_str();
        if let Some(bytes) = &bundle.screenshot {
            self.attach(&format!("{prefix}-screenshot.png"), "image/png", bytes);
        }
        if let Some(markup) = &bundle.markup {
            self.attach(&format!("{prefix}-page.html"), "text/html", markup.as_bytes());
        }
        if let Some(storage) = &bundle.storage {
            self.attach(
                &format!("{prefix}-storage.json"),
                "application/json",
                storage.to_string().as_bytes(),
            );
        }
        if let Some(cookies) = &bundle.cookies {
            self.attach(
                &format!("{prefix}-cookies.json"),
                "application/json",
                cookies.to_string().as_bytes(),
            );
        }
        if let Some(console) = &bundle.console {
            self.attach(
                &format!("{prefix}-console.txt"),
                "text/plain",
                console.as_bytes(),
            );
        }
        self.attach(
            &format!("{prefix}-metadata.json"),
            "application/json",
            bundle.metadata.to_string().as_bytes(),
        );
    }

    /// Best-effort standalone screenshot (before/after an interaction).
    /// Never fails; a session that cannot produce one is just logged.
    pub async fn snapshot(&self, driver: &Arc<dyn PageDriver>, name: &str) {
        match driver.screenshot().await {
            Ok(bytes) => self.attach(&format!("{name}.png"), "image/png", &bytes),
            Err(err) => debug!(%name, error = %err, "snapshot unavailable; skipping"),
        }
    }

    fn attach(&self, name: &str, mime: &str, bytes: &[u8]) {
        if let Err(err) = self.sink.add_attachment(name, mime, bytes) {
            warn!(%name, error = %err, "sink rejected attachment");
        }
    }
}
