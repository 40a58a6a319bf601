use chrono::{DateTime, Utc};
use serde_json::Value;

/// Everything captured at one failure boundary.
///
/// Every field except `label`, `captured_at` and `metadata` is optional:
/// an artifact the session could not produce is simply absent. A bundle
/// with gaps is still evidence.
#[derive(Clone, Debug)]
pub struct EvidenceBundle {
    pub label: String,
    pub captured_at: DateTime<Utc>,
    /// PNG bytes of the viewport at failure time.
    pub screenshot: Option<Vec<u8>>,
    /// Full page markup.
    pub markup: Option<String>,
    /// Redacted `localStorage`/`sessionStorage` snapshots.
    pub storage: Option<Value>,
    /// Redacted cookie jar.
    pub cookies: Option<Value>,
    /// Browser console, one line per entry.
    pub console: Option<String>,
    /// URL, user agent and capture timestamp; fields the capture could
    /// not read are null.
    pub metadata: Value,
}

impl EvidenceBundle {
    pub fn artifact_count(&self) -> usize {
        [
            self.screenshot.is_some(),
            self.markup.is_some(),
            self.storage.is_some(),
            self.cookies.is_some(),
            self.console.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}
