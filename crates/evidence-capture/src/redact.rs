use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

pub const REDACTED: &str = "[REDACTED]";

/// Key names whose values must never appear in evidence.
static SENSITIVE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)token|auth|password|secret").expect("sensitive-key pattern"));

pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY.is_match(key)
}

/// A storage snapshot as JSON, with sensitive values replaced. Keys are
/// kept verbatim so the evidence still shows *what* was stored.
pub fn redacted_map(entries: &BTreeMap<String, String>) -> Value {
    let map: serde_json::Map<String, Value> = entries
        .iter()
        .map(|(key, value)| {
            let value = if is_sensitive_key(key) {
                Value::from(REDACTED)
            } else {
                Value::from(value.as_str())
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(map)
}

/// Cookies as JSON. Cookie values are opaque blobs that routinely carry
/// session material, so every value is redacted regardless of name.
pub fn redacted_cookies(cookies: &[driver_adapter::Cookie]) -> Value {
    Value::Array(
        cookies
            .iter()
            .map(|cookie| {
                json!({
                    "name": cookie.name,
                    "value": REDACTED,
                    "domain": cookie.domain,
                    "path": cookie.path,
                    "secure": cookie.secure,
                    "httpOnly": cookie.http_only,
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_keys_match_case_insensitively() {
        for key in ["authToken", "AUTH_KEY", "Password", "client_secret", "x-token"] {
            assert!(is_sensitive_key(key), "{key} should be sensitive");
        }
        for key in ["theme", "locale", "cart_items"] {
            assert!(!is_sensitive_key(key), "{key} should not be sensitive");
        }
    }

    #[test]
    fn redacted_map_keeps_keys_and_hides_sensitive_values() {
        let mut entries = BTreeMap::new();
        entries.insert("authToken".to_string(), "eyJhbGci".to_string());
        entries.insert("theme".to_string(), "dark".to_string());

        let value = redacted_map(&entries);
        assert_eq!(value["authToken"], REDACTED);
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn cookie_values_are_always_redacted() {
        let cookies = vec![driver_adapter::Cookie {
            name: "preferences".to_string(),
            value: "harmless-looking".to_string(),
            domain: Some("app.example".to_string()),
            path: Some("/".to_string()),
            secure: true,
            http_only: false,
        }];

        let value = redacted_cookies(&cookies);
        assert_eq!(value[0]["name"], "preferences");
        assert_eq!(value[0]["value"], REDACTED);
        assert_eq!(value[0]["httpOnly"], false);
    }
}
