//! Shared primitives used across the Vantage harness crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one logical execution context (e.g. one test worker).
///
/// Each context owns at most one browser session at a time; the session
/// registry keys its map by this value.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContextKey(pub String);

impl ContextKey {
    /// Key derived from a caller-chosen name (worker id, thread name).
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Fresh unique key for contexts without a natural name.
    pub fn unique() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of how to find zero-or-more elements in the
/// current document: a strategy tag plus a selector string.
///
/// Pure value with no lifecycle; safe to clone into logs, evidence labels
/// and serialized probe chains.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector
    Css(String),

    /// Element id attribute
    Id(String),

    /// XPath expression
    XPath(String),

    /// Anchor text (exact match on trimmed link text)
    LinkText(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// The raw selector string, without the strategy tag.
    pub fn selector(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::Id(s) | Locator::XPath(s) | Locator::LinkText(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::Id(s) => write!(f, "id:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
            Locator::LinkText(s) => write!(f, "link:{}", s),
        }
    }
}

/// Transient, session-scoped reference to a located DOM node.
///
/// Valid only until the next navigation or DOM mutation; operations
/// re-resolve their `Locator` instead of holding on to handles.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ElementHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_display_carries_strategy_tag() {
        assert_eq!(
            Locator::css(".error-message").to_string(),
            "css:.error-message"
        );
        assert_eq!(Locator::id("email").to_string(), "id:email");
        assert_eq!(
            Locator::xpath("//button[@type='submit']").to_string(),
            "xpath://button[@type='submit']"
        );
        assert_eq!(Locator::link_text("Sign up").to_string(), "link:Sign up");
    }

    #[test]
    fn locator_is_a_pure_value() {
        let a = Locator::css("#submit");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.selector(), "#submit");
    }

    #[test]
    fn locator_round_trips_through_serde() {
        let locator = Locator::id("loginBtnText");
        let json = serde_json::to_string(&locator).unwrap();
        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(locator, back);
    }

    #[test]
    fn context_keys_compare_by_name() {
        assert_eq!(ContextKey::named("worker-1"), ContextKey::named("worker-1"));
        assert_ne!(ContextKey::unique(), ContextKey::unique());
    }
}
