//! End-to-end exercise of the full engine stack against the mock driver:
//! registry-owned session, readiness-gated interactions, probe-chain
//! outcome detection and evidence at the failure boundary.

use std::sync::Arc;
use std::time::Duration;

use action_engine::{ActionError, Interactor};
use driver_adapter::mock::{MockDriver, MockElement};
use driver_adapter::{PageDriver, StorageKind};
use evidence_capture::{MemorySink, Recorder, REDACTED};
use session_registry::{RegistryConfig, SessionRegistry};
use vantage_core_types::{ContextKey, Locator};
use wait_engine::{ProbeChain, ReadyCondition, WaitConfig, Waiter};

fn waiter() -> Waiter {
    Waiter::new(WaitConfig {
        default_timeout_ms: 1_000,
        poll_interval_ms: 25,
    })
}

fn outcome_chain() -> ProbeChain {
    ProbeChain::new()
        .marker(
            "logged-in",
            Locator::css(".dashboard-header"),
            ReadyCondition::Visible,
            Duration::from_millis(400),
        )
        .marker(
            "bad-credentials",
            Locator::css(".error-message"),
            ReadyCondition::Visible,
            Duration::from_millis(200),
        )
        .url_match("still-on-login", ["login"])
}

fn stage_login_page(mock: &Arc<MockDriver>) {
    mock.set_url("https://app.example/login");
    mock.add_element(&Locator::id("email"), MockElement::visible().with_value("stale@old.com"));
    mock.add_element(&Locator::id("password"), MockElement::visible());
    // Submit is briefly obstructed by a fading overlay: the first native
    // click bounces, the scripted fallback lands.
    mock.add_element(
        &Locator::id("submit"),
        MockElement::visible().reject_native_clicks(1),
    );
}

#[tokio::test]
async fn successful_login_flow_end_to_end() {
    let launcher = Arc::new(driver_adapter::mock::MockLauncher::new());
    let staged = MockDriver::shared();
    stage_login_page(&staged);
    // The dashboard marker renders a moment after submit.
    staged.add_element(
        &Locator::css(".dashboard-header"),
        MockElement::visible().appears_after(Duration::from_millis(100)),
    );
    launcher.prepare(staged.clone());

    let registry = SessionRegistry::new(launcher, RegistryConfig::default());
    let key = ContextKey::named("worker-1");
    let session = registry.acquire(&key).await.unwrap();
    session
        .driver()
        .navigate("https://app.example/login")
        .await
        .unwrap();

    let interactor = Interactor::new(session.driver(), waiter());
    interactor
        .type_text(&Locator::id("email"), "user@example.com")
        .await
        .unwrap();
    interactor
        .type_text(&Locator::id("password"), "hunter2!")
        .await
        .unwrap();
    interactor.click(&Locator::id("submit")).await.unwrap();

    assert_eq!(staged.value_of(&Locator::id("email")).as_deref(), Some("user@example.com"));
    assert_eq!(staged.script_clicks(&Locator::id("submit")), 1);

    let driver = session.driver();
    let outcome = outcome_chain().first_satisfied(&waiter(), &driver).await;
    assert_eq!(outcome.as_deref(), Some("logged-in"));

    registry.release(&key).await;
    assert!(staged.is_closed());
    assert_eq!(registry.live_sessions(), 0);
}

#[tokio::test]
async fn rejected_login_is_detected_by_the_fallback_probe() {
    let launcher = Arc::new(driver_adapter::mock::MockLauncher::new());
    let staged = MockDriver::shared();
    stage_login_page(&staged);
    staged.add_element(
        &Locator::css(".error-message"),
        MockElement::visible().with_text("Invalid credentials"),
    );
    launcher.prepare(staged);

    let registry = SessionRegistry::new(launcher, RegistryConfig::default());
    let session = registry.acquire(&ContextKey::named("worker-1")).await.unwrap();
    let driver = session.driver();

    let outcome = outcome_chain().first_satisfied(&waiter(), &driver).await;
    assert_eq!(outcome.as_deref(), Some("bad-credentials"));

    let interactor = Interactor::new(session.driver(), waiter());
    let banner = interactor
        .read_text(&Locator::css(".error-message"))
        .await
        .unwrap();
    assert_eq!(banner, "Invalid credentials");
}

#[tokio::test]
async fn failed_action_leaves_redacted_evidence_behind() {
    let launcher = Arc::new(driver_adapter::mock::MockLauncher::new());
    let staged = MockDriver::shared();
    stage_login_page(&staged);
    staged.put_storage(StorageKind::Local, "authToken", "eyJhbGci.super-secret");
    launcher.prepare(staged);

    let registry = SessionRegistry::new(launcher, RegistryConfig::default());
    let session = registry.acquire(&ContextKey::named("worker-1")).await.unwrap();

    let sink = Arc::new(MemorySink::new());
    let interactor = Interactor::new(session.driver(), waiter())
        .with_timeout(Duration::from_millis(150))
        .with_recorder(Recorder::new(sink.clone()));

    let err = interactor
        .click(&Locator::css("#two-factor-submit"))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::NotReady { .. }));

    let attachments = sink.attachments();
    assert!(!attachments.is_empty());
    let storage = attachments
        .iter()
        .find(|a| a.name.ends_with("-storage.json"))
        .expect("storage artifact published");
    let rendered = String::from_utf8(storage.bytes.clone()).unwrap();
    assert!(rendered.contains(REDACTED));
    assert!(!rendered.contains("super-secret"));
}
