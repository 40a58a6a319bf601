//! Browser-driver boundary for the Vantage harness engine.
//!
//! Everything above this crate (registry, wait engine, interaction engine,
//! evidence capture) talks to the browser exclusively through the
//! [`PageDriver`] capability trait. Any compliant driver implementation —
//! a WebDriver client, a CDP bridge — can satisfy it; the `mock` feature
//! ships a scripted in-memory implementation for tests.

pub mod config;
pub mod driver;
pub mod error;

#[cfg(feature = "mock")]
pub mod mock;

pub use config::{BrowserKind, DriverConfig, PageLoadStrategy, WindowSize};
pub use driver::{
    BrowserLauncher, ConsoleEntry, Cookie, ElementRect, PageDriver, StorageKind,
};
pub use error::{DriverError, DriverErrorKind, DriverResult};
