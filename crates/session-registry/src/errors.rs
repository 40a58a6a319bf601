use driver_adapter::{BrowserKind, DriverError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The browser could not be launched; fatal to the context and never
    /// retried by the engine.
    #[error("failed to launch {browser} session: {source}")]
    Launch {
        browser: BrowserKind,
        source: DriverError,
    },
}
