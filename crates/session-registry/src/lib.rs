//! Session Registry: owns one browser session per execution context.
//!
//! The registry is the sole creator and destroyer of sessions; every other
//! engine component only looks sessions up. This replaces ambient
//! thread-local driver storage with an explicit, injected map keyed by
//! [`vantage_core_types::ContextKey`].

pub mod errors;
pub mod model;
pub mod state;

pub use errors::RegistryError;
pub use model::{RegistryConfig, Session, SessionTimeouts};
pub use state::SessionRegistry;
