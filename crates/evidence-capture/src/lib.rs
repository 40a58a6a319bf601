//! Evidence Capture: diagnostics collected at failure boundaries.
//!
//! Capture runs when an operation has already failed, so it must never make
//! things worse: every artifact is fetched independently, anything the
//! session cannot produce is logged and omitted, and sensitive values are
//! redacted before they ever reach a sink.

pub mod bundle;
pub mod capture;
pub mod recorder;
pub mod redact;
pub mod sink;

pub use bundle::EvidenceBundle;
pub use capture::capture_failure;
pub use recorder::Recorder;
pub use redact::REDACTED;
pub use sink::{Attachment, EvidenceSink, FsSink, MemorySink, SinkError};
