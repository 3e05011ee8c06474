//! Cross-cutting error types for Warden.
//!
//! Domain-specific errors (`DatabaseError`, `EngineError`, `ComplianceError`)
//! live in their respective crates. A unified error is deferred to `warden-cli`
//! where all crate errors converge into `anyhow`.

use thiserror::Error;

/// Errors raised while parsing core vocabulary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A textual value did not name any known variant.
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}
