//! # Scopeweld - Build-time contribution merger for dependency injection
//!
//! Scopeweld collects scattered DI contribution declarations (bindings,
//! multibindings, and scope-attached modules) across a whole compilation
//! graph - including pre-compiled dependencies - and synthesizes, per scope,
//! generated container types that wire the surviving contributions together.
//!
//! Scopeweld provides:
//! - Strongly typed ingestion of declaration metadata emitted by the front end
//! - A greppable marker convention for cross-unit contribution discovery
//! - An append-only scope registry accumulated across scan rounds
//! - Order-independent conflict resolution (replace/exclude semantics)
//! - Deterministic container synthesis with stable accessor naming

pub mod ident;
pub mod contribution;
pub mod metadata;
pub mod marker;
pub mod registry;
pub mod resolver;
pub mod synthesizer;
pub mod scanner;
pub mod driver;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use ident::TypeIdentity;
pub use contribution::{ContributedModule, ContributionKind, ContributionRecord, MergeTarget, Qualifier};
pub use registry::ScopeRegistry;
pub use resolver::{ConflictResolver, Diagnostic, ResolvedScope};
pub use synthesizer::{ContainerDecl, ContainerSynthesizer};
pub use driver::{Driver, DriverState};

/// Result type alias for Scopeweld operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Scopeweld operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid type identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid metadata: {0}")]
    Metadata(String),

    #[error("Invalid marker: {0}")]
    Marker(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}
