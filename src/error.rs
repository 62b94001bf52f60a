//! Error types for the discovery engine.

use thiserror::Error;

/// Result type alias using the engine's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during discovery/validation operations.
///
/// Variants map onto the kinds in the engine's error taxonomy; each kind
/// has a distinct recovery policy enforced by the orchestrator and
/// validator, not by this type itself.
#[derive(Error, Debug)]
pub enum Error {
    /// Scraper/LLM timeout, 5xx, or rate-limit. Retried with backoff by the
    /// caller; if retries are exhausted the caller emits NO_PROGRESS.
    #[error("transient external failure calling {collaborator}: {message}")]
    TransientExternal {
        collaborator: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Scraper returned empty or malformed evidence.
    #[error("invalid evidence from {source_url}: {reason}")]
    InvalidEvidence { source_url: String, reason: String },

    /// `HypothesisStore::add` collided with an existing hypothesis.
    #[error("duplicate hypothesis for entity {entity_id} category {category} statement_hash {statement_hash}")]
    DuplicateHypothesis {
        entity_id: String,
        category: String,
        statement_hash: String,
    },

    /// Iteration or token budget exhausted for this pass.
    #[error("budget exhausted: {resource}")]
    BudgetExhausted { resource: String },

    /// Category hit the consecutive-REJECT saturation threshold.
    #[error("category {category} saturated for entity {entity_id}")]
    SaturatedCategory { entity_id: String, category: String },

    /// LLM proposed a category outside the canonical 14-element set.
    #[error("unknown category {raw}, coercing to OTHER")]
    UnknownCategory { raw: String },

    /// Cancellation flag observed between iterations.
    #[error("run cancelled for entity {entity_id}")]
    Cancelled { entity_id: String },

    /// Corrupt Signal log, missing required config, or other unrecoverable
    /// condition. Aborts the run without mutating state.
    #[error("fatal error: {0}")]
    Fatal(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Signal log storage error (sqlite-backed implementation).
    #[error("signal log storage error: {0}")]
    Storage(String),

    /// Configuration error (out-of-range field, missing file, etc.).
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transient-external error with no wrapped source.
    pub fn transient(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientExternal {
            collaborator: collaborator.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a transient-external error wrapping an underlying std error.
    pub fn transient_with_source(
        collaborator: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TransientExternal {
            collaborator: collaborator.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-evidence error.
    pub fn invalid_evidence(source_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEvidence {
            source_url: source_url.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate-hypothesis error.
    pub fn duplicate_hypothesis(
        entity_id: impl Into<String>,
        category: impl Into<String>,
        statement_hash: impl Into<String>,
    ) -> Self {
        Self::DuplicateHypothesis {
            entity_id: entity_id.into(),
            category: category.into(),
            statement_hash: statement_hash.into(),
        }
    }

    /// Create a budget-exhausted error.
    pub fn budget_exhausted(resource: impl Into<String>) -> Self {
        Self::BudgetExhausted {
            resource: resource.into(),
        }
    }

    /// Create a saturated-category error.
    pub fn saturated_category(entity_id: impl Into<String>, category: impl Into<String>) -> Self {
        Self::SaturatedCategory {
            entity_id: entity_id.into(),
            category: category.into(),
        }
    }

    /// Create an unknown-category error.
    pub fn unknown_category(raw: impl Into<String>) -> Self {
        Self::UnknownCategory { raw: raw.into() }
    }

    /// Create a cancelled error.
    pub fn cancelled(entity_id: impl Into<String>) -> Self {
        Self::Cancelled {
            entity_id: entity_id.into(),
        }
    }

    /// Create a fatal error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// True if this error kind is locally recoverable by the caller
    /// (TransientExternal, InvalidEvidence, DuplicateHypothesis,
    /// UnknownCategory); all others propagate to the orchestrator.
    pub fn is_locally_recoverable(&self) -> bool {
        matches!(
            self,
            Error::TransientExternal { .. }
                | Error::InvalidEvidence { .. }
                | Error::DuplicateHypothesis { .. }
                | Error::UnknownCategory { .. }
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
