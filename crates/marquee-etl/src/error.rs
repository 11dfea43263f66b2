//! Enrichment error types.

use thiserror::Error;

/// Errors raised while resolving or storing a country of origin.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// An HTTP request to the lookup service failed.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// The lookup service returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// The lookup service has nothing for the requested entity.
    #[error("not found: {entity} at {source_name}")]
    NotFound { entity: String, source_name: String },

    /// A response could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the record store.
    #[error("store error: {0}")]
    Store(#[from] marquee_core::Error),

    /// A fill run was requested while another one is in progress.
    #[error("country fill is already running")]
    AlreadyRunning,
}

impl EnrichError {
    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::RateLimited { .. })
    }

    /// Returns `true` when the error indicates the entity was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` when the record store itself is gone.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_store_unavailable())
    }
}

/// Convenience alias for enrichment results.
pub type EnrichResult<T> = std::result::Result<T, EnrichError>;
