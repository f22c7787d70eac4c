use thiserror::Error;

/// Error taxonomy for the engine. Kinds, not types: most variants carry a
/// human-readable message rather than wrapping a downstream error directly,
/// so they can be constructed uniformly from any collaborator.
#[derive(Debug, Error)]
pub enum VigiloError {
    /// A collection or entity referenced by id was absent (e.g. no feed
    /// collection resolves for an actor).
    #[error("not found: {0}")]
    NotFound(String),

    /// A feed or catalog HTTP call failed in a way that may succeed on
    /// retry (non-2xx, connection refused, timeout). Reconciliation must
    /// never treat this as evidence of absence.
    #[error("transient transport error: {0}")]
    TransientTransport(String),

    /// A technique code appeared in a fetch but has no matching catalog
    /// row; the caller skips and counts it, it is not fatal.
    #[error("technique not in reference catalog: {0}")]
    MissingCatalog(String),

    /// HH:MM / day-of-week / other operator-supplied value failed
    /// validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A scheduler lease is held by another worker.
    #[error("lease busy: {0}")]
    LeaseBusy(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, VigiloError>;
