use super::types::VigiloError;

impl VigiloError {
    /// Whether this error represents a transient condition (feed/catalog
    /// unreachable, timed out, rate-limited) rather than a definitive
    /// absence or bad input. Reconciliation and the schedulers use this to
    /// decide whether to skip-and-retry-later or record a hard failure.
    pub fn is_transient(&self) -> bool {
        match self {
            VigiloError::TransientTransport(_) => true,
            VigiloError::Http(_) => true,
            VigiloError::LeaseBusy(_) => true,
            VigiloError::Database(e) => is_transient_db_error(e),

            VigiloError::NotFound(_)
            | VigiloError::MissingCatalog(_)
            | VigiloError::InvalidInput(_)
            | VigiloError::Config(_)
            | VigiloError::Internal(_) => false,
        }
    }
}

/// Connection-level failures can succeed on retry; constraint violations and
/// row-not-found cannot.
fn is_transient_db_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
    )
}
