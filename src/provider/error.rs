use thiserror::Error;

/// Error kinds a provider adapter call can return (`spec.md` §7). The
/// reconciler's behavior is driven by variant, never by message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// A semantically-equivalent record already exists. Suppressed at the
    /// ensure path (collapses to Skip/record-already-exists).
    #[error("record already exists")]
    Conflict,
    /// Create rejected because a different-typed record holds the name.
    #[error("type conflict at this name")]
    TypeConflict,
    /// Delete target already absent. Treated as success by callers.
    #[error("record not found")]
    NotFound,
    /// Network/protocol/auth failure. Surfaced as a Failed action for the
    /// specific (hostname, provider) pair; the cycle continues otherwise.
    #[error("transport error: {0}")]
    Transport(String),
    /// Detected at construction (invalid regex, unknown mode, conflicting
    /// options). Aborts startup; never occurs mid-cycle.
    #[error("configuration error: {0}")]
    Config(String),
    /// Context was cancelled mid-call.
    #[error("operation cancelled")]
    Cancelled,
    /// Catch-all for adapter-internal failures that don't fit another kind.
    #[error("internal provider error: {0}")]
    Internal(String),
}

impl From<String> for ProviderError {
    fn from(s: String) -> Self {
        ProviderError::Internal(s)
    }
}

impl ProviderError {
    /// True for a NotFound error on a delete call, which callers treat as
    /// success rather than failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ProviderError::Conflict)
    }

    pub fn is_type_conflict(&self) -> bool {
        matches!(self, ProviderError::TypeConflict)
    }
}
