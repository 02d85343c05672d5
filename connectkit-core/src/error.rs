use thiserror::Error;

/// Error outputs from `ConnectKit`.
///
/// Every provider-call failure during a running session is recovered
/// internally and reflected as a UI label; this enum only covers failures
/// that make the session itself unusable or that a host call must surface.
#[derive(Debug, Error, uniffi::Error)]
pub enum SessionError {
    /// A required page element is absent. Initialization aborts.
    #[error("missing_element: {id}")]
    MissingElement {
        /// DOM id of the missing element.
        id: String,
    },
    /// A required host library or global is absent.
    #[error("missing_dependency: {name}")]
    MissingDependency {
        /// Name of the missing dependency.
        name: String,
    },
    /// No usable wallet provider reference was supplied by the host.
    #[error("provider_unavailable")]
    ProviderUnavailable,
    /// The page-scoped session store refused an operation.
    #[error("store_error: {error}")]
    Store {
        /// Underlying store failure.
        error: String,
    },
    /// Unexpected error serializing information.
    #[error("serialization_error: {error}")]
    Serialization {
        /// Underlying serialization failure.
        error: String,
    },
    /// Unexpected internal failure.
    #[error("generic_error: {error}")]
    Generic {
        /// Details of the failure.
        error: String,
    },
}

impl From<crate::store::StoreError> for SessionError {
    fn from(error: crate::store::StoreError) -> Self {
        Self::Store {
            error: error.to_string(),
        }
    }
}
