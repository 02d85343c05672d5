//! Page-scoped transient store used for the mobile deep-link round trip.
//!
//! The store survives a single cross-app navigation (`sessionStorage` on
//! a web host) and holds nothing beyond two keys: the stashed signature
//! payload and the pending-resume flag.

use thiserror::Error;

/// Key under which the signature payload is stashed before navigating to
/// the wallet app. Write-only: nothing reads it back on this page.
pub const AUTH_MESSAGE_KEY: &str = "authMessage";

/// Key for the deep-link round-trip flag. Set before navigating away,
/// cleared on return; signals "resume authentication on visibility
/// restore".
pub const PENDING_FLAG_KEY: &str = "metamaskPending";

/// Value stored under [`PENDING_FLAG_KEY`] while a round trip is pending.
pub const PENDING_FLAG_VALUE: &str = "true";

/// Result type for session store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the host's session store.
#[derive(Debug, Error, uniffi::Error)]
pub enum StoreError {
    /// The store rejected or failed the operation.
    #[error("store access error: {0}")]
    Access(String),
    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for StoreError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

/// Session-local key/value store implemented by the host page.
///
/// Values live for the page's lifetime plus a single cross-app
/// navigation; the core never treats a store failure as fatal.
#[uniffi::export(with_foreign)]
pub trait SessionStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, key: String) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, key: String, value: String) -> StoreResult<()>;

    /// Removes the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    fn remove(&self, key: String) -> StoreResult<()>;
}
