//! Host-injected wallet provider boundary.
//!
//! The browser (or app shell) owns the actual provider object; the core
//! only sees this trait. On pages with several injected wallets the root
//! reference exposes a sub-provider list and [`locate_wallet`] picks the
//! entry flagged as the target wallet.

use std::sync::Arc;

use thiserror::Error;

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors returned by the host's wallet provider.
#[derive(Debug, Error, uniffi::Error)]
pub enum ProviderError {
    /// A prior permission prompt is still open (the provider's `-32002`
    /// error code).
    #[error("request_pending")]
    RequestPending,
    /// The user dismissed the prompt.
    #[error("user_rejected")]
    UserRejected,
    /// Any other provider failure.
    #[error("request_failed: {0}")]
    RequestFailed(String),
    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for ProviderError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

/// A wallet provider injected by the host environment.
///
/// Mirrors the capability surface of an EIP-1193 provider as used by the
/// connection flow: account prompt, silent account listing and message
/// signing. The calls are opaque to the core; no JSON-RPC plumbing leaks
/// through this boundary.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// Whether this provider identifies itself as the target wallet.
    fn is_target_wallet(&self) -> bool;

    /// Sub-providers exposed on multi-wallet pages, if any.
    fn sub_providers(&self) -> Option<Vec<Arc<dyn WalletProvider>>>;

    /// Prompts the user for account access (`eth_requestAccounts`).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::RequestPending`] while an earlier prompt
    /// is still open, or another variant if the prompt fails.
    async fn request_accounts(&self) -> ProviderResult<Vec<String>>;

    /// Lists already-authorized accounts without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails.
    async fn list_accounts(&self) -> ProviderResult<Vec<String>>;

    /// Asks the wallet to sign `message` with `account`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user declines or the signing call fails.
    async fn sign_message(
        &self,
        account: String,
        message: String,
    ) -> ProviderResult<String>;
}

/// Selects the target wallet from a host-supplied provider reference.
///
/// Prefers the flagged entry of the sub-provider list when one exists and
/// otherwise falls back to the sole reference. A root with an unflagged
/// list is still returned; the availability probe is what surfaces that
/// case as unusable.
#[uniffi::export]
#[must_use]
pub fn locate_wallet(root: Arc<dyn WalletProvider>) -> Arc<dyn WalletProvider> {
    if let Some(subs) = root.sub_providers() {
        if let Some(wallet) = subs.into_iter().find(|p| p.is_target_wallet()) {
            return wallet;
        }
    }
    root
}
