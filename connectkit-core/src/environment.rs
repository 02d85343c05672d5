//! Runtime environment classification.
//!
//! Both probes are pure and re-evaluated on every call; nothing here is
//! cached across calls.

use std::sync::Arc;

use crate::provider::WalletProvider;

/// Device/OS tokens that classify a user agent as mobile. Matched
/// case-insensitively as plain substrings.
const MOBILE_UA_TOKENS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Whether the user agent string belongs to a mobile platform.
#[uniffi::export]
#[must_use]
pub fn is_mobile(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    MOBILE_UA_TOKENS.iter().any(|token| ua.contains(token))
}

/// Typed result of probing the host for the target wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum WalletAvailability {
    /// A provider reference exists and carries the target wallet's
    /// identity flag (directly or on a sub-provider).
    Installed,
    /// A provider reference exists but nothing identifies itself as the
    /// target wallet.
    Ambiguous,
    /// No provider reference was injected at all.
    NotInstalled,
}

/// Probes a host-supplied provider reference for the target wallet.
#[uniffi::export]
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn probe_wallet(provider: Option<Arc<dyn WalletProvider>>) -> WalletAvailability {
    let Some(provider) = provider else {
        return WalletAvailability::NotInstalled;
    };

    if provider.is_target_wallet() {
        return WalletAvailability::Installed;
    }
    if provider
        .sub_providers()
        .is_some_and(|subs| subs.iter().any(|p| p.is_target_wallet()))
    {
        return WalletAvailability::Installed;
    }

    WalletAvailability::Ambiguous
}
