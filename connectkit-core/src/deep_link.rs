//! MetaMask mobile entry point and the signature payload template.

/// Host of the wallet's mobile deep-link entry point.
pub const WALLET_DEEP_LINK_HOST: &str = "https://metamask.app.link";

/// Builds the deep link that reopens the current page inside the wallet's
/// mobile app. The `action=sign` parameter signals that a signature is
/// wanted on top of the connection.
#[uniffi::export]
#[must_use]
pub fn deep_link_url(page_host: &str, page_path: &str) -> String {
    format!("{WALLET_DEEP_LINK_HOST}/dapp/{page_host}{page_path}?action=sign")
}

/// Builds the message the user is asked to sign to prove account
/// ownership.
///
/// The template embeds the request timestamp and is produced fresh per
/// connection attempt; nothing on this side ever checks it for staleness.
#[uniffi::export]
#[must_use]
pub fn auth_message(site_name: &str, now_ms: u64) -> String {
    format!(
        "Welcome to {site_name}!\n\n\
         Click to sign in and authenticate with your wallet.\n\n\
         This request will not trigger a blockchain transaction or cost any gas fees.\n\n\
         Timestamp: {now_ms}"
    )
}
