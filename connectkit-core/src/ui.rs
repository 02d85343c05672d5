//! UI reflection tuples.
//!
//! Every state transition of the sequencer maps to exactly one
//! [`UiState`]; the host applies it verbatim to the connect button, the
//! status label, the address label and the info panel. Rendering here is
//! pure so the whole mapping is testable without a DOM.

use serde::Serialize;

use crate::error::SessionError;

/// Background color applied to the connect button once authenticated.
pub const SUCCESS_COLOR: &str = "#4CAF50";

/// Background color for a disabled/unusable connect button.
pub const DISABLED_COLOR: &str = "#ccc";

/// Default (stylesheet-provided) button background.
pub const DEFAULT_COLOR: &str = "";

/// One full snapshot of the four reflected page elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct UiState {
    /// Text of the connect button.
    pub button_label: String,
    /// Whether the connect button accepts clicks.
    pub button_enabled: bool,
    /// Background color of the connect button; empty means the
    /// stylesheet default.
    pub button_color: String,
    /// Text of the connection status label.
    pub status_text: String,
    /// Text of the wallet address label.
    pub address_text: String,
    /// Whether the wallet info panel is shown.
    pub panel_visible: bool,
}

impl UiState {
    /// The initial disabled/default tuple, also used for a forced
    /// disconnect.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            button_label: "Connect Wallet".to_owned(),
            button_enabled: false,
            button_color: DEFAULT_COLOR.to_owned(),
            status_text: "Disconnected".to_owned(),
            address_text: "Not connected".to_owned(),
            panel_visible: false,
        }
    }

    /// Wallet installed, nothing connected yet: "Connect" enabled.
    #[must_use]
    pub fn idle_ready() -> Self {
        Self {
            button_enabled: true,
            ..Self::initial()
        }
    }

    /// Wallet absent on desktop: disabled, greyed out.
    #[must_use]
    pub fn not_installed() -> Self {
        Self {
            button_label: "MetaMask not installed".to_owned(),
            button_color: DISABLED_COLOR.to_owned(),
            ..Self::initial()
        }
    }

    /// Wallet absent on mobile: the button opens the wallet app instead.
    #[must_use]
    pub fn open_in_wallet() -> Self {
        Self {
            button_label: "Open in MetaMask".to_owned(),
            button_enabled: true,
            ..Self::initial()
        }
    }

    /// The required signing library is not loaded; the session is dead.
    #[must_use]
    pub fn signer_missing() -> Self {
        Self {
            button_label: "Error: signer not loaded".to_owned(),
            button_color: DISABLED_COLOR.to_owned(),
            ..Self::initial()
        }
    }

    /// The silent account check on load failed.
    #[must_use]
    pub fn check_failed() -> Self {
        Self {
            button_label: "Error checking connection".to_owned(),
            ..Self::initial()
        }
    }

    /// Account access granted. In the signing variant the status already
    /// announces the upcoming signature prompt.
    #[must_use]
    pub fn connected(account: &str, awaiting_signature: bool) -> Self {
        let (status, label) = if awaiting_signature {
            ("Connected (Signing...)", "Waiting for signature...")
        } else {
            ("Connected", "Connected")
        };
        Self {
            button_label: label.to_owned(),
            button_enabled: true,
            button_color: DEFAULT_COLOR.to_owned(),
            status_text: status.to_owned(),
            address_text: account.to_owned(),
            panel_visible: true,
        }
    }

    /// Connection plus message signature both succeeded.
    #[must_use]
    pub fn authenticated(account: &str) -> Self {
        Self {
            button_label: "Authenticated \u{2713}".to_owned(),
            button_enabled: true,
            button_color: SUCCESS_COLOR.to_owned(),
            status_text: "Authenticated \u{2713}".to_owned(),
            address_text: account.to_owned(),
            panel_visible: true,
        }
    }

    /// Returns the same snapshot with only the button label replaced.
    #[must_use]
    pub fn with_button_label(mut self, label: &str) -> Self {
        self.button_label = label.to_owned();
        self
    }

    /// Returns the same snapshot with only the status text replaced.
    #[must_use]
    pub fn with_status(mut self, status: &str) -> Self {
        self.status_text = status.to_owned();
        self
    }
}

/// Serializes a snapshot to JSON for hosts that apply it generically.
///
/// # Errors
///
/// Returns an error if serialization fails.
#[uniffi::export]
#[allow(clippy::needless_pass_by_value)]
pub fn ui_state_json(ui: UiState) -> Result<String, SessionError> {
    serde_json::to_string(&ui).map_err(|e| SessionError::Serialization {
        error: e.to_string(),
    })
}
